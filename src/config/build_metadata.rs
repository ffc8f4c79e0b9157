//! Build information read from CI environment variables.

use super::Environment;

/// Continuous-integration servers whose variables are understood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildServer {
    GitHubActions,
    GitLabCi,
    AzurePipelines,
    TeamCity,
    Jenkins,
}

impl BuildServer {
    /// Detect the server the process runs under from its marker variable.
    #[must_use]
    pub fn detect(env: &dyn Environment) -> Option<Self> {
        let set = |name: &str| env.var(name).is_some_and(|v| !v.trim().is_empty());
        if env
            .var("GITHUB_ACTIONS")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            Some(Self::GitHubActions)
        } else if set("GITLAB_CI") {
            Some(Self::GitLabCi)
        } else if set("TF_BUILD") {
            Some(Self::AzurePipelines)
        } else if set("TEAMCITY_VERSION") {
            Some(Self::TeamCity)
        } else if set("JENKINS_URL") {
            Some(Self::Jenkins)
        } else {
            None
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GitHubActions => "GitHub Actions",
            Self::GitLabCi => "GitLab CI",
            Self::AzurePipelines => "Azure Pipelines",
            Self::TeamCity => "TeamCity",
            Self::Jenkins => "Jenkins",
        }
    }
}

/// What is known about the current build. Every field is optional; outside
/// CI everything is `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    pub server: Option<BuildServer>,
    pub build_url: Option<String>,
    pub build_number: Option<String>,
    pub remote: Option<String>,
    pub revision: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
}

impl BuildMetadata {
    /// Read metadata for whichever build server is detected.
    #[must_use]
    pub fn detect(env: &dyn Environment) -> Self {
        let var = |name: &str| env.var(name).filter(|v| !v.is_empty());
        let Some(server) = BuildServer::detect(env) else {
            return Self::default();
        };

        let metadata = match server {
            BuildServer::GitHubActions => {
                let server_url = var("GITHUB_SERVER_URL");
                let repo = var("GITHUB_REPOSITORY");
                let ref_type = var("GITHUB_REF_TYPE");
                let ref_name = var("GITHUB_REF_NAME");
                let build_url = match (&server_url, &repo, var("GITHUB_RUN_ID")) {
                    (Some(server), Some(repo), Some(run)) => {
                        Some(format!("{server}/{repo}/actions/runs/{run}"))
                    }
                    _ => None,
                };
                let remote = match (&server_url, &repo) {
                    (Some(server), Some(repo)) => Some(format!("{server}/{repo}.git")),
                    _ => None,
                };
                Self {
                    build_url,
                    build_number: var("GITHUB_RUN_NUMBER"),
                    remote,
                    revision: var("GITHUB_SHA"),
                    branch: ref_name.clone().filter(|_| ref_type.as_deref() == Some("branch")),
                    tag: ref_name.filter(|_| ref_type.as_deref() == Some("tag")),
                    ..Self::default()
                }
            }
            BuildServer::GitLabCi => Self {
                build_url: var("CI_PIPELINE_URL").or_else(|| var("CI_JOB_URL")),
                build_number: var("CI_PIPELINE_IID").or_else(|| var("CI_JOB_ID")),
                remote: var("CI_REPOSITORY_URL"),
                revision: var("CI_COMMIT_SHA"),
                branch: var("CI_COMMIT_BRANCH").or_else(|| var("CI_COMMIT_REF_NAME")),
                tag: var("CI_COMMIT_TAG"),
                ..Self::default()
            },
            BuildServer::AzurePipelines => {
                let build_url = match (
                    var("SYSTEM_COLLECTIONURI"),
                    var("SYSTEM_TEAMPROJECT"),
                    var("BUILD_BUILDID"),
                ) {
                    (Some(collection), Some(project), Some(id)) => {
                        Some(format!("{collection}{project}/_build/results?buildId={id}&_a=summary"))
                    }
                    _ => None,
                };
                Self {
                    build_url,
                    build_number: var("BUILD_BUILDNUMBER"),
                    remote: var("BUILD_REPOSITORY_URI"),
                    revision: var("BUILD_SOURCEVERSION"),
                    branch: var("BUILD_SOURCEBRANCHNAME"),
                    tag: var("BUILD_SOURCEBRANCH")
                        .and_then(|b| b.strip_prefix("refs/tags/").map(str::to_owned)),
                    ..Self::default()
                }
            }
            BuildServer::TeamCity => Self {
                build_url: var("BUILD_URL"),
                build_number: var("BUILD_NUMBER"),
                remote: var("TEAMCITY_GIT_REPOSITORY_URL"),
                revision: var("BUILD_VCS_NUMBER"),
                branch: var("TEAMCITY_BUILD_BRANCH"),
                tag: var("TEAMCITY_BUILD_TAG"),
                ..Self::default()
            },
            BuildServer::Jenkins => Self {
                build_url: var("BUILD_URL"),
                build_number: var("BUILD_NUMBER"),
                remote: var("GIT_URL"),
                revision: var("GIT_COMMIT"),
                branch: var("GIT_BRANCH"),
                tag: var("GIT_TAG_NAME"),
                ..Self::default()
            },
        };
        Self {
            server: Some(server),
            ..metadata
        }
    }
}
