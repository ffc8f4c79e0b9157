//! Command line interface for the `gherkin-relay` replay binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Identifier style the replayed run should use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IdStyleArg {
    #[default]
    Uuid,
    Incrementing,
}

/// Command line arguments for the `gherkin-relay` binary.
#[derive(Debug, Parser)]
#[command(
    name = "gherkin-relay",
    version,
    about = "Replay a Cucumber message log through the configured formatters"
)]
pub struct Cli {
    /// NDJSON envelope log to replay. Reads standard input when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Project configuration file (defaults to `reqnroll.json`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Identifier style for reconciled documents and pickles.
    #[arg(long, value_enum, default_value_t = IdStyleArg::Uuid)]
    pub id_style: IdStyleArg,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::{Cli, IdStyleArg};

    #[test]
    fn defaults_to_stdin_and_uuid() {
        let cli = Cli::parse_from(["gherkin-relay"]);
        assert!(cli.input.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.id_style, IdStyleArg::Uuid);
    }

    #[rstest]
    #[case("uuid", IdStyleArg::Uuid)]
    #[case("incrementing", IdStyleArg::Incrementing)]
    fn parses_id_style(#[case] value: &str, #[case] expected: IdStyleArg) {
        let cli = Cli::parse_from(["gherkin-relay", "--input", "run.ndjson", "--id-style", value]);
        assert_eq!(cli.input.as_deref(), Some(std::path::Path::new("run.ndjson")));
        assert_eq!(cli.id_style, expected);
    }

    #[test]
    fn rejects_unknown_id_style() {
        assert!(Cli::try_parse_from(["gherkin-relay", "--id-style", "guid"]).is_err());
    }
}
