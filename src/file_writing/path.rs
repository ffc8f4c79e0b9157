//! Output path resolution.

use std::path::{Path, PathBuf};

use crate::config::PlaceholderResolver;

/// Directory used when the configured path names none.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = ".";

/// Reasons an output path is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OutputPathError {
    #[error("output path '{0}' contains a NUL character")]
    Nul(String),
    #[error("output path '{path}' contains the invalid character {character:?}")]
    InvalidCharacter { path: String, character: char },
    #[error("output path '{0}' has no file name")]
    MissingFileName(String),
}

/// Turn a configured path template into the file to write.
///
/// * no template, or an empty one: `DEFAULT_OUTPUT_DIRECTORY/default_file_name`
/// * a template ending in a separator names a directory; `default_file_name`
///   is appended
/// * `extension` (with its dot) is appended unless the file name already ends
///   with it, compared case-insensitively
///
/// Placeholders are expanded before anything else.
///
/// # Errors
///
/// Returns an [`OutputPathError`] when the result cannot name a file.
pub fn resolve_output_path(
    template: Option<&str>,
    default_file_name: &str,
    extension: &str,
    placeholders: &PlaceholderResolver,
) -> Result<PathBuf, OutputPathError> {
    let resolved = template
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| placeholders.resolve(t));

    let mut path = match resolved {
        None => Path::new(DEFAULT_OUTPUT_DIRECTORY).join(default_file_name),
        Some(p) if p.ends_with(['/', '\\']) => PathBuf::from(p).join(default_file_name),
        Some(p) => PathBuf::from(p),
    };

    validate(&path)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| OutputPathError::MissingFileName(path.display().to_string()))?;
    if !file_name.to_ascii_lowercase().ends_with(&extension.to_ascii_lowercase()) {
        path.set_file_name(format!("{file_name}{extension}"));
    }
    Ok(path)
}

fn validate(path: &Path) -> Result<(), OutputPathError> {
    let text = path.to_string_lossy();
    if text.contains('\0') {
        return Err(OutputPathError::Nul(text.into_owned()));
    }
    if cfg!(windows) {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if let Some(character) = name.chars().find(|c| matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*')) {
            return Err(OutputPathError::InvalidCharacter {
                path: text.into_owned(),
                character,
            });
        }
    }
    Ok(())
}
