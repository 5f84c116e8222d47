//! Error handling for the clonodef CLI

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for clonodef CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn snapshot<S: Into<String>>(message: S) -> Self {
        Self::Snapshot { message: message.into() }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<clonodef_core::pool::SnapshotError> for CliError {
    fn from(err: clonodef_core::pool::SnapshotError) -> Self {
        Self::snapshot(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Fail with [`CliError::FileNotFound`] unless `path` exists.
pub fn require_file(path: &std::path::Path) -> CliResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::file_not_found(path.to_path_buf()))
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Compressed inputs must use the .gz extension",
                path.display()
            ));
        }

        CliError::Parse { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Tables must be tab-separated with a header row\n\
                 • ANARCI outputs must be comma-separated\n\
                 • Ensure the file is not corrupted or truncated",
            );
        }

        CliError::Snapshot { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • A snapshot is a JSON object with a \"columns\" array\n\
                 • Every column needs \"ref\", \"label\" and \"spec\"\n\
                 • Column references must be unique",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your clonodef.toml configuration file\n\
                 • Use 'clonodef config' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Choose a dataset with --anchor (format blockId:name)\n\
                 • List the available datasets with 'clonodef options'",
            );
        }
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
