use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the comparison harness and the command line front end.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("validator {validator} gave different results on repeated runs of \"{description}\"")]
    Inconsistent { validator: String, description: String },

    #[error("could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", path.display())]
    EmptyFile { path: PathBuf },

    #[error("unknown validator '{0}' (use --list to see the available ones)")]
    UnknownValidator(String),

    #[error("invalid alignment '{0}': expected [+|-]N with N in 0..=63")]
    InvalidAlignment(String),

    #[error("minimum length {min} is greater than maximum length {max}")]
    LengthRange { min: usize, max: usize },

    #[error("{0}")]
    InvalidInvocation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
