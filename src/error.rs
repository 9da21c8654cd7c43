//! Error taxonomy for a run.
//!
//! Every failure is fatal for the run (or, with `--keep-going`, for the city
//! being processed). The binary maps each kind to a distinct exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Run configuration is invalid (flags or TOML run file).
    #[error("configuration error: {0}")]
    Config(String),

    /// Input table does not match the expected layout.
    #[error("input format error: {0}")]
    InputFormat(String),

    /// Decomposition or statistics could not be computed.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// A file or directory could not be read or written.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The chart backend failed.
    #[error("chart rendering error: {0}")]
    Render(String),
}

impl AppError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Map a CSV reader error: wrapped I/O failures stay I/O, the rest is bad input.
    pub fn from_csv_read(context: impl Into<String>, err: csv::Error) -> Self {
        if err.is_io_error() {
            Self::io(context, std::io::Error::from(err))
        } else {
            Self::InputFormat(format!("{}: {err}", context.into()))
        }
    }

    /// Map a CSV writer error. Writing only fails on I/O or serialization.
    pub fn from_csv_write(context: impl Into<String>, err: csv::Error) -> Self {
        Self::io(context, std::io::Error::from(err))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::InputFormat(_) => 3,
            AppError::Numeric(_) => 4,
            AppError::Io { .. } => 5,
            AppError::Render(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let errors = [
            AppError::Config("x".into()),
            AppError::InputFormat("x".into()),
            AppError::Numeric("x".into()),
            AppError::io("x", std::io::Error::other("boom")),
            AppError::Render("x".into()),
        ];
        let mut codes: Vec<u8> = errors.iter().map(AppError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn io_error_message_includes_context() {
        let err = AppError::io("Failed to write 'out.csv'", std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Failed to write 'out.csv': disk full");
    }
}
