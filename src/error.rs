use std::fmt::{self, Display};
use std::io;

/// The crate-wide error type. Foreign errors raised while loading parameters
/// or writing reports are wrapped so that callers only deal with `EpiError`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    /// A topology, population or simulation parameter is outside its domain.
    InvalidParameter(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
}

impl EpiError {
    /// Shorthand used by the validation code.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EpiError::InvalidParameter(message.into())
    }
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl From<csv::Error> for EpiError {
    fn from(error: csv::Error) -> Self {
        EpiError::CSVError(error)
    }
}

impl std::error::Error for EpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiError::InvalidParameter(_) => None,
            EpiError::IoError(error) => Some(error),
            EpiError::JsonError(error) => Some(error),
            EpiError::CSVError(error) => Some(error),
        }
    }
}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            EpiError::IoError(error) => write!(f, "I/O error: {error}"),
            EpiError::JsonError(error) => write!(f, "JSON error: {error}"),
            EpiError::CSVError(error) => write!(f, "CSV error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_parameter() {
        let error = EpiError::invalid("n must be at least 1");
        assert_eq!(error.to_string(), "invalid parameter: n must be at least 1");
    }

    #[test]
    fn converts_io_error() {
        let error: EpiError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, EpiError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn converts_json_error() {
        let error: EpiError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(error, EpiError::JsonError(_)));
    }
}
