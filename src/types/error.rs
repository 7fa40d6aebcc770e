use thiserror::Error;

/// ripcity error types
#[derive(Error, Debug)]
pub enum DispatchError {
    /// HTTP transport or status failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse a provider payload or input file
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider rejected the request or returned an unusable response
    #[error("provider error: {0}")]
    Provider(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Parse(err.to_string())
    }
}

/// Result type alias for ripcity
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DispatchError::Parse("invalid json".into());
        assert_eq!(err.to_string(), "parse error: invalid json");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DispatchError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn test_serde_error_becomes_parse() {
        let serde_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: DispatchError = serde_err.into();
        assert!(matches!(err, DispatchError::Parse(_)));
    }
}
