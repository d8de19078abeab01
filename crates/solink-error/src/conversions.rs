//! Conversions from standard error types into [`SolinkError`].

use crate::SolinkError;

impl From<std::io::Error> for SolinkError {
    fn from(err: std::io::Error) -> Self {
        SolinkError::Io {
            message: err.to_string(),
            file_path: None,
            source_message: err.get_ref().map(|inner| inner.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_with_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "request.json missing");
        let err: SolinkError = io.into();
        assert!(err.to_string().contains("request.json missing"));
    }
}
