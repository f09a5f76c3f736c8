use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    MalformedInput,
    FileNotFound,
    InvalidRequest,
    ParseError,
    IoError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "MALFORMED_INPUT"),
            Self::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::IoError => write!(f, "IO_ERROR"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SightError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for SightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for SightError {}

impl SightError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        Self::new(ErrorCode::FileNotFound, format!("File not found: {path}"))
    }

    /// A component record that violates the loader contract.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedInput, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }
}
