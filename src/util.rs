use derive_more::From;
use serde::Serialize;

/// `{"message": ...}`, used for success notices and failures alike.
#[derive(Serialize, From, Debug, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
}

impl From<&str> for ErrorMessage {
    fn from(x: &str) -> Self {
        x.to_owned().into()
    }
}

/// `{"error": ...}`, reported by the maintenance endpoints with a 200 status.
#[derive(Serialize, Debug, PartialEq)]
pub struct InlineError {
    pub error: String,
}

impl<T: std::fmt::Display> From<&T> for InlineError {
    fn from(x: &T) -> Self {
        InlineError {
            error: x.to_string(),
        }
    }
}
