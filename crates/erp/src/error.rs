use std::time::Duration;

use aria_core::errors::ApplicationError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ErpError {
    #[error("ERP authentication failed: {0}")]
    Authentication(String),
    #[error("the ERP rejected the session: {0}")]
    SessionRejected(String),
    #[error("ERP transport failure: {0}")]
    Transport(String),
    #[error("ERP fault: {message}")]
    Remote { name: Option<String>, message: String },
    #[error("unexpected ERP payload: {0}")]
    Decode(String),
    #[error("ERP request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("a {0}-day sales window is out of range")]
    WindowOutOfRange(u32),
}

impl ErpError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::SessionRejected(_))
    }
}

impl From<ErpError> for ApplicationError {
    fn from(value: ErpError) -> Self {
        if value.is_authentication() {
            ApplicationError::Authentication(value.to_string())
        } else if matches!(value, ErpError::WindowOutOfRange(_)) {
            ApplicationError::InvalidInput(value.to_string())
        } else {
            ApplicationError::UpstreamData(value.to_string())
        }
    }
}

impl From<reqwest::Error> for ErpError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}
