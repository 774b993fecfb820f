//! Remote authority errors.

use thiserror::Error;

/// Errors that can occur when talking to the remote authority.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// An HTTP transport or body decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    UnexpectedResponse {
        /// HTTP status code.
        status: u16,

        /// Message extracted from the response body.
        message: String,
    },

    /// The configured base URL cannot address a client resource.
    #[error("invalid remote url: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// A message suitable for showing to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(error) if error.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(error) if error.is_connect() => "Could not reach the server".to_string(),
            Self::Http(_) => "Unexpected response from the server".to_string(),
            Self::UnexpectedResponse { message, .. } if !message.is_empty() => message.clone(),
            Self::UnexpectedResponse { status, .. } => format!("Request failed ({status})"),
            Self::InvalidUrl(_) => "The server address is not configured correctly".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_message_is_shown_to_users() {
        let error = RemoteError::UnexpectedResponse {
            status: 422,
            message: "Name already taken".to_string(),
        };

        assert_eq!(error.user_message(), "Name already taken");
    }

    #[test]
    fn empty_message_falls_back_to_status() {
        let error = RemoteError::UnexpectedResponse {
            status: 500,
            message: String::new(),
        };

        assert_eq!(error.user_message(), "Request failed (500)");
    }
}
