//! Error types shared by every layer of the analyzer.
//!
//! Errors are grouped by what the caller has to do about them rather than by
//! where they happened: an [`AuthError`] resets the session and asks the user
//! to log in again, an upstream or data-shape error aborts the current view,
//! and a validation error is reported before any backend call is made.

use std::fmt;

use thiserror::Error;

/// External service an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Spotify,
    Geocoding,
    MusicBrainz,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Spotify => "Spotify",
            Service::Geocoding => "Geocoding",
            Service::MusicBrainz => "MusicBrainz",
        };
        f.write_str(name)
    }
}

/// Failures of the OAuth flow or of an authorized call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error("no login in progress")]
    NoPendingLogin,

    #[error("login state does not match, start a new login")]
    StateMismatch,

    #[error("authorization denied: {0}")]
    Denied(String),

    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("access token was rejected, log in again")]
    TokenRejected,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    Upstream {
        service: Service,
        status: Option<u16>,
        message: String,
    },

    #[error("unexpected response from {service}: {message}")]
    DataShape { service: Service, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl AppError {
    pub fn upstream(service: Service, status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            service,
            status,
            message: message.into(),
        }
    }

    pub fn data_shape(service: Service, message: impl Into<String>) -> Self {
        AppError::DataShape {
            service,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Maps a transport level error of `service` into an upstream error.
    pub fn from_reqwest(service: Service, err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::data_shape(service, err.to_string());
        }
        AppError::upstream(service, err.status().map(|s| s.as_u16()), err.to_string())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}
