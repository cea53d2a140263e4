//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Location of a created or modified resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `GET /bodies` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StarListQuery {
    pub pn: Option<i64>,
    pub ps: Option<i64>,
    pub order: Option<String>,
    pub show_planets: Option<String>,
    pub convert_units: Option<String>,
}

/// Presentation flags on single-body reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayQuery {
    pub show_planets: Option<String>,
    pub convert_units: Option<String>,
}
