//! Request handlers.

pub mod accounts;
pub mod auth;
pub mod bodies;
pub mod logs;
pub mod planets;

use std::collections::HashMap;

use axum::Form;
use axum::extract::rejection::FormRejection;
use stellar_core::fields::FormFields;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Turn an extracted url-encoded body into [`FormFields`].
///
/// An absent or undecodable body is treated as empty, so the usual
/// validation order still applies and the caller gets a "missing fields"
/// error after any existence checks.
pub(crate) fn form_fields(form: Result<Form<HashMap<String, String>>, FormRejection>) -> FormFields {
    match form {
        Ok(Form(values)) => FormFields::new(values),
        Err(e) => {
            debug!("treating unreadable form body as empty: {e}");
            FormFields::default()
        }
    }
}

/// Parse a boolean query flag: `true`/`false`/`1`/`0`, case-insensitive.
pub(crate) fn flag(name: &str, raw: Option<&str>, default: bool) -> AppResult<bool> {
    match raw.map(|r| r.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(r) if r.is_empty() => Ok(default),
        Some(r) => match r.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(AppError::Validation(format!(
                "invalid value for query parameter '{name}': expected true or false"
            ))),
        },
    }
}
