//! Public contact form endpoint.
//!
//! Rate-limited to 5 submissions per 10 minutes per client IP. The rate
//! limit is checked before validation so abusive clients are cut off
//! regardless of payload quality.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult, FieldError};
use crate::models::{ContactSubmission, CreateContactSubmission, is_valid_email};
use crate::routes::helpers::{enforce_rate_limit, parse_json_body};
use crate::state::AppState;

/// Maximum length accepted for the free-text message.
const MAX_MESSAGE_LEN: usize = 5000;

/// Contact form payload. All fields optional at the wire level so missing
/// values surface as field errors rather than deserialization faults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub id: Uuid,
}

/// Validate the payload, returning one error per offending field.
fn validate(request: &ContactRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let mut require = |field: &str, value: &Option<String>| {
        if value.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            errors.push(FieldError::new(field, "This field is required"));
        }
    };

    require("firstName", &request.first_name);
    require("lastName", &request.last_name);
    require("subject", &request.subject);
    require("message", &request.message);

    match request.email.as_deref().map(str::trim) {
        None | Some("") => errors.push(FieldError::new("email", "This field is required")),
        Some(email) if !is_valid_email(email) => {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
        _ => {}
    }

    if let Some(message) = &request.message
        && message.len() > MAX_MESSAGE_LEN
    {
        errors.push(FieldError::new("message", "Message is too long"));
    }

    errors
}

/// Handle a contact form submission.
///
/// POST /api/contact
async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ContactResponse>> {
    enforce_rate_limit(&state, "contact", state.rate_limits().contact, &headers)?;

    let request: ContactRequest = parse_json_body(&body)?;

    let errors = validate(&request);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Validation guarantees presence of the required fields.
    let input = CreateContactSubmission {
        first_name: request.first_name.unwrap_or_default().trim().to_string(),
        last_name: request.last_name.unwrap_or_default().trim().to_string(),
        email: request.email.unwrap_or_default().trim().to_string(),
        company: request.company.filter(|s| !s.trim().is_empty()),
        phone: request.phone.filter(|s| !s.trim().is_empty()),
        subject: request.subject.unwrap_or_default().trim().to_string(),
        message: request.message.unwrap_or_default(),
    };

    let submission = ContactSubmission::create(state.db(), input).await?;

    // Notification mail is best-effort: a delivery failure must not fail
    // the submission that is already stored.
    if let Some(email) = state.email()
        && let Some(recipient) = &state.config().contact_recipient
        && let Err(e) = email.send_contact_notification(recipient, &submission).await
    {
        tracing::warn!(error = %e, "failed to send contact notification");
    }

    tracing::info!(id = %submission.id, "stored contact submission");

    Ok(Json(ContactResponse {
        success: true,
        id: submission.id,
    }))
}

/// Create the contact router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit_contact))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn valid_request() -> ContactRequest {
        ContactRequest {
            first_name: Some("Claire".to_string()),
            last_name: Some("Moreau".to_string()),
            email: Some("claire@maison.fr".to_string()),
            company: Some("Maison Moreau".to_string()),
            phone: None,
            subject: Some("Demande de catalogue".to_string()),
            message: Some("Bonjour, pourriez-vous m'envoyer votre catalogue ?".to_string()),
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(validate(&valid_request()).is_empty());
    }

    #[test]
    fn missing_fields_are_reported_individually() {
        let request = ContactRequest {
            first_name: None,
            last_name: Some("  ".to_string()),
            email: None,
            company: None,
            phone: None,
            subject: None,
            message: None,
        };

        let errors = validate(&request);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"firstName"));
        assert!(fields.contains(&"lastName"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"subject"));
        assert!(fields.contains(&"message"));
    }

    #[test]
    fn invalid_email_is_a_field_error() {
        let mut request = valid_request();
        request.email = Some("not-an-email".to_string());

        let errors = validate(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn oversized_message_is_rejected() {
        let mut request = valid_request();
        request.message = Some("x".repeat(MAX_MESSAGE_LEN + 1));

        let errors = validate(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "message");
    }
}
