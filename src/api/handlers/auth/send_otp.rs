//! OTP issuance endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::state::AuthState;
use super::storage::find_user_by_email;
use super::types::SendOtpRequest;
use super::utils::{generate_otp_code, normalize_email, valid_email};
use crate::api::email::EmailMessage;
use crate::api::handlers::detail;
use crate::otp::{cooldown_key, otp_key};

#[utoipa::path(
    post,
    path = "/send-otp/",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = super::types::Detail),
        (status = 400, description = "Validation error or unregistered email", body = super::types::Detail),
        (status = 429, description = "Cooldown active", body = super::types::Detail),
        (status = 500, description = "Delivery failure", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn send_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return detail(StatusCode::BAD_REQUEST, "Enter a valid email address.");
    }

    // Issuance never registers; the email must already belong to a user.
    let user = match find_user_by_email(&pool, &email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return detail(
                StatusCode::BAD_REQUEST,
                "Email not registered. Please register first.",
            )
        }
        Err(err) => {
            error!("Failed to lookup user for OTP send: {err}");
            return detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP");
        }
    };

    match issue_and_deliver(&auth_state, &email, &user.email) {
        IssueOutcome::Sent => detail(StatusCode::OK, "OTP sent to your email"),
        IssueOutcome::Cooldown => detail(
            StatusCode::TOO_MANY_REQUESTS,
            "Please wait before requesting another OTP.",
        ),
        IssueOutcome::DeliveryFailed(err) => {
            error!("Failed to send OTP email: {err}");
            detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to send OTP: {err}"),
            )
        }
    }
}

enum IssueOutcome {
    Sent,
    Cooldown,
    DeliveryFailed(anyhow::Error),
}

/// Generate and store a code, then attempt delivery.
///
/// While a cooldown marker is live, nothing is generated and the cache is
/// untouched. On delivery failure both entries are rolled back so the user
/// is not locked out for the cooldown window with no code in hand.
fn issue_and_deliver(auth_state: &AuthState, email: &str, to_email: &str) -> IssueOutcome {
    let store = auth_state.otp_store();
    if store.get(&cooldown_key(email)).is_some() {
        return IssueOutcome::Cooldown;
    }

    let code = generate_otp_code();
    store.set(&otp_key(email), &code, auth_state.config().otp_ttl());
    store.set(&cooldown_key(email), "1", auth_state.config().otp_cooldown());

    let message = EmailMessage::otp(to_email, &code);
    if let Err(err) = auth_state
        .email_sender()
        .send(auth_state.config().email_from(), &message)
    {
        store.delete(&otp_key(email));
        store.delete(&cooldown_key(email));
        return IssueOutcome::DeliveryFailed(err);
    }

    IssueOutcome::Sent
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{auth_state, auth_state_with, lazy_pool};
    use super::*;
    use crate::api::email::test_support::RecordingEmailSender;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    #[test]
    fn issue_stores_code_and_cooldown_then_delivers() {
        let sender = Arc::new(RecordingEmailSender::default());
        let state = auth_state_with(Arc::clone(&sender));

        let outcome = issue_and_deliver(&state, "a@x.com", "a@x.com");
        assert!(matches!(outcome, IssueOutcome::Sent));

        let code = state
            .otp_store()
            .get(&otp_key("a@x.com"))
            .expect("stored code");
        assert_eq!(code.len(), 6);
        assert!(state.otp_store().get(&cooldown_key("a@x.com")).is_some());

        let sent = sender
            .sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains(&code));
    }

    #[test]
    fn second_issue_within_cooldown_is_rejected_without_mutation() {
        let state = auth_state();
        assert!(matches!(
            issue_and_deliver(&state, "a@x.com", "a@x.com"),
            IssueOutcome::Sent
        ));
        let first_code = state.otp_store().get(&otp_key("a@x.com"));

        assert!(matches!(
            issue_and_deliver(&state, "a@x.com", "a@x.com"),
            IssueOutcome::Cooldown
        ));
        // The original code survives the rejected attempt.
        assert_eq!(state.otp_store().get(&otp_key("a@x.com")), first_code);
    }

    #[test]
    fn delivery_failure_rolls_back_code_and_cooldown() {
        let sender = Arc::new(RecordingEmailSender {
            fail: true,
            ..RecordingEmailSender::default()
        });
        let state = auth_state_with(sender);

        let outcome = issue_and_deliver(&state, "a@x.com", "a@x.com");
        assert!(matches!(outcome, IssueOutcome::DeliveryFailed(_)));
        assert!(state.otp_store().get(&otp_key("a@x.com")).is_none());
        assert!(state.otp_store().get(&cooldown_key("a@x.com")).is_none());

        // Retry is possible immediately.
        assert!(matches!(
            issue_and_deliver(&state, "a@x.com", "a@x.com"),
            IssueOutcome::DeliveryFailed(_)
        ));
    }

    #[tokio::test]
    async fn send_otp_missing_payload() {
        let response = send_otp(Extension(lazy_pool()), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn send_otp_rejects_invalid_email() {
        let response = send_otp(
            Extension(lazy_pool()),
            Extension(auth_state()),
            Some(Json(SendOtpRequest {
                email: "nope".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
