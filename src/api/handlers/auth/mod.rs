//! OTP authentication flow and token lifecycle endpoints.

pub mod logout;
pub mod refresh;
pub mod register;
pub mod send_otp;
pub mod state;
pub mod storage;
pub mod types;
pub mod utils;
pub mod verify_otp;

pub use self::state::{AuthConfig, AuthState};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use secrecy::SecretString;

    use super::state::{AuthConfig, AuthState};
    use crate::api::email::test_support::RecordingEmailSender;
    use crate::otp::MemoryOtpStore;
    use crate::tokens::TokenManager;

    pub(crate) fn auth_state() -> Arc<AuthState> {
        auth_state_with(Arc::new(RecordingEmailSender::default()))
    }

    pub(crate) fn auth_state_with(sender: Arc<RecordingEmailSender>) -> Arc<AuthState> {
        let config = AuthConfig::new(
            "no-reply@qanda.dev".to_string(),
            "http://localhost:3000".to_string(),
        );
        let tokens = TokenManager::new(&SecretString::from("test-secret"));
        Arc::new(AuthState::new(
            config,
            tokens,
            Arc::new(MemoryOtpStore::new()),
            sender,
        ))
    }

    pub(crate) fn lazy_pool() -> sqlx::PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .expect("lazy pool")
    }
}
