//! Shared state for the auth handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::api::email::EmailSender;
use crate::otp::{OtpStore, OTP_COOLDOWN, OTP_TTL};
use crate::tokens::TokenManager;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    email_from: String,
    frontend_base_url: String,
    otp_ttl: Duration,
    otp_cooldown: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(email_from: String, frontend_base_url: String) -> Self {
        Self {
            email_from,
            frontend_base_url,
            otp_ttl: OTP_TTL,
            otp_cooldown: OTP_COOLDOWN,
        }
    }

    #[must_use]
    pub fn email_from(&self) -> &str {
        &self.email_from
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn otp_ttl(&self) -> Duration {
        self.otp_ttl
    }

    #[must_use]
    pub fn otp_cooldown(&self) -> Duration {
        self.otp_cooldown
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenManager,
    otp_store: Arc<dyn OtpStore>,
    email_sender: Arc<dyn EmailSender>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        tokens: TokenManager,
        otp_store: Arc<dyn OtpStore>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            config,
            tokens,
            otp_store,
            email_sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    #[must_use]
    pub fn otp_store(&self) -> &dyn OtpStore {
        self.otp_store.as_ref()
    }

    #[must_use]
    pub fn email_sender(&self) -> &dyn EmailSender {
        self.email_sender.as_ref()
    }
}
