//! Outbound email delivery abstraction.
//!
//! OTP delivery is fire-and-report: the handler calls the sender once and
//! surfaces any failure to the caller immediately, with no retry queue. The
//! default sender logs the message instead of talking to a real transport,
//! which is what local dev and tests want; production wires in an
//! implementation backed by an actual mail provider.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// The message carrying an OTP code to a user.
    #[must_use]
    pub fn otp(to_email: &str, code: &str) -> Self {
        Self {
            to_email: to_email.to_string(),
            subject: "Your OTP Code".to_string(),
            body: format!("Your OTP is {code}. It expires in 5 minutes."),
        }
    }
}

/// Email delivery contract used by the OTP send flow.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error for the caller to report.
    fn send(&self, from: &str, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, from: &str, message: &EmailMessage) -> Result<()> {
        info!(
            from = %from,
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_message_embeds_code_and_expiry() {
        let message = EmailMessage::otp("a@x.com", "123456");
        assert_eq!(message.to_email, "a@x.com");
        assert_eq!(message.subject, "Your OTP Code");
        assert!(message.body.contains("123456"));
        assert!(message.body.contains("5 minutes"));
    }

    #[test]
    fn log_sender_reports_success() {
        let sender = LogEmailSender;
        let message = EmailMessage::otp("a@x.com", "123456");
        assert!(sender.send("no-reply@qanda.dev", &message).is_ok());
    }
}
