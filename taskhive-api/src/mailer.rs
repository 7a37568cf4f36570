//! Outbound account email.
//!
//! Delivery is an HTTP POST of a JSON message to a configured mail relay.
//! Sends are fire-and-forget: handlers spawn the delivery task and respond
//! immediately, and failures are logged at `warn` but never surfaced to
//! the client. When no relay endpoint is configured (development, tests)
//! messages are logged and dropped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::MailConfig;

/// Outgoing message in the shape the mail relay accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    /// From header
    pub from: String,

    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain text body
    pub text: String,
}

/// Mail dispatcher handle
///
/// Cheap to clone; the reqwest client pools connections internally.
#[derive(Clone)]
pub struct Mailer {
    config: Arc<MailConfig>,
    client: reqwest::Client,
}

impl Mailer {
    /// Creates a mailer from the mail section of the configuration
    pub fn new(config: MailConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// Queues the account confirmation email for a new registration
    pub fn send_confirmation(&self, to: &str, name: &str, token: &str) {
        self.dispatch(self.confirmation_message(to, name, token));
    }

    /// Queues the password reset email
    pub fn send_password_reset(&self, to: &str, name: &str, token: &str) {
        self.dispatch(self.reset_message(to, name, token));
    }

    fn confirmation_message(&self, to: &str, name: &str, token: &str) -> MailMessage {
        let link = format!("{}/confirm/{}", self.config.frontend_url, token);

        MailMessage {
            from: self.config.from.clone(),
            to: to.to_string(),
            subject: "TaskHive - Confirm your account".to_string(),
            text: format!(
                "Hi {},\n\nYour TaskHive account is almost ready. \
                 Confirm it by visiting the link below:\n\n{}\n\n\
                 If you did not create this account, ignore this message.\n",
                name, link
            ),
        }
    }

    fn reset_message(&self, to: &str, name: &str, token: &str) -> MailMessage {
        let link = format!("{}/reset-password/{}", self.config.frontend_url, token);

        MailMessage {
            from: self.config.from.clone(),
            to: to.to_string(),
            subject: "TaskHive - Reset your password".to_string(),
            text: format!(
                "Hi {},\n\nA password reset was requested for your account. \
                 Set a new password by visiting the link below:\n\n{}\n\n\
                 If you did not request this, ignore this message and your \
                 password will stay unchanged.\n",
                name, link
            ),
        }
    }

    /// Spawns the delivery; the caller never waits on it
    fn dispatch(&self, message: MailMessage) {
        let Some(endpoint) = self.config.endpoint.clone() else {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Mail endpoint not configured, dropping message"
            );
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            match client.post(&endpoint).json(&message).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(to = %message.to, "Mail dispatched");
                }
                Ok(response) => {
                    warn!(
                        to = %message.to,
                        status = %response.status(),
                        "Mail relay rejected message"
                    );
                }
                Err(e) => {
                    warn!(to = %message.to, error = %e, "Mail delivery failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_mailer() -> Mailer {
        Mailer::new(MailConfig {
            endpoint: None,
            from: "TaskHive <accounts@taskhive.dev>".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        })
    }

    #[test]
    fn test_confirmation_message_links_token() {
        let mailer = test_mailer();
        let message = mailer.confirmation_message("ada@example.com", "Ada", "abc123");

        assert_eq!(message.to, "ada@example.com");
        assert!(message.text.contains("http://localhost:5173/confirm/abc123"));
        assert!(message.text.contains("Hi Ada"));
    }

    #[test]
    fn test_reset_message_links_token() {
        let mailer = test_mailer();
        let message = mailer.reset_message("ada@example.com", "Ada", "def456");

        assert_eq!(message.subject, "TaskHive - Reset your password");
        assert!(message
            .text
            .contains("http://localhost:5173/reset-password/def456"));
    }

    #[test]
    fn test_dispatch_without_endpoint_is_noop() {
        let mailer = test_mailer();
        // No endpoint configured, so this drops the message synchronously
        mailer.send_confirmation("ada@example.com", "Ada", "abc123");
    }

    #[test]
    fn test_mail_message_serialization() {
        let message = MailMessage {
            from: "a@b.c".to_string(),
            to: "d@e.f".to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
        };

        let json = serde_json::to_value(&message).expect("Should serialize");
        assert_eq!(json["from"], "a@b.c");
        assert_eq!(json["to"], "d@e.f");
        assert_eq!(json["subject"], "s");
        assert_eq!(json["text"], "t");
    }
}
