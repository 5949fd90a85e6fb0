//! Templated email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! club workflow notifications (submission confirmation, approval,
//! rejection). Configuration is loaded from environment variables; if
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and no
//! mailer should be constructed — callers then log and drop notifications.

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// No template is registered under the requested name.
    #[error("Unknown email template: {0}")]
    UnknownTemplate(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@clubdeck.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                    |
    /// |-----------------|----------|----------------------------|
    /// | `SMTP_HOST`     | yes      | —                          |
    /// | `SMTP_PORT`     | no       | `587`                      |
    /// | `SMTP_FROM`     | no       | `noreply@clubdeck.local`   |
    /// | `SMTP_USER`     | no       | —                          |
    /// | `SMTP_PASSWORD` | no       | —                          |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Render a registered template with the given context.
///
/// Context keys are interpolated from the JSON object: `club_name`,
/// `club_code`, `actor_name`, `comment`, `previous_state`.
pub fn render_template(
    template: &str,
    context: &serde_json::Value,
) -> Result<(String, String), EmailError> {
    let get = |key: &str| {
        context
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let club_name = get("club_name");
    match template {
        "club_confirmation" => Ok((
            format!("{club_name} has been queued for review"),
            format!(
                "Your club \"{club_name}\" is now active and has been queued \
                 for review. You will receive another email once a decision \
                 has been made.",
            ),
        )),
        "club_approved" => {
            let actor = get("actor_name");
            let body = if get("previous_state") == "approved" {
                format!(
                    "The latest changes to \"{club_name}\" have been reviewed \
                     and approved by {actor}. The updated profile is now \
                     publicly visible.",
                )
            } else {
                format!(
                    "Congratulations! \"{club_name}\" has been approved by \
                     {actor} and is now publicly visible in the directory.",
                )
            };
            Ok((format!("{club_name} has been approved"), body))
        }
        "club_rejected" => {
            let comment = get("comment");
            let mut body = format!(
                "Unfortunately \"{club_name}\" was not approved in its \
                 current form.",
            );
            if !comment.is_empty() {
                body.push_str(&format!(" Reviewer comment: {comment}"));
            }
            body.push_str(" You can edit the club profile and resubmit at any time.");
            Ok((format!("{club_name} was not approved"), body))
        }
        other => Err(EmailError::UnknownTemplate(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends templated club notification emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Render `template` with `context` and send it to every recipient.
    ///
    /// Recipients are independent: a bad address is logged and skipped,
    /// it does not abort the remaining sends.
    pub async fn send_templated(
        &self,
        template: &str,
        recipients: &[String],
        context: &serde_json::Value,
    ) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let (subject, body) = render_template(template, context)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();

        for recipient in recipients {
            let to = match recipient.parse() {
                Ok(addr) => addr,
                Err(e) => {
                    tracing::warn!(to = %recipient, error = %e, "Skipping invalid recipient");
                    continue;
                }
            };
            let email = Message::builder()
                .from(self.config.from_address.parse()?)
                .to(to)
                .subject(subject.clone())
                .header(ContentType::TEXT_PLAIN)
                .body(body.clone())
                .map_err(|e| EmailError::Build(e.to_string()))?;

            mailer.send(email).await?;
            tracing::info!(to = %recipient, template = template, "Notification email sent");
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn render_confirmation_template() {
        let ctx = serde_json::json!({"club_name": "Chess Club"});
        let (subject, body) = render_template("club_confirmation", &ctx).unwrap();
        assert!(subject.contains("Chess Club"));
        assert!(body.contains("queued"));
    }

    #[test]
    fn render_approved_template_first_approval() {
        let ctx = serde_json::json!({
            "club_name": "Chess Club",
            "actor_name": "Dana Reviewer",
            "previous_state": "pending",
        });
        let (subject, body) = render_template("club_approved", &ctx).unwrap();
        assert!(subject.contains("approved"));
        assert!(body.contains("Congratulations"));
        assert!(body.contains("Dana Reviewer"));
    }

    #[test]
    fn render_approved_template_reapproval() {
        let ctx = serde_json::json!({
            "club_name": "Chess Club",
            "actor_name": "Dana Reviewer",
            "previous_state": "approved",
        });
        let (_, body) = render_template("club_approved", &ctx).unwrap();
        assert!(body.contains("latest changes"));
    }

    #[test]
    fn render_rejected_template_includes_comment() {
        let ctx = serde_json::json!({
            "club_name": "Chess Club",
            "comment": "Description is too vague.",
        });
        let (subject, body) = render_template("club_rejected", &ctx).unwrap();
        assert!(subject.contains("not approved"));
        assert!(body.contains("Description is too vague."));
    }

    #[test]
    fn render_rejected_template_without_comment() {
        let ctx = serde_json::json!({"club_name": "Chess Club"});
        let (_, body) = render_template("club_rejected", &ctx).unwrap();
        assert!(!body.contains("Reviewer comment"));
        assert!(body.contains("resubmit"));
    }

    #[test]
    fn unknown_template_errors() {
        let ctx = serde_json::json!({});
        let result = render_template("club_festival", &ctx);
        assert!(matches!(result, Err(EmailError::UnknownTemplate(_))));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
