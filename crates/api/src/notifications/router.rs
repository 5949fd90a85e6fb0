//! Event-to-email routing.
//!
//! [`NotificationRouter`] consumes club workflow events published after a
//! save commits and delivers the matching templated email to the club's
//! contact address and officers. Everything here is best-effort: a
//! delivery failure is logged and dropped, never surfaced to the request
//! that triggered the event — the committed state transition stands.

use clubdeck_db::repositories::{MembershipRepo, UserRepo};
use clubdeck_db::DbPool;
use clubdeck_events::{EmailConfig, EmailDelivery, PlatformEvent};
use tokio::sync::broadcast;

/// Routes club workflow events to notification emails.
pub struct NotificationRouter {
    pool: DbPool,
    mailer: Option<EmailDelivery>,
}

impl NotificationRouter {
    /// Create a new router. When SMTP is not configured (`config` is
    /// `None`), events are still consumed and logged, but nothing is sent.
    pub fn new(pool: DbPool, config: Option<EmailConfig>) -> Self {
        let mailer = config.map(EmailDelivery::new);
        Self { pool, mailer }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](clubdeck_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver the email for a single event.
    async fn route_event(
        &self,
        event: &PlatformEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(template) = event.payload.get("template").and_then(|v| v.as_str()) else {
            tracing::debug!(event_type = %event.event_type, "Event carries no template, skipping");
            return Ok(());
        };

        let Some(club_id) = event.club_id else {
            tracing::warn!(event_type = %event.event_type, "Club event without club id, skipping");
            return Ok(());
        };

        let recipients = self.recipients(club_id).await?;
        if recipients.is_empty() {
            tracing::warn!(club_id = club_id, "No recipients for club notification");
            return Ok(());
        }

        // Enrich the template context with the actor's display name.
        let mut context = event.payload.clone();
        if let Some(actor_id) = event.actor_user_id {
            let actor_name = UserRepo::find_by_id(&self.pool, actor_id)
                .await?
                .map(|u| u.full_name)
                .unwrap_or_else(|| "Unknown".to_string());
            context["actor_name"] = serde_json::Value::String(actor_name);
        }

        match &self.mailer {
            Some(mailer) => {
                mailer.send_templated(template, &recipients, &context).await?;
            }
            None => {
                tracing::info!(
                    template = template,
                    recipients = recipients.len(),
                    "SMTP not configured, dropping notification"
                );
            }
        }

        Ok(())
    }

    /// The club contact address plus its officers' addresses, deduplicated.
    async fn recipients(&self, club_id: i64) -> Result<Vec<String>, sqlx::Error> {
        let mut recipients = MembershipRepo::officer_emails(&self.pool, club_id).await?;

        let contact: Option<String> =
            sqlx::query_scalar("SELECT email FROM clubs WHERE id = $1 AND email <> ''")
                .bind(club_id)
                .fetch_optional(&self.pool)
                .await?;
        if let Some(contact) = contact {
            if !recipients.contains(&contact) {
                recipients.push(contact);
            }
        }

        Ok(recipients)
    }
}
