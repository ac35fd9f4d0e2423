//! Email delivery of breach alerts.

use domain::models::BreachRecord;
use domain::services::{render_breach_alert, BreachNotifier, NotificationResult, BREACH_ALERT_SUBJECT};
use tracing::{info, warn};

use super::email::{Delivery, EmailMessage, EmailService};

/// Sends breach alerts through the [`EmailService`].
///
/// Alerts go to the configured alert recipient when there is one, otherwise
/// to the breached address itself.
#[derive(Clone)]
pub struct EmailBreachNotifier {
    email: EmailService,
}

impl EmailBreachNotifier {
    pub fn new(email: EmailService) -> Self {
        Self { email }
    }

    fn recipient<'a>(&'a self, owner_email: &'a str) -> &'a str {
        self.email.alert_recipient().unwrap_or(owner_email)
    }
}

#[async_trait::async_trait]
impl BreachNotifier for EmailBreachNotifier {
    async fn notify(&self, owner_email: &str, breaches: &[BreachRecord]) -> NotificationResult {
        if breaches.is_empty() {
            return NotificationResult::Skipped;
        }

        let to = self.recipient(owner_email);
        let message = EmailMessage {
            to: to.to_string(),
            subject: BREACH_ALERT_SUBJECT.to_string(),
            body_text: render_breach_alert(breaches),
        };

        match self.email.send(message).await {
            Ok(Delivery::Delivered) => {
                info!(
                    email = %owner_email,
                    recipient = %to,
                    breach_count = breaches.len(),
                    "Breach alert sent"
                );
                NotificationResult::Sent
            }
            Ok(Delivery::Disabled) => NotificationResult::Skipped,
            Err(e) => {
                warn!(email = %owner_email, error = %e, "Failed to send breach alert");
                NotificationResult::Failed(e.to_string())
            }
        }
    }
}
