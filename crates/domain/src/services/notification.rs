//! Breach alert notifications.
//!
//! Provides the abstraction used to tell an owner about newly stored breaches
//! and the message text shared by every delivery channel.

use std::sync::{Arc, Mutex};

use crate::models::BreachRecord;

/// Subject line of a breach alert.
pub const BREACH_ALERT_SUBJECT: &str = "ALERT: New Security Breaches Detected";

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    /// Notification was sent successfully.
    Sent,
    /// Notification sending failed.
    Failed(String),
    /// Nothing to send, or delivery is disabled.
    Skipped,
}

impl NotificationResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationResult::Sent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationResult::Sent => "sent",
            NotificationResult::Failed(_) => "failed",
            NotificationResult::Skipped => "skipped",
        }
    }
}

/// Delivers breach alerts.
#[async_trait::async_trait]
pub trait BreachNotifier: Send + Sync {
    /// Tell `owner_email` about `breaches`. Must not panic on delivery errors.
    async fn notify(&self, owner_email: &str, breaches: &[BreachRecord]) -> NotificationResult;
}

/// Renders the plain-text body of a breach alert.
pub fn render_breach_alert(breaches: &[BreachRecord]) -> String {
    let mut body = String::from(BREACH_ALERT_SUBJECT);
    body.push_str("\n\nThe following new breaches were found for your account:\n");

    for breach in breaches {
        body.push_str(&format!(
            "\n- {} ({}): {}\n",
            breach.title, breach.breach_date, breach.domain
        ));
        if !breach.description.is_empty() {
            body.push_str(&format!("  {}\n", breach.description));
        }
        if !breach.data_classes.is_empty() {
            let classes: Vec<&str> = breach.data_classes.iter().map(String::as_str).collect();
            body.push_str(&format!("  Compromised data: {}\n", classes.join(", ")));
        }
    }

    body.push_str("\nPlease consider changing your passwords for these services.\n");
    body
}

/// A recorded call to [`MockBreachNotifier`].
#[derive(Debug, Clone)]
pub struct RecordedNotification {
    pub owner_email: String,
    pub breaches: Vec<BreachRecord>,
}

/// Mock notifier for development and testing.
///
/// Logs and records notifications but doesn't deliver them.
#[derive(Debug, Clone, Default)]
pub struct MockBreachNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<RecordedNotification>>>,
}

impl MockBreachNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notifications received so far, in call order.
    pub fn recorded(&self) -> Vec<RecordedNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }
}

#[async_trait::async_trait]
impl BreachNotifier for MockBreachNotifier {
    async fn notify(&self, owner_email: &str, breaches: &[BreachRecord]) -> NotificationResult {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(RecordedNotification {
                owner_email: owner_email.to_string(),
                breaches: breaches.to_vec(),
            });
        }

        if self.simulate_failure {
            tracing::warn!(
                email = %owner_email,
                "Mock breach notifier simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            email = %owner_email,
            breach_count = breaches.len(),
            "Mock: Would send breach alert"
        );

        NotificationResult::Sent
    }
}
