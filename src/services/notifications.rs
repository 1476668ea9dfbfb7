use tokio::sync::mpsc;

use crate::services::mail::{
    OutgoingEmail, ParticipantSummary, admin_notification_email, confirmation_email,
    quote_acknowledgement_email,
};

/// A notification waiting to be rendered and sent by the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ParticipationConfirmation {
        to: String,
        first_name: String,
        last_name: String,
    },
    QuoteAcknowledgement {
        to: String,
        first_name: String,
        last_name: String,
    },
    NewParticipation(ParticipantSummary),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ParticipationConfirmation { .. } => "participation_confirmation",
            Notification::QuoteAcknowledgement { .. } => "quote_acknowledgement",
            Notification::NewParticipation(_) => "new_participation",
        }
    }

    pub fn render(&self, admin_email: &str) -> OutgoingEmail {
        match self {
            Notification::ParticipationConfirmation {
                to,
                first_name,
                last_name,
            } => confirmation_email(to, first_name, last_name),
            Notification::QuoteAcknowledgement {
                to,
                first_name,
                last_name,
            } => quote_acknowledgement_email(to, first_name, last_name),
            Notification::NewParticipation(summary) => admin_notification_email(admin_email, summary),
        }
    }
}

/// Sending half of the notification channel, shared by handlers.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::UnboundedSender<Notification>,
}

impl NotificationQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queues a notification. Never fails the caller; a closed queue is logged.
    pub fn enqueue(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.sender.send(notification) {
            tracing::warn!(kind = kind, error = %e, "Notification queue closed, dropping notification");
        }
    }
}
