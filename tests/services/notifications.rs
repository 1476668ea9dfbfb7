//! Dispatch worker behaviour: delivery, send failures, draining on shutdown.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use glowup::{
    Error, Result,
    services::{
        mail::{Mailer, OutgoingEmail, ParticipantSummary},
        notifications::{Notification, NotificationQueue},
    },
    workers::notifications::notification_dispatch_worker,
};
use tokio::sync::broadcast;

#[derive(Default)]
struct FlakyMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    /// Recipient whose messages are refused.
    refuse: Option<String>,
}

#[async_trait]
impl Mailer for FlakyMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        if self.refuse.as_deref() == Some(email.to.as_str()) {
            return Err(Error::Mail("refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

fn confirmation(to: &str) -> Notification {
    Notification::ParticipationConfirmation {
        to: to.to_string(),
        first_name: "Awa".to_string(),
        last_name: "Diallo".to_string(),
    }
}

#[tokio::test]
async fn test_worker_drains_queue_on_shutdown() {
    let mailer = Arc::new(FlakyMailer::default());
    let (queue, receiver) = NotificationQueue::new();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    queue.enqueue(confirmation("one@example.com"));
    queue.enqueue(Notification::NewParticipation(ParticipantSummary {
        first_name: "Awa".to_string(),
        last_name: "Diallo".to_string(),
        email: "one@example.com".to_string(),
        phone: None,
        submitted_at: Utc::now(),
    }));

    let handle = tokio::spawn(notification_dispatch_worker(
        receiver,
        mailer.clone(),
        "admin@example.com".to_string(),
        shutdown_rx,
    ));
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|email| email.to == "one@example.com"));
    assert!(sent.iter().any(|email| email.to == "admin@example.com"));
}

#[tokio::test]
async fn test_send_failure_does_not_stop_worker() {
    let mailer = Arc::new(FlakyMailer {
        refuse: Some("refused@example.com".to_string()),
        ..Default::default()
    });
    let (queue, receiver) = NotificationQueue::new();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    queue.enqueue(confirmation("refused@example.com"));
    queue.enqueue(confirmation("ok@example.com"));
    drop(queue);

    // Dropping the last sender closes the queue and ends the worker.
    notification_dispatch_worker(
        receiver,
        mailer.clone(),
        "admin@example.com".to_string(),
        shutdown_rx,
    )
    .await;

    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ok@example.com");
}
