use crate::services::{mail::SharedMailer, notifications::Notification};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

/// Background worker that renders queued notifications and sends them
///
/// Send failures are logged and the notification is dropped; the HTTP
/// request that queued it has already been answered. On shutdown the
/// notifications still in the queue are sent before the worker stops.
pub async fn notification_dispatch_worker(
    mut receiver: mpsc::UnboundedReceiver<Notification>,
    mailer: SharedMailer,
    admin_email: String,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Notification dispatch worker started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Notification dispatch worker shutting down");
                receiver.close();
                let mut drained = 0;
                while let Some(notification) = receiver.recv().await {
                    dispatch(&mailer, &admin_email, notification).await;
                    drained += 1;
                }
                if drained > 0 {
                    info!("Sent {} pending notifications before shutdown", drained);
                }
                break;
            }
            next = receiver.recv() => {
                match next {
                    Some(notification) => dispatch(&mailer, &admin_email, notification).await,
                    None => {
                        info!("Notification queue closed");
                        break;
                    }
                }
            }
        }
    }

    info!("Notification dispatch worker stopped");
}

async fn dispatch(mailer: &SharedMailer, admin_email: &str, notification: Notification) {
    let email = notification.render(admin_email);
    if let Err(e) = mailer.send(&email).await {
        warn!(
            kind = notification.kind(),
            to = %email.to,
            error = %e,
            "Failed to send notification"
        );
    }
}
