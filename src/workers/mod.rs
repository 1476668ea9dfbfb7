pub mod notifications;

pub use notifications::notification_dispatch_worker;
