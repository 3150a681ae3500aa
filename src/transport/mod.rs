/// Alert delivery and message rendering

pub mod format;
pub mod notifier;

pub use format::{format_announcement, format_signal, MessageBatch};
pub use notifier::{NotificationSink, SlackNotifier};
