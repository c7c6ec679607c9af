use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub type Notifications = mpsc::UnboundedReceiver<Notice>;

/// Sending half of the notice channel. Nobody listening is fine.
#[derive(Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, Notifications) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            level,
            message: message.into(),
        };
        debug!(level = ?notice.level, message = %notice.message, "Notice");
        let _ = self.sender.send(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }
}
