// Transient user-facing notifications emitted by the flows

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Older notices are dropped once this many are waiting.
pub const MAX_PENDING_NOTICES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Queue of notices waiting to be shown. Rendering layers drain it; an
/// undrained board keeps only the newest `MAX_PENDING_NOTICES`.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    pending: Mutex<VecDeque<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "notice");
        let mut pending = self.pending.lock();
        if pending.len() == MAX_PENDING_NOTICES {
            pending.pop_front();
        }
        pending.push_back(notice);
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.pending.lock().drain(..).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.pending.lock().back().cloned()
    }
}
