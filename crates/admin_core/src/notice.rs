//! User-facing error notices.

use shared::error::{ApiError, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCategory {
    Validation,
    Conflict,
    NotFound,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    List,
    Lookup,
    Fetch,
    Save,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    category: NoticeCategory,
    context: NoticeContext,
    message: String,
}

impl Notice {
    pub fn from_api_error(context: NoticeContext, error: &ApiError) -> Self {
        Self::new(context, error.code, error.message.clone())
    }

    pub fn new(context: NoticeContext, code: ErrorCode, message: impl Into<String>) -> Self {
        let category = match code {
            ErrorCode::Validation => NoticeCategory::Validation,
            ErrorCode::Conflict => NoticeCategory::Conflict,
            ErrorCode::NotFound => NoticeCategory::NotFound,
            ErrorCode::Unavailable => NoticeCategory::Transport,
            ErrorCode::Internal => NoticeCategory::Unknown,
        };
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    /// Whether resubmitting with different values could succeed.
    pub fn is_correctable(&self) -> bool {
        matches!(
            self.category,
            NoticeCategory::Validation | NoticeCategory::Conflict
        )
    }

    pub fn category(&self) -> NoticeCategory {
        self.category
    }

    pub fn context(&self) -> NoticeContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
