//! Flash notifications shown on the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

impl ToastLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A notification queued for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    /// Queue this toast in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn push(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        let mut toasts: Vec<Self> = session.get(session_keys::TOASTS).await?.unwrap_or_default();
        toasts.push(self);
        session.insert(session_keys::TOASTS, toasts).await
    }

    /// Drain every queued toast.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn take_all(session: &Session) -> Result<Vec<Self>, tower_sessions::session::Error> {
        Ok(session
            .remove::<Vec<Self>>(session_keys::TOASTS)
            .await?
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_toasts_drain_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Toast::success("Added").push(&session).await.unwrap();
        Toast::error("Nope").push(&session).await.unwrap();

        let toasts = Toast::take_all(&session).await.unwrap();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts.first().unwrap().level, ToastLevel::Success);
        assert!(Toast::take_all(&session).await.unwrap().is_empty());
    }
}
