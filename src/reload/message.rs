//! Live Reload Message Protocol
//!
//! JSON messages sent over the WebSocket to `livereload.js`.
//!
//! - `connected`: handshake done
//! - `reload`: full page reload
//! - `css`: re-fetch stylesheets without reloading
//! - `error`: a task failed; the client logs it and keeps the page

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Connected {
        /// Server version, shown in the browser console
        version: String,
    },

    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    Css,

    Error {
        /// Task label, e.g. `SCSS`
        task: String,
        message: String,
    },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn error(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_message() {
        let json = ReloadMessage::reload("js rebuilt").to_json();
        assert_eq!(json, r#"{"type":"reload","reason":"js rebuilt"}"#);
        assert_eq!(ReloadMessage::Reload { reason: None }.to_json(), r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_css_message() {
        assert_eq!(ReloadMessage::Css.to_json(), r#"{"type":"css"}"#);
    }

    #[test]
    fn test_error_message() {
        let msg = ReloadMessage::error("SCSS", "src/scss/main.scss: expected \";\"");
        let json = msg.to_json();
        assert!(json.starts_with(r#"{"type":"error","task":"SCSS""#));
        assert_eq!(ReloadMessage::from_json(&json), Some(msg));
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert_eq!(ReloadMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}
