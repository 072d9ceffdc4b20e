//! Per-app configuration snapshot.

use serde::{Deserialize, Serialize};

/// Configuration an app is initialized with.
///
/// Stored by value inside an app; every read hands out a clone so callers
/// cannot mutate the app's copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, rename = "databaseURL", skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, rename = "deepLinkURLScheme", skip_serializing_if = "Option::is_none")]
    pub deep_link_url_scheme: Option<String>,

    /// Whether the native database layer should persist to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<bool>,
}

impl AppOptions {
    /// Create options carrying the two values the native handshake needs.
    pub fn new(api_key: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            database_url: Some(database_url.into()),
            ..Self::default()
        }
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Whether both a database URL and an API key are present.
    ///
    /// Only fully configured apps dispatch the native handshake. Any
    /// non-empty value counts; judging its contents is left to the native
    /// layer.
    pub fn is_fully_configured(&self) -> bool {
        fn present(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }
        present(&self.api_key) && present(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_configured() {
        assert!(AppOptions::new("k", "d").is_fully_configured());

        let partial = AppOptions {
            database_url: Some("d".into()),
            ..AppOptions::default()
        };
        assert!(!partial.is_fully_configured());

        let blank_key = AppOptions::new("  ", "d");
        assert!(blank_key.is_fully_configured());

        let empty_key = AppOptions::new("", "d");
        assert!(!empty_key.is_fully_configured());

        assert!(!AppOptions::default().is_fully_configured());
    }

    #[test]
    fn test_wire_names() {
        let opts = AppOptions::new("k", "https://db.example").with_project_id("proj");
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["apiKey"], "k");
        assert_eq!(json["databaseURL"], "https://db.example");
        assert_eq!(json["projectId"], "proj");
        assert!(json.get("storageBucket").is_none());
    }
}
