// Settings resource module
// Defines the settings value exposed by the API and its update semantics

use serde::{Deserialize, Serialize};

/// Application settings exposed via `GET`/`PUT /api/settings`.
///
/// Field names follow the JSON wire format (camelCase). Deserialization
/// fills omitted fields with the hard-coded defaults, so a full-replace
/// update with a partial payload resets the missing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: String,
    pub articles_per_page: u32,
    pub refresh_interval: u32,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            articles_per_page: 20,
            refresh_interval: 15,
            notifications: true,
        }
    }
}

/// Partial settings update - every field optional.
///
/// Used when the API runs in `merge` mode: only the fields present in the
/// request body overwrite the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub articles_per_page: Option<u32>,
    pub refresh_interval: Option<u32>,
    pub notifications: Option<bool>,
}

impl SettingsPatch {
    /// Apply the supplied fields onto an existing settings value
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(theme) = &self.theme {
            settings.theme.clone_from(theme);
        }
        if let Some(per_page) = self.articles_per_page {
            settings.articles_per_page = per_page;
        }
        if let Some(interval) = self.refresh_interval {
            settings.refresh_interval = interval;
        }
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
    }
}

/// How `PUT /api/settings` treats fields absent from the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Decode the body as a full settings value; omitted fields reset to defaults
    Replace,
    /// Decode the body as a patch; omitted fields keep their current value
    Merge,
}
