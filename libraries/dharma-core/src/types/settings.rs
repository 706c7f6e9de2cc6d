/// Application settings (singleton record)
use serde::{Deserialize, Serialize};

const DEFAULT_APP_NAME: &str = "Lời Phật Dạy";
const DEFAULT_PRIMARY_COLOR: &str = "#ffd700";
const DEFAULT_SECONDARY_COLOR: &str = "#1a1a2e";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub app_name: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
        }
    }
}

impl Settings {
    /// Merge a partial update, leaving unspecified fields unchanged
    pub fn apply(&mut self, update: UpdateSettings) {
        if let Some(app_name) = update.app_name {
            self.app_name = app_name;
        }
        if let Some(primary_color) = update.primary_color {
            self.primary_color = primary_color;
        }
        if let Some(secondary_color) = update.secondary_color {
            self.secondary_color = secondary_color;
        }
    }
}

/// Partial settings update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}
