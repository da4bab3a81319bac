use serde::{Deserialize, Serialize};

/// Voice used for narration when the submitter names none.
pub const DEFAULT_VOICE_ID: &str = "alloy";

/// Which derivation stages run for an item. Frozen at creation.
///
/// Unknown fields are ignored and missing booleans take their defaults, so
/// `{}` is a valid options document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    #[serde(default = "default_true")]
    pub generate_audio: bool,
    #[serde(default = "default_true")]
    pub generate_summary: bool,
    #[serde(default)]
    pub generate_quiz: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            generate_audio: true,
            generate_summary: true,
            generate_quiz: false,
            voice_id: None,
        }
    }
}

impl ProcessingOptions {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Voice for the speech stage; blank ids fall back to the default.
    pub fn voice(&self) -> &str {
        self.voice_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VOICE_ID)
    }
}
