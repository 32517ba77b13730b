use layers::labels::LabelGridConfig;
use layers::style::OverlayStyles;
use serde::{Deserialize, Serialize};

use crate::host::{BehaviourMap, SelectorAction};

pub const TOGGLE_MAP: &str = "source-selector-toggle";
pub const SELECTION_MAP: &str = "source-selector";
pub const BLOCKING_MAP: &str = "blocking-source-selector";
/// Input context blocked while selection mode is installed.
pub const NAVIGATION_CONTEXT: &str = "navigation";
pub const OVERLAY_NAME: &str = "source-selector-overlay";
/// Origin tag of selections made with the mouse or the select-all binding.
pub const OVERLAY_ORIGIN: &str = "SelectorOverlay";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid selector config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Selector settings. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub toggle_trigger: String,
    pub set_trigger: String,
    pub add_trigger: String,
    pub remove_trigger: String,
    pub select_all_trigger: String,
    pub show_source_names: bool,
    /// Origin tag for programmatic calls that do not name one.
    pub default_origin: String,
    pub labels: LabelGridConfig,
    pub styles: OverlayStyles,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            toggle_trigger: "E".into(),
            set_trigger: "button1".into(),
            add_trigger: "shift button1".into(),
            remove_trigger: "ctrl button1".into(),
            select_all_trigger: "ctrl A".into(),
            show_source_names: true,
            default_origin: "API".into(),
            labels: LabelGridConfig::default(),
            styles: OverlayStyles::default(),
        }
    }
}

impl SelectorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Map installed for the selector's whole lifetime.
    pub fn toggle_behaviours(&self) -> BehaviourMap {
        BehaviourMap::new(TOGGLE_MAP).bind(self.toggle_trigger.as_str(), SelectorAction::Toggle)
    }

    /// Map installed while selection mode is on.
    pub fn selection_behaviours(&self) -> BehaviourMap {
        BehaviourMap::new(SELECTION_MAP)
            .bind(self.set_trigger.as_str(), SelectorAction::SetSelection)
            .bind(self.add_trigger.as_str(), SelectorAction::AddSelection)
            .bind(self.remove_trigger.as_str(), SelectorAction::RemoveSelection)
            .bind(self.select_all_trigger.as_str(), SelectorAction::SelectAllVisible)
    }

    pub fn blocking_behaviours(&self) -> BehaviourMap {
        BehaviourMap::new(BLOCKING_MAP).block(NAVIGATION_CONTEXT)
    }
}
