//! Dashboard UI state
//!
//! State is only ever changed by applying a [`DashboardAction`] through
//! [`DashboardState::reduce`]. The reducer is pure: same state and action,
//! same result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default brightness percentage
pub const DEFAULT_BRIGHTNESS: u8 = 100;

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// How book cards are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
    Carousel,
}

/// Cosmetic "AI mode" selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    #[default]
    Basic,
    Enhanced,
    Neural,
}

/// Full dashboard state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub theme: Theme,
    /// Brightness percentage, 0-100
    pub brightness: u8,
    pub layout: Layout,
    pub ai_mode: AiMode,
    /// Free-form state per component id
    #[serde(default)]
    pub component_state: BTreeMap<String, Value>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            brightness: DEFAULT_BRIGHTNESS,
            layout: Layout::default(),
            ai_mode: AiMode::default(),
            component_state: BTreeMap::new(),
        }
    }
}

/// Actions accepted by the dashboard reducer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardAction {
    SetTheme(Theme),
    /// Values above 100 are clamped
    SetBrightness(u16),
    SetLayout(Layout),
    SetAiMode(AiMode),
    #[serde(rename_all = "camelCase")]
    SetComponentState { component_id: String, state: Value },
    #[serde(rename_all = "camelCase")]
    ClearComponentState { component_id: String },
    Reset,
}

impl DashboardAction {
    /// True if applying this action can change the persisted preferences
    pub fn touches_prefs(&self) -> bool {
        matches!(
            self,
            DashboardAction::SetTheme(_)
                | DashboardAction::SetBrightness(_)
                | DashboardAction::SetLayout(_)
                | DashboardAction::SetAiMode(_)
                | DashboardAction::Reset
        )
    }
}

impl DashboardState {
    /// Start from persisted preferences with empty component state
    pub fn from_prefs(prefs: PersistedPrefs) -> Self {
        Self {
            theme: prefs.theme,
            brightness: prefs.brightness.min(100),
            layout: prefs.layout,
            ai_mode: prefs.ai_mode,
            component_state: BTreeMap::new(),
        }
    }

    /// Apply `action`, returning the next state
    pub fn reduce(mut self, action: DashboardAction) -> Self {
        match action {
            DashboardAction::SetTheme(theme) => self.theme = theme,
            DashboardAction::SetBrightness(value) => self.brightness = value.min(100) as u8,
            DashboardAction::SetLayout(layout) => self.layout = layout,
            DashboardAction::SetAiMode(mode) => self.ai_mode = mode,
            DashboardAction::SetComponentState { component_id, state } => {
                self.component_state.insert(component_id, state);
            }
            DashboardAction::ClearComponentState { component_id } => {
                self.component_state.remove(&component_id);
            }
            DashboardAction::Reset => return Self::default(),
        }
        self
    }

    /// The subset of state kept across restarts
    pub fn prefs(&self) -> PersistedPrefs {
        PersistedPrefs {
            theme: self.theme,
            brightness: self.brightness,
            layout: self.layout,
            ai_mode: self.ai_mode,
        }
    }
}

/// Preferences saved across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedPrefs {
    pub theme: Theme,
    pub brightness: u8,
    pub layout: Layout,
    pub ai_mode: AiMode,
}

impl Default for PersistedPrefs {
    fn default() -> Self {
        DashboardState::default().prefs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_state() {
        let state = DashboardState::default();
        assert_eq!(state.theme, Theme::Auto);
        assert_eq!(state.brightness, 100);
        assert_eq!(state.layout, Layout::Grid);
        assert_eq!(state.ai_mode, AiMode::Basic);
        assert!(state.component_state.is_empty());
    }

    #[test]
    fn test_reduce_sets_fields() {
        let state = DashboardState::default()
            .reduce(DashboardAction::SetTheme(Theme::Dark))
            .reduce(DashboardAction::SetLayout(Layout::Carousel))
            .reduce(DashboardAction::SetAiMode(AiMode::Neural))
            .reduce(DashboardAction::SetBrightness(40));

        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.layout, Layout::Carousel);
        assert_eq!(state.ai_mode, AiMode::Neural);
        assert_eq!(state.brightness, 40);
    }

    #[test]
    fn test_brightness_clamped() {
        let state = DashboardState::default().reduce(DashboardAction::SetBrightness(250));
        assert_eq!(state.brightness, 100);
    }

    #[test]
    fn test_component_state_set_and_clear() {
        let state = DashboardState::default().reduce(DashboardAction::SetComponentState {
            component_id: "news-panel".to_string(),
            state: json!({"expanded": true}),
        });
        assert_eq!(state.component_state["news-panel"], json!({"expanded": true}));

        let state = state.reduce(DashboardAction::ClearComponentState {
            component_id: "news-panel".to_string(),
        });
        assert!(state.component_state.is_empty());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let state = DashboardState::default()
            .reduce(DashboardAction::SetTheme(Theme::Light))
            .reduce(DashboardAction::Reset);
        assert_eq!(state, DashboardState::default());
    }

    #[test]
    fn test_action_wire_format() {
        let action: DashboardAction =
            serde_json::from_value(json!({"type": "SET_THEME", "payload": "dark"})).unwrap();
        assert_eq!(action, DashboardAction::SetTheme(Theme::Dark));

        let action: DashboardAction = serde_json::from_value(json!({
            "type": "SET_COMPONENT_STATE",
            "payload": {"componentId": "c1", "state": 3}
        }))
        .unwrap();
        assert!(!action.touches_prefs());
    }

    #[test]
    fn test_prefs_roundtrip_drops_component_state() {
        let state = DashboardState::default()
            .reduce(DashboardAction::SetTheme(Theme::Dark))
            .reduce(DashboardAction::SetComponentState {
                component_id: "c".to_string(),
                state: json!(1),
            });
        let restored = DashboardState::from_prefs(state.prefs());
        assert_eq!(restored.theme, Theme::Dark);
        assert!(restored.component_state.is_empty());
    }

    #[test]
    fn test_partial_prefs_use_defaults() {
        let prefs: PersistedPrefs = serde_json::from_str(r#"{"theme":"light"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.brightness, DEFAULT_BRIGHTNESS);
    }
}
