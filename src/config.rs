//! Client configuration.
//!
//! Every field has a default so partial JSON files (or none at all) work.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::editor::EditorOptions;
use crate::error::ConfigError;
use crate::language::DEFAULT_LANGUAGE;
use crate::protocol::Action;
use crate::tabs::{default_tab_buttons, TabButton};
use crate::view::ButtonLabels;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const URL_ENV: &str = "CODERUNNER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix for the backend routes; empty means same-origin.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_editor_container")]
    pub editor_container: String,
    #[serde(default)]
    pub editor: EditorOptions,
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default = "default_tab_buttons")]
    pub tabs: Vec<TabButton>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_editor_container() -> String {
    "editor".to_string()
}

fn default_run_labels() -> ButtonLabels {
    ButtonLabels::for_action(Action::Run)
}

fn default_optimize_labels() -> ButtonLabels {
    ButtonLabels::for_action(Action::Optimize)
}

fn default_generate_labels() -> ButtonLabels {
    ButtonLabels::for_action(Action::Generate)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    #[serde(default = "default_run_labels")]
    pub run: ButtonLabels,
    #[serde(default = "default_optimize_labels")]
    pub optimize: ButtonLabels,
    #[serde(default = "default_generate_labels")]
    pub generate: ButtonLabels,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            run: default_run_labels(),
            optimize: default_optimize_labels(),
            generate: default_generate_labels(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_language: default_language(),
            editor_container: default_editor_container(),
            editor: EditorOptions::default(),
            labels: LabelSet::default(),
            tabs: default_tab_buttons(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_url_override(std::env::var(URL_ENV).ok());
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = ClientConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.default_language, "python");
        assert_eq!(cfg.labels.run.busy, "Running...");
        assert_eq!(cfg.tabs.len(), 3);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = ClientConfig::from_json_str(
            r#"{"base_url":"http://localhost:5000","editor":{"tab_size":2},"labels":{"run":{"idle":"Go","busy":"Going"}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:5000");
        assert_eq!(cfg.editor.tab_size, 2);
        assert!(cfg.editor.soft_tabs);
        assert_eq!(cfg.labels.run.idle, "Go");
        assert_eq!(cfg.labels.optimize.idle, "Optimize Code (AI)");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ClientConfig::from_json_str("{base_url"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error_but_optional_load_defaults() {
        let path = Path::new("/definitely/not/here/coderunner.json");
        assert!(matches!(ClientConfig::load(path), Err(ConfigError::Io { .. })));
        assert_eq!(
            ClientConfig::load_or_default(path).unwrap(),
            ClientConfig::default()
        );
    }

    #[test]
    fn blank_url_override_is_ignored() {
        let mut cfg = ClientConfig::default();
        cfg.apply_url_override(Some("  ".into()));
        assert_eq!(cfg.base_url, "");
        cfg.apply_url_override(Some(" http://runner:5000 ".into()));
        assert_eq!(cfg.base_url, "http://runner:5000");
    }
}
