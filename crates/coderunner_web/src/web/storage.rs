use serde::{Deserialize, Serialize};

const PREFS_KEY: &str = "coderunner.prefs.v1";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

/// Page state that survives a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct PersistedPrefs {
    pub(super) language: String,
    #[serde(default)]
    pub(super) panel_open: bool,
}

pub(super) fn load_prefs() -> Option<PersistedPrefs> {
    let raw = local_storage_get_string(PREFS_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            tracing::warn!("ignoring stored prefs: {}", e);
            None
        }
    }
}

pub(super) fn save_prefs(prefs: &PersistedPrefs) {
    if let Ok(raw) = serde_json::to_string(prefs) {
        local_storage_set_string(PREFS_KEY, &raw);
    }
}
