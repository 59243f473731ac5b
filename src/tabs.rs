//! Bottom panel: the sliding container and the tab strip inside it.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

pub const OUTPUT_TAB: &str = "output-tab";
pub const METRICS_TAB: &str = "metrics-tab";
pub const GENERATE_TAB: &str = "gemini-tab";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabButton {
    pub id: String,
    pub label: String,
    /// Marked active in the initial markup.
    #[serde(default)]
    pub marked_active: bool,
}

impl TabButton {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            marked_active: false,
        }
    }

    pub fn marked(mut self) -> Self {
        self.marked_active = true;
        self
    }
}

pub fn default_tab_buttons() -> Vec<TabButton> {
    vec![
        TabButton::new(OUTPUT_TAB, "Output").marked(),
        TabButton::new(METRICS_TAB, "Metrics"),
        TabButton::new(GENERATE_TAB, "AI Generate"),
    ]
}

/// Mutually exclusive button/pane pairs. At most one pair is active.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStrip {
    buttons: Vec<TabButton>,
    panes: Vec<String>,
    active: Option<String>,
    scroll_top: u32,
    activations: u64,
}

impl TabStrip {
    pub fn new(buttons: Vec<TabButton>, panes: Vec<String>) -> Self {
        Self {
            buttons,
            panes,
            active: None,
            scroll_top: 0,
            activations: 0,
        }
    }

    /// A strip whose panes mirror its buttons one-to-one.
    pub fn from_buttons(buttons: Vec<TabButton>) -> Self {
        let panes = buttons.iter().map(|b| b.id.clone()).collect();
        Self::new(buttons, panes)
    }

    pub fn buttons(&self) -> &[TabButton] {
        &self.buttons
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, tab_id: &str) -> bool {
        self.active.as_deref() == Some(tab_id)
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    /// Bumped on every successful activation, including re-activating the
    /// tab already shown. Renderers re-apply [`Self::scroll_top`] when it
    /// moves.
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Record the content area's scroll offset as reported by the page.
    pub fn set_scroll_top(&mut self, offset: u32) {
        self.scroll_top = offset;
    }

    /// Show the pane named `tab_id`. Returns `false` and leaves the current
    /// selection untouched when no button/pane pair matches.
    pub fn activate(&mut self, tab_id: &str) -> bool {
        if tab_id.is_empty() {
            error!("cannot switch tab: empty target id");
            return false;
        }
        let has_button = self.buttons.iter().any(|b| b.id == tab_id);
        let has_pane = self.panes.iter().any(|p| p == tab_id);
        if !(has_button && has_pane) {
            error!("tab button or content not found for id: {}", tab_id);
            return false;
        }
        self.active = Some(tab_id.to_string());
        self.scroll_top = 0;
        self.activations += 1;
        debug!("switched to tab: {}", tab_id);
        true
    }

    /// Pick the startup tab: the one marked active, else the first; if that
    /// fails, force the first button active regardless of its pane.
    pub fn initialize(&mut self) {
        let Some(first) = self.buttons.first().map(|b| b.id.clone()) else {
            warn!("no tab buttons found to set initial active tab");
            return;
        };
        let initial = self
            .buttons
            .iter()
            .find(|b| b.marked_active)
            .map(|b| b.id.clone())
            .unwrap_or_else(|| first.clone());
        info!("initial tab: {}", initial);

        if self.activate(&initial) || (initial != first && self.activate(&first)) {
            return;
        }
        warn!("initial tab switch failed for {}, forcing {}", initial, first);
        self.active = Some(first);
        self.scroll_top = 0;
        self.activations += 1;
    }
}

impl Default for TabStrip {
    fn default() -> Self {
        Self::from_buttons(default_tab_buttons())
    }
}

/// The sliding host of the tab strip. Opening it has no effect on tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Panel {
    open: bool,
}

impl Panel {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}
