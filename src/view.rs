//! Page view model.
//!
//! Plain data the front ends render: pane text and classes, metric readouts,
//! button labels and notices. Keeping it free of DOM types lets the workbench
//! be exercised on the host.

use serde::{Deserialize, Serialize};

use crate::protocol::{Action, NOT_AVAILABLE};

/// Label a button falls back to when it never cached its original text.
pub const FALLBACK_LABEL: &str = "Submit";

/// A text pane (`<pre>`) with its `error` / `loading` classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPane {
    pub text: String,
    pub errored: bool,
    pub loading: bool,
}

impl OutputPane {
    pub fn show(&mut self, text: impl Into<String>, errored: bool) {
        self.text = text.into();
        self.errored = errored;
        self.loading = false;
    }

    /// Loading text never carries the error class.
    pub fn show_loading(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.errored = false;
        self.loading = true;
    }

    pub fn class(&self) -> &'static str {
        match (self.errored, self.loading) {
            (_, true) => "output loading",
            (true, false) => "output error",
            (false, false) => "output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSlot {
    Runtime,
    Cpu,
    Memory,
    TimeComplexity,
    SpaceComplexity,
}

impl MetricSlot {
    pub fn label(self) -> &'static str {
        match self {
            MetricSlot::Runtime => "Runtime",
            MetricSlot::Cpu => "CPU",
            MetricSlot::Memory => "Memory",
            MetricSlot::TimeComplexity => "Time Complexity",
            MetricSlot::SpaceComplexity => "Space Complexity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MetricSlot::Runtime => " ms",
            _ => "",
        }
    }

    fn index(self) -> usize {
        match self {
            MetricSlot::Runtime => 0,
            MetricSlot::Cpu => 1,
            MetricSlot::Memory => 2,
            MetricSlot::TimeComplexity => 3,
            MetricSlot::SpaceComplexity => 4,
        }
    }

    pub fn all() -> &'static [MetricSlot] {
        &[
            MetricSlot::Runtime,
            MetricSlot::Cpu,
            MetricSlot::Memory,
            MetricSlot::TimeComplexity,
            MetricSlot::SpaceComplexity,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricReadout {
    pub text: String,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricBoard {
    readouts: [MetricReadout; 5],
}

impl Default for MetricBoard {
    fn default() -> Self {
        let na = MetricReadout {
            text: NOT_AVAILABLE.to_string(),
            loading: false,
        };
        Self {
            readouts: std::array::from_fn(|_| na.clone()),
        }
    }
}

impl MetricBoard {
    pub fn get(&self, slot: MetricSlot) -> &str {
        &self.readouts[slot.index()].text
    }

    pub fn is_loading(&self, slot: MetricSlot) -> bool {
        self.readouts[slot.index()].loading
    }

    pub fn set(&mut self, slot: MetricSlot, text: impl Into<String>) {
        self.readouts[slot.index()] = MetricReadout {
            text: text.into(),
            loading: false,
        };
    }

    /// Put the same message in every slot.
    pub fn fill(&mut self, message: &str, loading: bool) {
        for r in &mut self.readouts {
            r.text = message.to_string();
            r.loading = loading;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonLabels {
    pub idle: String,
    pub busy: String,
}

impl ButtonLabels {
    pub fn for_action(action: Action) -> Self {
        let (idle, busy) = match action {
            Action::Run => ("Run Code", "Running..."),
            Action::Optimize => ("Optimize Code (AI)", "Optimizing..."),
            Action::Generate => ("Generate Code", "Generating..."),
        };
        Self {
            idle: idle.to_string(),
            busy: busy.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub enabled: bool,
    busy_label: String,
    original_label: Option<String>,
}

impl ActionButton {
    pub fn new(labels: &ButtonLabels) -> Self {
        Self {
            label: labels.idle.clone(),
            enabled: true,
            busy_label: labels.busy.clone(),
            original_label: None,
        }
    }

    /// Swap in the busy label, caching the current one the first time.
    pub fn enter_busy(&mut self) {
        if self.original_label.is_none() {
            self.original_label = Some(self.label.clone());
        }
        self.label = self.busy_label.clone();
    }

    pub fn leave_busy(&mut self) {
        self.label = self
            .original_label
            .clone()
            .unwrap_or_else(|| FALLBACK_LABEL.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonRow {
    pub run: ActionButton,
    pub optimize: ActionButton,
    pub generate: ActionButton,
}

impl ButtonRow {
    pub fn new(run: &ButtonLabels, optimize: &ButtonLabels, generate: &ButtonLabels) -> Self {
        Self {
            run: ActionButton::new(run),
            optimize: ActionButton::new(optimize),
            generate: ActionButton::new(generate),
        }
    }

    pub fn get(&self, action: Action) -> &ActionButton {
        match action {
            Action::Run => &self.run,
            Action::Optimize => &self.optimize,
            Action::Generate => &self.generate,
        }
    }

    pub fn get_mut(&mut self, action: Action) -> &mut ActionButton {
        match action {
            Action::Run => &mut self.run,
            Action::Optimize => &mut self.optimize,
            Action::Generate => &mut self.generate,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.run.enabled = enabled;
        self.optimize.enabled = enabled;
        self.generate.enabled = enabled;
    }
}

impl Default for ButtonRow {
    fn default() -> Self {
        Self::new(
            &ButtonLabels::for_action(Action::Run),
            &ButtonLabels::for_action(Action::Optimize),
            &ButtonLabels::for_action(Action::Generate),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn tag(self) -> &'static str {
        match self {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Success => "SUCCESS",
            NoticeLevel::Warning => "WARNING",
            NoticeLevel::Error => "ERROR",
        }
    }
}

/// A transient message for the user (alert in the page, stderr in the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.tag(), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub output: OutputPane,
    pub generated: OutputPane,
    pub metrics: MetricBoard,
    pub buttons: ButtonRow,
    pub language: String,
    pub prompt: String,
    /// Set when the prompt field should grab focus; cleared by the renderer.
    pub focus_prompt: bool,
    notices: Vec<Notice>,
}

impl PageView {
    pub fn new(buttons: ButtonRow, language: impl Into<String>) -> Self {
        Self {
            buttons,
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            level,
            message: message.into(),
        };
        tracing::info!("{}", notice);
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
