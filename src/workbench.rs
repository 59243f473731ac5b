//! Request/action controller.
//!
//! [`Workbench`] owns every piece of transient client state: the editor
//! handle, the tab strip, the panel, the page view and the busy flag. Front
//! ends feed it [`Command`]s; a network action yields one
//! [`OutgoingRequest`], and the matching [`Workbench::complete`] call always
//! returns the workbench to idle.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::ClientConfig;
use crate::editor::{self, CursorPolicy, EditorHandle, EditorHost};
use crate::error::{InitError, TransportError};
use crate::language::SyntaxMode;
use crate::protocol::{
    decode_reply, interpret_reply, Action, CodeOutcome, CodeRequest, GenerateReply, HttpReply,
    OptimizeReply, OutgoingRequest, PromptRequest, RunReply, NOT_AVAILABLE,
};
use crate::tabs::{Panel, TabStrip, GENERATE_TAB, OUTPUT_TAB};
use crate::view::{ButtonRow, MetricSlot, NoticeLevel, PageView};

pub const EDITOR_NOT_READY: &str =
    "Error: Code editor is not ready. Please reload the page or check the console.";
pub const EDITOR_INCOMPLETE: &str =
    "Error: Code editor initialization incomplete. Please reload the page or check the console.";
pub const EMPTY_CODE: &str = "Error: Code editor is empty.";
pub const NOTHING_TO_OPTIMIZE: &str = "Code editor is empty, nothing to optimize.";
pub const EMPTY_PROMPT: &str = "// Error: Prompt cannot be empty.";
pub const OPTIMIZE_PENDING: &str = "Requesting AI code optimization...";
pub const OPTIMIZE_DONE: &str = "Code optimized by AI and updated in editor.";
pub const OPTIMIZE_FALLBACK: &str = "Optimization failed: No optimized code returned by AI.";
pub const GENERATE_PENDING: &str = "// Generating code with AI, please wait...";
pub const GENERATE_FALLBACK: &str = "// Failed to generate code. Empty response from AI.";
pub const METRICS_RUNNING: &str = "Running...";
pub const METRICS_FAILED: &str = "Execution failed.";

/// A user intent. Only `Run`, `Optimize` and `Generate` touch the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Optimize,
    Generate,
    SelectLanguage(String),
    SetPrompt(String),
    ActivateTab(String),
    /// The tab content area was scrolled to this offset.
    ScrollTabs(u32),
    TogglePanel,
}

pub struct Workbench {
    editor: Option<EditorHandle>,
    tabs: TabStrip,
    panel: Panel,
    view: PageView,
    in_flight: Option<Action>,
    base_url: String,
}

impl Workbench {
    pub fn new(config: &ClientConfig) -> Self {
        let mut tabs = TabStrip::from_buttons(config.tabs.clone());
        tabs.initialize();

        let view = PageView::new(
            ButtonRow::new(
                &config.labels.run,
                &config.labels.optimize,
                &config.labels.generate,
            ),
            config.default_language.clone(),
        );

        Self {
            editor: None,
            tabs,
            panel: Panel::default(),
            view,
            in_flight: None,
            base_url: config.base_url.clone(),
        }
    }

    /// Bring up the editor through `host`. On failure the workbench keeps
    /// running without an editor and refuses code actions.
    pub fn init_editor<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        config: &ClientConfig,
    ) -> Result<(), InitError> {
        let handle = editor::initialize(host, &config.editor_container, &config.editor)?;
        self.attach_editor(handle);
        Ok(())
    }

    pub fn attach_editor(&mut self, handle: EditorHandle) {
        self.editor = Some(handle);
        let language = self.view.language.clone();
        self.apply_language_mode(&language);
    }

    pub fn editor(&self) -> Option<&EditorHandle> {
        self.editor.as_ref()
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut PageView {
        &mut self.view
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<Action> {
        self.in_flight
    }

    pub fn url_for(&self, request: &OutgoingRequest) -> String {
        request.url(&self.base_url)
    }

    pub fn dispatch(&mut self, command: Command) -> Option<OutgoingRequest> {
        match command {
            Command::Run => self.begin_run(),
            Command::Optimize => self.begin_optimize(),
            Command::Generate => self.begin_generate(),
            Command::SelectLanguage(token) => {
                self.view.language = token.clone();
                self.apply_language_mode(&token);
                None
            }
            Command::SetPrompt(prompt) => {
                self.view.prompt = prompt;
                None
            }
            Command::ActivateTab(tab_id) => {
                self.tabs.activate(&tab_id);
                None
            }
            Command::ScrollTabs(offset) => {
                self.tabs.set_scroll_top(offset);
                None
            }
            Command::TogglePanel => {
                self.panel.toggle();
                None
            }
        }
    }

    /// Finish the in-flight `action` with the raw reply or transport failure.
    ///
    /// Whatever the outcome, the busy flag is released and the buttons are
    /// restored. A completion for an action that is not in flight is ignored.
    pub fn complete(&mut self, action: Action, result: Result<HttpReply, TransportError>) {
        if self.in_flight != Some(action) {
            warn!(
                "ignoring {} completion; in flight: {:?}",
                action.label(),
                self.in_flight
            );
            return;
        }

        let outcome = result.and_then(|reply| interpret_reply(&reply));
        if let Err(e) = &outcome {
            error!("{} request failed: {}", action.label(), e);
        }
        match action {
            Action::Run => self.finish_run(outcome),
            Action::Optimize => self.finish_optimize(outcome),
            Action::Generate => self.finish_generate(outcome),
        }
        self.leave_busy(action);
    }

    fn begin_run(&mut self) -> Option<OutgoingRequest> {
        if self.reject_if_busy(Action::Run) {
            return None;
        }
        let code = self.editor_code()?;
        if code.trim().is_empty() {
            self.view.output.show(EMPTY_CODE, true);
            self.tabs.activate(OUTPUT_TAB);
            return None;
        }

        let language = self.view.language.clone();
        let body = encode(&CodeRequest {
            code,
            language: language.clone(),
        })?;
        self.enter_busy(Action::Run);
        self.view
            .output
            .show_loading(format!("Running {language} code...\nPlease wait..."));
        self.view.metrics.fill(METRICS_RUNNING, true);
        self.tabs.activate(OUTPUT_TAB);
        Some(OutgoingRequest {
            action: Action::Run,
            body,
        })
    }

    fn begin_optimize(&mut self) -> Option<OutgoingRequest> {
        if self.reject_if_busy(Action::Optimize) {
            return None;
        }
        let code = self.editor_code()?;
        if code.trim().is_empty() {
            self.view.notify(NoticeLevel::Warning, NOTHING_TO_OPTIMIZE);
            return None;
        }

        let body = encode(&CodeRequest {
            code,
            language: self.view.language.clone(),
        })?;
        self.enter_busy(Action::Optimize);
        self.view.notify(NoticeLevel::Info, OPTIMIZE_PENDING);
        Some(OutgoingRequest {
            action: Action::Optimize,
            body,
        })
    }

    fn begin_generate(&mut self) -> Option<OutgoingRequest> {
        if self.reject_if_busy(Action::Generate) {
            return None;
        }
        let prompt = self.view.prompt.clone();
        if prompt.trim().is_empty() {
            self.view.generated.show(EMPTY_PROMPT, true);
            self.tabs.activate(GENERATE_TAB);
            self.view.focus_prompt = true;
            return None;
        }

        let body = encode(&PromptRequest {
            prompt,
            language: self.view.language.clone(),
        })?;
        self.enter_busy(Action::Generate);
        self.view.generated.show_loading(GENERATE_PENDING);
        self.tabs.activate(GENERATE_TAB);
        Some(OutgoingRequest {
            action: Action::Generate,
            body,
        })
    }

    fn finish_run(&mut self, outcome: Result<Value, TransportError>) {
        match outcome {
            Ok(data) => {
                let reply: RunReply = decode_reply(data);
                let (text, errored) = reply.transcript();
                self.view.output.show(text, errored);
                match &reply.metrics {
                    Some(m) => {
                        let values = [
                            &m.runtime_ms,
                            &m.cpu_used,
                            &m.mem_used,
                            &m.time_complexity,
                            &m.space_complexity,
                        ];
                        for (slot, value) in MetricSlot::all().iter().zip(values) {
                            self.view.metrics.set(
                                *slot,
                                crate::protocol::format_metric(value.as_ref(), slot.unit()),
                            );
                        }
                    }
                    None => self.view.metrics.fill(NOT_AVAILABLE, false),
                }
            }
            Err(e) => {
                self.view.output.show(
                    format!("Execution Error: {e}\nCheck server logs for details."),
                    true,
                );
                self.view.metrics.fill(METRICS_FAILED, false);
            }
        }
        self.tabs.activate(OUTPUT_TAB);
    }

    fn finish_optimize(&mut self, outcome: Result<Value, TransportError>) {
        let data = match outcome {
            Ok(data) => data,
            Err(e) => {
                self.view.notify(
                    NoticeLevel::Error,
                    format!("Optimization Request Error: {e}"),
                );
                return;
            }
        };

        let reply: OptimizeReply = decode_reply(data);
        match CodeOutcome::classify(reply.optimized_code, OPTIMIZE_FALLBACK) {
            CodeOutcome::Ready(code) => {
                let Some(editor) = self.editor.as_mut().filter(|h| h.is_functional()) else {
                    error!("editor disappeared before optimized code could be applied");
                    self.view.notify(NoticeLevel::Error, EDITOR_NOT_READY);
                    return;
                };
                let cursor = editor.cursor_position();
                editor.set_value(&code, CursorPolicy::Start);
                if let Err(e) = editor.set_cursor_position(cursor) {
                    warn!("couldn't restore cursor position after optimize: {}", e);
                }
                editor.clear_selection();
                self.view.notify(NoticeLevel::Success, OPTIMIZE_DONE);
            }
            CodeOutcome::Failed(message) => self.view.notify(NoticeLevel::Error, message),
        }
    }

    fn finish_generate(&mut self, outcome: Result<Value, TransportError>) {
        match outcome {
            Ok(data) => {
                let reply: GenerateReply = decode_reply(data);
                match CodeOutcome::classify(reply.generated_code, GENERATE_FALLBACK) {
                    CodeOutcome::Ready(code) => self.view.generated.show(code, false),
                    CodeOutcome::Failed(message) => self.view.generated.show(message, true),
                }
            }
            Err(e) => self
                .view
                .generated
                .show(format!("// AI Generation Error: {e}"), true),
        }
    }

    fn reject_if_busy(&self, action: Action) -> bool {
        match self.in_flight {
            Some(current) => {
                warn!(
                    "{} cancelled: {} already in progress",
                    action.label(),
                    current.label()
                );
                true
            }
            None => false,
        }
    }

    /// Current editor text, or `None` (with a notice) when the editor cannot
    /// be used.
    fn editor_code(&mut self) -> Option<String> {
        match &self.editor {
            Some(handle) if handle.is_functional() => Some(handle.value()),
            Some(_) => {
                error!("editor instance exists but is not functional");
                self.view.notify(NoticeLevel::Error, EDITOR_INCOMPLETE);
                None
            }
            None => {
                error!("editor instance is not available");
                self.view.notify(NoticeLevel::Error, EDITOR_NOT_READY);
                None
            }
        }
    }

    fn enter_busy(&mut self, action: Action) {
        self.in_flight = Some(action);
        self.view.buttons.set_enabled(false);
        self.view.buttons.get_mut(action).enter_busy();
        info!("{} started", action.label());
    }

    fn leave_busy(&mut self, action: Action) {
        self.in_flight = None;
        self.view.buttons.set_enabled(true);
        self.view.buttons.get_mut(action).leave_busy();
        info!("{} finished", action.label());
    }

    fn apply_language_mode(&mut self, token: &str) {
        let mode = SyntaxMode::for_language(token).mode_id();
        let Some(editor) = self.editor.as_mut() else {
            warn!("editor not ready, cannot set mode {}", mode);
            return;
        };
        match editor.set_syntax_mode(mode) {
            Ok(()) => info!("editor mode changed to {}", mode),
            Err(e) => error!("error setting editor mode to {}: {}", mode, e),
        }
    }
}

fn encode<B: Serialize>(body: &B) -> Option<Value> {
    serde_json::to_value(body)
        .map_err(|e| error!("failed to encode request body: {}", e))
        .ok()
}
