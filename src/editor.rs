//! Editor adapter.
//!
//! The code editor itself is a third-party widget living in the page. This
//! module owns the bring-up sequence (container lookup, library check,
//! construction, configuration, seeding) and hands the rest of the client an
//! [`EditorHandle`] so nothing else touches the widget directly.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{EditorError, InitError};

/// Text shipped in the static page before the widget takes over.
pub const PLACEHOLDER_TEXT: &str = "// Start coding here...";

pub const DEFAULT_PROGRAM: &str = "print(\"Hello, World!\")\n";

pub const LIBRARY_MISSING_MESSAGE: &str =
    "Error: Code editor library failed to load. Check network connection or browser console.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorPosition {
    pub row: u32,
    pub column: u32,
}

impl CursorPosition {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Where the cursor lands after the whole document is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPolicy {
    Start,
    End,
}

impl CursorPolicy {
    /// Ace encodes this as `-1` (start) / `1` (end).
    pub fn as_widget_arg(self) -> i32 {
        match self {
            CursorPolicy::Start => -1,
            CursorPolicy::End => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    pub theme: String,
    pub mode: String,
    pub show_print_margin: bool,
    pub wrap: bool,
    pub tab_size: u32,
    pub soft_tabs: bool,
    pub font_family: String,
    pub font_size: String,
    pub basic_autocompletion: bool,
    pub live_autocompletion: bool,
    pub snippets: bool,
    pub highlight_active_line: bool,
    pub show_gutter: bool,
    /// Background syntax checking.
    pub use_worker: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            theme: "ace/theme/chrome".to_string(),
            mode: crate::language::SyntaxMode::default().mode_id().to_string(),
            show_print_margin: false,
            wrap: true,
            tab_size: 4,
            soft_tabs: true,
            font_family: "Fira Code, Monaco, Menlo, Consolas, 'Courier New', monospace"
                .to_string(),
            font_size: "14px".to_string(),
            basic_autocompletion: true,
            live_autocompletion: true,
            snippets: true,
            highlight_active_line: true,
            show_gutter: true,
            use_worker: true,
        }
    }
}

/// Surface the client needs from a text-editing widget.
pub trait EditorWidget {
    fn value(&self) -> String;
    fn set_value(&mut self, text: &str, cursor: CursorPolicy);
    fn cursor(&self) -> CursorPosition;
    fn move_cursor(&mut self, pos: CursorPosition) -> Result<(), EditorError>;
    fn clear_selection(&mut self);
    fn mode(&self) -> String;
    fn set_mode(&mut self, mode_id: &str) -> Result<(), EditorError>;
    fn configure(&mut self, options: &EditorOptions) -> Result<(), EditorError>;

    /// Whether the widget still answers get/set calls.
    fn is_functional(&self) -> bool {
        true
    }
}

/// The page the widget is mounted into.
pub trait EditorHost {
    /// Current text of the container, or `None` when it does not exist.
    fn container_text(&self, container_id: &str) -> Option<String>;
    fn library_loaded(&self) -> bool;
    fn construct(&mut self, container_id: &str) -> Result<Box<dyn EditorWidget>, String>;
    /// Replace the container's visible content with an error message.
    fn show_container_error(&mut self, container_id: &str, message: &str);
}

/// The single live editor. Absence of a handle means "editor unavailable".
pub struct EditorHandle {
    widget: Box<dyn EditorWidget>,
}

impl EditorHandle {
    pub fn new(widget: Box<dyn EditorWidget>) -> Self {
        Self { widget }
    }

    pub fn value(&self) -> String {
        self.widget.value()
    }

    pub fn set_value(&mut self, text: &str, cursor: CursorPolicy) {
        self.widget.set_value(text, cursor);
    }

    pub fn cursor_position(&self) -> CursorPosition {
        self.widget.cursor()
    }

    /// Best-effort; callers log and drop the error.
    pub fn set_cursor_position(&mut self, pos: CursorPosition) -> Result<(), EditorError> {
        self.widget.move_cursor(pos)
    }

    pub fn clear_selection(&mut self) {
        self.widget.clear_selection();
    }

    pub fn syntax_mode(&self) -> String {
        self.widget.mode()
    }

    pub fn set_syntax_mode(&mut self, mode_id: &str) -> Result<(), EditorError> {
        self.widget.set_mode(mode_id)
    }

    pub fn is_functional(&self) -> bool {
        self.widget.is_functional()
    }
}

impl std::fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle")
            .field("mode", &self.widget.mode())
            .field("len", &self.widget.value().len())
            .finish()
    }
}

/// Bring up the widget inside `container_id`.
///
/// On any failure after the container is found, the container shows a
/// readable error instead of an editor.
pub fn initialize<H: EditorHost + ?Sized>(
    host: &mut H,
    container_id: &str,
    options: &EditorOptions,
) -> Result<EditorHandle, InitError> {
    info!("initializing editor in '#{}'", container_id);

    let Some(initial_text) = host.container_text(container_id) else {
        error!("editor container '#{}' not found", container_id);
        return Err(InitError::ContainerMissing(container_id.to_string()));
    };

    if !host.library_loaded() {
        error!("editor library is not loaded");
        host.show_container_error(container_id, LIBRARY_MISSING_MESSAGE);
        return Err(InitError::LibraryMissing);
    }

    let mut widget = match host.construct(container_id) {
        Ok(w) => w,
        Err(e) => {
            error!("editor construction failed: {}", e);
            host.show_container_error(container_id, &instance_error_message(&e));
            return Err(InitError::Construct(e));
        }
    };

    if let Err(e) = widget.configure(options) {
        let msg = e.to_string();
        error!("editor configuration failed: {}", msg);
        host.show_container_error(container_id, &instance_error_message(&msg));
        return Err(InitError::Configure(msg));
    }

    let initial_text = initial_text.trim();
    if initial_text.is_empty()
        || initial_text == PLACEHOLDER_TEXT
        || widget.value().trim().is_empty()
    {
        widget.set_value(DEFAULT_PROGRAM, CursorPolicy::Start);
        debug!("seeded default editor content");
    } else {
        debug!("editor already had content, preserving it");
        let mode = widget.mode();
        if let Err(e) = widget.set_mode(&mode) {
            warn!("could not re-apply mode {}: {}", mode, e);
        }
    }

    info!("editor initialized");
    Ok(EditorHandle::new(widget))
}

fn instance_error_message(detail: &str) -> String {
    format!("Error initializing editor instance: {detail}. See browser console for details.")
}

/// In-memory widget used by the terminal client and tests.
#[derive(Debug, Clone, Default)]
pub struct BufferEditor {
    text: String,
    cursor: CursorPosition,
    selection: Option<(CursorPosition, CursorPosition)>,
    mode: String,
    options: Option<EditorOptions>,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn options(&self) -> Option<&EditorOptions> {
        self.options.as_ref()
    }

    pub fn select_all(&mut self) {
        self.selection = Some((CursorPosition::default(), self.end_position()));
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    fn end_position(&self) -> CursorPosition {
        let row = self.text.split('\n').count().saturating_sub(1);
        let column = self.text.split('\n').last().map_or(0, |l| l.chars().count());
        CursorPosition::new(row as u32, column as u32)
    }
}

impl EditorWidget for BufferEditor {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, text: &str, cursor: CursorPolicy) {
        self.text = text.to_string();
        self.selection = None;
        self.cursor = match cursor {
            CursorPolicy::Start => CursorPosition::default(),
            CursorPolicy::End => self.end_position(),
        };
    }

    fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    fn move_cursor(&mut self, pos: CursorPosition) -> Result<(), EditorError> {
        let line = self
            .text
            .split('\n')
            .nth(pos.row as usize)
            .ok_or(EditorError::CursorOutOfRange {
                row: pos.row,
                column: pos.column,
            })?;
        if pos.column as usize > line.chars().count() {
            return Err(EditorError::CursorOutOfRange {
                row: pos.row,
                column: pos.column,
            });
        }
        self.cursor = pos;
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn mode(&self) -> String {
        self.mode.clone()
    }

    fn set_mode(&mut self, mode_id: &str) -> Result<(), EditorError> {
        if !mode_id.starts_with("ace/mode/") {
            return Err(EditorError::Widget(format!("unknown mode {mode_id}")));
        }
        self.mode = mode_id.to_string();
        Ok(())
    }

    fn configure(&mut self, options: &EditorOptions) -> Result<(), EditorError> {
        self.set_mode(&options.mode)?;
        self.options = Some(options.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePage {
        container: Option<String>,
        library: bool,
        construct_error: Option<String>,
        shown: Vec<String>,
    }

    impl EditorHost for FakePage {
        fn container_text(&self, _container_id: &str) -> Option<String> {
            self.container.clone()
        }

        fn library_loaded(&self) -> bool {
            self.library
        }

        fn construct(&mut self, _container_id: &str) -> Result<Box<dyn EditorWidget>, String> {
            match &self.construct_error {
                Some(e) => Err(e.clone()),
                None => Ok(Box::new(BufferEditor::with_text(
                    self.container.clone().unwrap_or_default(),
                ))),
            }
        }

        fn show_container_error(&mut self, _container_id: &str, message: &str) {
            self.shown.push(message.to_string());
        }
    }

    fn page(text: &str) -> FakePage {
        FakePage {
            container: Some(text.to_string()),
            library: true,
            ..FakePage::default()
        }
    }

    #[test]
    fn missing_container_fails_without_message() {
        let mut host = FakePage {
            library: true,
            ..FakePage::default()
        };
        let err = initialize(&mut host, "editor", &EditorOptions::default()).unwrap_err();
        assert_eq!(err, InitError::ContainerMissing("editor".into()));
        assert!(host.shown.is_empty());
    }

    #[test]
    fn missing_library_shows_message_in_container() {
        let mut host = FakePage {
            library: false,
            ..page("")
        };
        let err = initialize(&mut host, "editor", &EditorOptions::default()).unwrap_err();
        assert_eq!(err, InitError::LibraryMissing);
        assert_eq!(host.shown, vec![LIBRARY_MISSING_MESSAGE.to_string()]);
    }

    #[test]
    fn construction_failure_is_reported() {
        let mut host = FakePage {
            construct_error: Some("boom".into()),
            ..page("")
        };
        let err = initialize(&mut host, "editor", &EditorOptions::default()).unwrap_err();
        assert_eq!(err, InitError::Construct("boom".into()));
        assert_eq!(
            host.shown,
            vec!["Error initializing editor instance: boom. See browser console for details."
                .to_string()]
        );
    }

    #[test]
    fn bad_mode_in_options_fails_configuration() {
        let mut host = page("");
        let options = EditorOptions {
            mode: "python".into(),
            ..EditorOptions::default()
        };
        let err = initialize(&mut host, "editor", &options).unwrap_err();
        assert!(matches!(err, InitError::Configure(_)));
        assert_eq!(host.shown.len(), 1);
    }

    #[test]
    fn empty_or_placeholder_container_gets_default_program() {
        for text in ["", "   ", PLACEHOLDER_TEXT, "\n// Start coding here...\n"] {
            let mut host = page(text);
            let handle = initialize(&mut host, "editor", &EditorOptions::default()).unwrap();
            assert_eq!(handle.value(), DEFAULT_PROGRAM);
            assert_eq!(handle.cursor_position(), CursorPosition::default());
            assert_eq!(handle.syntax_mode(), "ace/mode/python");
        }
    }

    #[test]
    fn existing_content_is_preserved() {
        let mut host = page("int main() { return 0; }");
        let handle = initialize(&mut host, "editor", &EditorOptions::default()).unwrap();
        assert_eq!(handle.value(), "int main() { return 0; }");
        assert!(handle.is_functional());
    }

    #[test]
    fn cursor_restore_is_bounded_by_document() {
        let mut handle = EditorHandle::new(Box::new(BufferEditor::with_text("ab\ncd")));
        assert!(handle.set_cursor_position(CursorPosition::new(1, 2)).is_ok());
        assert_eq!(handle.cursor_position(), CursorPosition::new(1, 2));
        assert_eq!(
            handle.set_cursor_position(CursorPosition::new(5, 0)),
            Err(EditorError::CursorOutOfRange { row: 5, column: 0 })
        );
        assert_eq!(handle.cursor_position(), CursorPosition::new(1, 2));
    }

    #[test]
    fn set_value_places_cursor_and_drops_selection() {
        let mut editor = BufferEditor::with_text("old");
        editor.select_all();
        assert!(editor.has_selection());
        editor.set_value("one\ntwo", CursorPolicy::End);
        assert!(!editor.has_selection());
        assert_eq!(editor.cursor(), CursorPosition::new(1, 3));
        editor.set_value("x", CursorPolicy::Start);
        assert_eq!(editor.cursor(), CursorPosition::default());
    }

    #[test]
    fn configure_records_options() {
        let mut editor = BufferEditor::new();
        editor.configure(&EditorOptions::default()).unwrap();
        let options = editor.options().unwrap();
        assert_eq!(options.tab_size, 4);
        assert!(options.soft_tabs && options.wrap && options.use_worker);
        assert_eq!(CursorPolicy::Start.as_widget_arg(), -1);
    }
}
