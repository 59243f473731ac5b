use coderunner::editor::{CursorPolicy, CursorPosition, EditorHost, EditorOptions, EditorWidget};
use coderunner::EditorError;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ace, js_name = edit, catch)]
    fn ace_edit(container: &web_sys::Element) -> Result<AceEditor, JsValue>;

    #[wasm_bindgen(js_namespace = ace, js_name = require, catch)]
    fn ace_require(module: &str) -> Result<JsValue, JsValue>;

    type AceEditor;

    #[wasm_bindgen(method, js_name = getValue)]
    fn get_value(this: &AceEditor) -> String;

    #[wasm_bindgen(method, js_name = setValue)]
    fn set_value(this: &AceEditor, value: &str, cursor_pos: i32) -> String;

    #[wasm_bindgen(method, js_name = getCursorPosition)]
    fn get_cursor_position(this: &AceEditor) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = moveCursorToPosition)]
    fn move_cursor_to_position(this: &AceEditor, pos: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = clearSelection)]
    fn clear_selection(this: &AceEditor);

    #[wasm_bindgen(method, catch, js_name = setTheme)]
    fn set_theme(this: &AceEditor, theme: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setShowPrintMargin)]
    fn set_show_print_margin(this: &AceEditor, show: bool);

    #[wasm_bindgen(method, catch, js_name = setOptions)]
    fn set_options(this: &AceEditor, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, getter)]
    fn session(this: &AceEditor) -> AceSession;

    type AceSession;

    #[wasm_bindgen(method, catch, js_name = setMode)]
    fn set_mode(this: &AceSession, mode: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setUseWrapMode)]
    fn set_use_wrap_mode(this: &AceSession, wrap: bool);

    #[wasm_bindgen(method, js_name = setTabSize)]
    fn set_tab_size(this: &AceSession, size: u32);

    #[wasm_bindgen(method, js_name = setUseSoftTabs)]
    fn set_use_soft_tabs(this: &AceSession, soft: bool);
}

const LANGUAGE_TOOLS: &str = "ace/ext/language_tools";

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn widget_err(e: JsValue) -> EditorError {
    EditorError::Widget(describe(&e))
}

/// Ace's `setOptions` bag.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AceOptions<'a> {
    font_family: &'a str,
    font_size: &'a str,
    enable_basic_autocompletion: bool,
    enable_live_autocompletion: bool,
    enable_snippets: bool,
    highlight_active_line: bool,
    show_gutter: bool,
    use_worker: bool,
}

impl<'a> From<&'a EditorOptions> for AceOptions<'a> {
    fn from(o: &'a EditorOptions) -> Self {
        Self {
            font_family: &o.font_family,
            font_size: &o.font_size,
            enable_basic_autocompletion: o.basic_autocompletion,
            enable_live_autocompletion: o.live_autocompletion,
            enable_snippets: o.snippets,
            highlight_active_line: o.highlight_active_line,
            show_gutter: o.show_gutter,
            use_worker: o.use_worker,
        }
    }
}

/// An Ace editor instance mounted in the page.
pub(super) struct AceWidget {
    editor: AceEditor,
    mode: String,
}

impl EditorWidget for AceWidget {
    fn value(&self) -> String {
        self.editor.get_value()
    }

    fn set_value(&mut self, text: &str, cursor: CursorPolicy) {
        let _ = self.editor.set_value(text, cursor.as_widget_arg());
    }

    fn cursor(&self) -> CursorPosition {
        serde_wasm_bindgen::from_value(self.editor.get_cursor_position()).unwrap_or_default()
    }

    fn move_cursor(&mut self, pos: CursorPosition) -> Result<(), EditorError> {
        let pos = serde_wasm_bindgen::to_value(&pos)
            .map_err(|e| EditorError::Widget(e.to_string()))?;
        self.editor.move_cursor_to_position(&pos).map_err(widget_err)
    }

    fn clear_selection(&mut self) {
        self.editor.clear_selection();
    }

    fn mode(&self) -> String {
        self.mode.clone()
    }

    fn set_mode(&mut self, mode_id: &str) -> Result<(), EditorError> {
        self.editor.session().set_mode(mode_id).map_err(widget_err)?;
        self.mode = mode_id.to_string();
        Ok(())
    }

    fn configure(&mut self, options: &EditorOptions) -> Result<(), EditorError> {
        self.editor.set_theme(&options.theme).map_err(widget_err)?;
        self.set_mode(&options.mode)?;
        self.editor.set_show_print_margin(options.show_print_margin);

        let session = self.editor.session();
        session.set_use_wrap_mode(options.wrap);
        session.set_tab_size(options.tab_size);
        session.set_use_soft_tabs(options.soft_tabs);

        let bag = serde_wasm_bindgen::to_value(&AceOptions::from(options))
            .map_err(|e| EditorError::Widget(e.to_string()))?;
        self.editor.set_options(&bag).map_err(widget_err)
    }

    fn is_functional(&self) -> bool {
        ["getValue", "setValue"].iter().all(|name| {
            js_sys::Reflect::get(&self.editor, &JsValue::from_str(name))
                .map(|f| f.is_function())
                .unwrap_or(false)
        })
    }
}

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

/// The live page: finds the container, checks for the `ace` global and
/// builds [`AceWidget`]s.
pub(super) struct PageHost;

impl EditorHost for PageHost {
    fn container_text(&self, container_id: &str) -> Option<String> {
        document()?
            .get_element_by_id(container_id)
            .map(|el| el.text_content().unwrap_or_default())
    }

    fn library_loaded(&self) -> bool {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("ace"))
            .map(|v| !v.is_undefined() && !v.is_null())
            .unwrap_or(false)
    }

    fn construct(&mut self, container_id: &str) -> Result<Box<dyn EditorWidget>, String> {
        let container = document()
            .and_then(|d| d.get_element_by_id(container_id))
            .ok_or("editor container disappeared")?;
        if let Err(e) = ace_require(LANGUAGE_TOOLS) {
            tracing::warn!("autocompletion unavailable: {}", describe(&e));
        }
        let editor = ace_edit(&container).map_err(|e| describe(&e))?;
        Ok(Box::new(AceWidget {
            editor,
            mode: String::new(),
        }))
    }

    fn show_container_error(&mut self, container_id: &str, message: &str) {
        let Some(el) = document().and_then(|d| d.get_element_by_id(container_id)) else {
            return;
        };
        el.set_text_content(Some(message));
        let _ = el.set_attribute("style", "color: red; padding: 1em; white-space: pre-wrap;");
    }
}
