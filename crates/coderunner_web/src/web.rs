use coderunner::editor::PLACEHOLDER_TEXT;
use coderunner::language::language_options;
use coderunner::tabs::{TabButton, GENERATE_TAB, METRICS_TAB, OUTPUT_TAB};
use coderunner::view::{MetricSlot, PageView};
use coderunner::{Action, ClientConfig, Command, Workbench};
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;

mod ace;
mod fetch;
mod storage;

const PROMPT_ID: &str = "gemini-prompt";
const TAB_CONTENT_ID: &str = "tab-content-wrapper";

pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    mount_to_body(|| view! { <App /> });
}

/// What the page renders, copied out of the workbench after every change.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    view: PageView,
    tabs: Vec<TabButton>,
    active_tab: Option<String>,
    panel_open: bool,
}

impl Snapshot {
    fn of(wb: &Workbench) -> Self {
        Self {
            view: wb.view().clone(),
            tabs: wb.tabs().buttons().to_vec(),
            active_tab: wb.tabs().active().map(str::to_string),
            panel_open: wb.panel().is_open(),
        }
    }
}

fn command_for(action: Action) -> Command {
    match action {
        Action::Run => Command::Run,
        Action::Optimize => Command::Optimize,
        Action::Generate => Command::Generate,
    }
}

fn button_id(action: Action) -> &'static str {
    match action {
        Action::Run => "run-button",
        Action::Optimize => "optimize-button",
        Action::Generate => "gemini-generate-button",
    }
}

fn metric_id(slot: MetricSlot) -> &'static str {
    match slot {
        MetricSlot::Runtime => "metric-runtime",
        MetricSlot::Cpu => "metric-cpu",
        MetricSlot::Memory => "metric-mem",
        MetricSlot::TimeComplexity => "metric-time-comp",
        MetricSlot::SpaceComplexity => "metric-space-comp",
    }
}

fn element_by_id(id: &str) -> Option<web_sys::Element> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
}

fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}

fn yield_to_browser() -> wasm_bindgen_futures::JsFuture {
    wasm_bindgen_futures::JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL))
}

#[component]
fn App() -> impl IntoView {
    let config = ClientConfig::default();
    let container_id = config.editor_container.clone();

    let mut wb = Workbench::new(&config);
    if let Some(prefs) = storage::load_prefs() {
        wb.dispatch(Command::SelectLanguage(prefs.language));
        if prefs.panel_open {
            wb.dispatch(Command::TogglePanel);
        }
        wb.view_mut().take_notices();
    }

    let snapshot = RwSignal::new(Snapshot::of(&wb));
    let bench = StoredValue::new_local(wb);
    let seen_activations = StoredValue::new(bench.with_value(|w| w.tabs().activations()));

    // Copy the workbench out to the page and flush side effects the view
    // model asked for.
    let publish = move || {
        let mut notices = Vec::new();
        let mut focus = false;
        bench.update_value(|w| {
            notices = w.view_mut().take_notices();
            focus = std::mem::take(&mut w.view_mut().focus_prompt);
        });
        let next = bench.with_value(Snapshot::of);
        let (activations, offset) =
            bench.with_value(|w| (w.tabs().activations(), w.tabs().scroll_top()));

        if seen_activations.get_value() != activations {
            seen_activations.set_value(activations);
            if let Some(el) = element_by_id(TAB_CONTENT_ID) {
                el.set_scroll_top(offset as i32);
            }
        }
        snapshot.set(next);

        if focus {
            if let Some(el) = element_by_id(PROMPT_ID)
                .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
            {
                let _ = el.focus();
            }
        }
        for notice in notices {
            alert(&notice.to_string());
        }
    };

    let persist = move || {
        let prefs = bench.with_value(|w| storage::PersistedPrefs {
            language: w.view().language.clone(),
            panel_open: w.panel().is_open(),
        });
        storage::save_prefs(&prefs);
    };

    let dispatch = move |command: Command| {
        let mut request = None;
        bench.update_value(|w| request = w.dispatch(command));
        publish();

        let Some(request) = request else {
            return;
        };
        let url = bench.with_value(|w| w.url_for(&request));
        spawn_local(async move {
            tracing::debug!("POST {}", url);
            let reply = fetch::post_json(&url, &request).await;
            bench.update_value(|w| w.complete(request.action, reply));
            publish();
        });
    };

    // The editor mounts into markup rendered below; wait for it to land.
    Effect::new(move |_| {
        let config = config.clone();
        spawn_local(async move {
            let _ = yield_to_browser().await;
            let mut host = ace::PageHost;
            let mut result = Ok(());
            bench.update_value(|w| result = w.init_editor(&mut host, &config));
            if let Err(e) = result {
                tracing::error!("editor unavailable: {}", e);
            }
            publish();
        });
    });

    let pane_class = move |id: &'static str| {
        move || {
            if snapshot.with(|s| s.active_tab.as_deref() == Some(id)) {
                "tab-content active"
            } else {
                "tab-content"
            }
        }
    };

    let action_button = move |action: Action| {
        view! {
            <button
                id=button_id(action)
                class="action-button"
                prop:disabled=move || snapshot.with(|s| !s.view.buttons.get(action).enabled)
                on:click=move |_| dispatch(command_for(action))
            >
                {move || snapshot.with(|s| s.view.buttons.get(action).label.clone())}
            </button>
        }
    };

    let tab_buttons = snapshot.with_untracked(|s| s.tabs.clone());

    view! {
        <div class="app">
            <header class="toolbar">
                <select
                    id="language-select"
                    prop:value=move || snapshot.with(|s| s.view.language.clone())
                    on:change=move |ev| {
                        dispatch(Command::SelectLanguage(event_target_value(&ev)));
                        persist();
                    }
                >
                    {language_options()
                        .iter()
                        .map(|(token, name)| view! { <option value=*token>{*name}</option> })
                        .collect_view()}
                </select>
                {action_button(Action::Run)}
                {action_button(Action::Optimize)}
            </header>

            <div id=container_id class="editor">{PLACEHOLDER_TEXT}</div>

            <section class=move || {
                if snapshot.with(|s| s.panel_open) { "bottom-panel open" } else { "bottom-panel" }
            }>
                <div
                    id="panel-handle"
                    class="panel-handle"
                    on:click=move |_| {
                        dispatch(Command::TogglePanel);
                        persist();
                    }
                >
                    "Output"
                </div>
                <nav class="tab-strip">
                    {tab_buttons
                        .into_iter()
                        .map(|tab| {
                            let id_for_class = tab.id.clone();
                            let id_for_click = tab.id.clone();
                            view! {
                                <button
                                    class=move || {
                                        if snapshot.with(|s| s.active_tab.as_deref() == Some(id_for_class.as_str())) {
                                            "tab-button active"
                                        } else {
                                            "tab-button"
                                        }
                                    }
                                    attr:data-tab=tab.id
                                    on:click=move |_| dispatch(Command::ActivateTab(id_for_click.clone()))
                                >
                                    {tab.label}
                                </button>
                            }
                        })
                        .collect_view()}
                </nav>
                <div
                    id=TAB_CONTENT_ID
                    class="tab-content-wrapper"
                    on:scroll=move |ev| {
                        let Some(el) = ev
                            .target()
                            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                        else {
                            return;
                        };
                        let offset = el.scroll_top().max(0) as u32;
                        bench.update_value(|w| {
                            w.dispatch(Command::ScrollTabs(offset));
                        });
                    }
                >
                    <div id=OUTPUT_TAB class=pane_class(OUTPUT_TAB)>
                        <pre
                            id="output-area"
                            class=move || snapshot.with(|s| s.view.output.class())
                        >
                            {move || snapshot.with(|s| s.view.output.text.clone())}
                        </pre>
                    </div>
                    <div id=METRICS_TAB class=pane_class(METRICS_TAB)>
                        <dl class="metrics">
                            {MetricSlot::all()
                                .iter()
                                .map(|slot| {
                                    let slot = *slot;
                                    view! {
                                        <dt>{slot.label()}</dt>
                                        <dd>
                                            <span
                                                id=metric_id(slot)
                                                class=move || {
                                                    if snapshot.with(|s| s.view.metrics.is_loading(slot)) {
                                                        "metric loading"
                                                    } else {
                                                        "metric"
                                                    }
                                                }
                                            >
                                                {move || snapshot.with(|s| s.view.metrics.get(slot).to_string())}
                                            </span>
                                        </dd>
                                    }
                                })
                                .collect_view()}
                        </dl>
                    </div>
                    <div id=GENERATE_TAB class=pane_class(GENERATE_TAB)>
                        <textarea
                            id=PROMPT_ID
                            placeholder="Describe the code you want..."
                            prop:value=move || snapshot.with(|s| s.view.prompt.clone())
                            on:input=move |ev| dispatch(Command::SetPrompt(event_target_value(&ev)))
                        ></textarea>
                        {action_button(Action::Generate)}
                        <pre
                            id="gemini-output-area"
                            class=move || snapshot.with(|s| s.view.generated.class())
                        >
                            {move || snapshot.with(|s| s.view.generated.text.clone())}
                        </pre>
                    </div>
                </div>
            </section>
        </div>
    }
}
