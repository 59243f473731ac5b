//! JSON wire format spoken with the execution backend, and the rules for
//! turning raw HTTP replies into something the workbench can display.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::error::TransportError;

/// Marker the backend puts in front of a code payload when the AI call failed.
pub const ERROR_PREFIX: &str = "Error:";

pub const NOT_AVAILABLE: &str = "N/A";

pub const NO_OUTPUT_MESSAGE: &str = "Execution finished successfully with no output.";

pub const REQUEST_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

/// The three network actions. Each one maps to exactly one backend route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Run,
    Optimize,
    Generate,
}

impl Action {
    pub fn path(self) -> &'static str {
        match self {
            Action::Run => "/run",
            Action::Optimize => "/optimize",
            Action::Generate => "/generate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Run => "run",
            Action::Optimize => "optimize",
            Action::Generate => "generate",
        }
    }

    pub fn all() -> &'static [Action] {
        &[Action::Run, Action::Optimize, Action::Generate]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRequest {
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    pub language: String,
}

/// A POST the front end must perform on behalf of the workbench.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub action: Action,
    pub body: Value,
}

impl OutgoingRequest {
    pub fn path(&self) -> &'static str {
        self.action.path()
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    pub fn body_json(&self) -> String {
        self.body.to_string()
    }
}

/// Raw reply as seen by the front end's HTTP stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// A `200 OK` carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, "OK", body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Normalize a reply: the body must be JSON, and a non-2xx status becomes an
/// error carrying the body's `error` field, the status text, or the code.
pub fn interpret_reply(reply: &HttpReply) -> Result<Value, TransportError> {
    let data: Value = serde_json::from_str(&reply.body).map_err(|e| {
        error!("failed to parse JSON response: {}", e);
        TransportError::NonJson {
            status: reply.status,
            status_text: reply.status_text.clone(),
        }
    })?;

    if !reply.is_success() {
        let message = data
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| (!reply.status_text.is_empty()).then(|| reply.status_text.clone()))
            .unwrap_or_else(|| format!("HTTP error {}", reply.status));
        error!("fetch error {}: {}", reply.status, message);
        return Err(TransportError::Status(message));
    }

    Ok(data)
}

/// Decode a successful body leniently: a body of the wrong shape reads as a
/// reply with every field absent, and a mistyped field only loses itself.
pub fn decode_reply<T: DeserializeOwned + Default>(data: Value) -> T {
    serde_json::from_value(data).unwrap_or_else(|e| {
        warn!("unexpected reply shape: {}", e);
        T::default()
    })
}

/// Text field that tolerates non-string scalars by printing them.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => {
            warn!("non-string reply field: {}", other);
            Some(other.to_string())
        }
    })
}

fn lenient_metrics<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RunMetrics>, D::Error> {
    match Value::deserialize(d)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value)
            .map_err(|e| warn!("unreadable metrics: {}", e))
            .ok()),
        Value::Null => Ok(None),
        other => {
            warn!("metrics is not an object: {}", other);
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunReply {
    #[serde(default, deserialize_with = "lenient_text")]
    pub output: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_metrics")]
    pub metrics: Option<RunMetrics>,
}

impl RunReply {
    /// Combined pane text and whether the pane should be marked errored.
    pub fn transcript(&self) -> (String, bool) {
        let mut text = String::new();
        let error = present(&self.error);
        if let Some(error) = error {
            text.push_str("Error:\n------\n");
            text.push_str(error);
        }
        if let Some(output) = present(&self.output) {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str("Output:\n-------\n");
            text.push_str(output);
        }
        if text.is_empty() {
            text.push_str(NO_OUTPUT_MESSAGE);
        }
        (text, error.is_some())
    }
}

/// Execution statistics. Values are whatever scalar the backend chose to send
/// (numbers, preformatted strings such as `"1.20 MiB"`, or `-1` for unknown).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunMetrics {
    #[serde(default)]
    pub runtime_ms: Option<Value>,
    #[serde(default)]
    pub cpu_used: Option<Value>,
    #[serde(default)]
    pub mem_used: Option<Value>,
    #[serde(default)]
    pub time_complexity: Option<Value>,
    #[serde(default)]
    pub space_complexity: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptimizeReply {
    #[serde(default, deserialize_with = "lenient_text")]
    pub optimized_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateReply {
    #[serde(default, deserialize_with = "lenient_text")]
    pub generated_code: Option<String>,
}

/// Discriminated view of an AI code payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    Ready(String),
    Failed(String),
}

impl CodeOutcome {
    /// The backend signals failure in-band with an `Error:` prefix; this is the
    /// only place that convention is interpreted.
    pub fn classify(payload: Option<String>, fallback: &str) -> Self {
        match payload.filter(|s| !s.is_empty()) {
            Some(code) if code.starts_with(ERROR_PREFIX) => CodeOutcome::Failed(code),
            Some(code) => CodeOutcome::Ready(code),
            None => CodeOutcome::Failed(fallback.to_string()),
        }
    }
}

/// Render one metric for display; missing, null, `"N/A"` and `-1` all read `N/A`.
pub fn format_metric(value: Option<&Value>, unit: &str) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s == NOT_AVAILABLE => NOT_AVAILABLE.to_string(),
        Some(Value::Number(n)) if n.as_f64() == Some(-1.0) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => format!("{s}{unit}"),
        Some(Value::Number(n)) => format!("{}{unit}", display_number(n)),
        Some(other) => format!("{other}{unit}"),
    }
}

fn display_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_bodies_use_wire_field_names() {
        let body = serde_json::to_value(CodeRequest {
            code: "print(1)".into(),
            language: "python".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"code": "print(1)", "language": "python"}));

        let body = serde_json::to_value(PromptRequest {
            prompt: "fizzbuzz".into(),
            language: "cpp".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"prompt": "fizzbuzz", "language": "cpp"}));
    }

    #[test]
    fn url_joins_base_and_route() {
        let req = OutgoingRequest {
            action: Action::Optimize,
            body: json!({}),
        };
        assert_eq!(req.url(""), "/optimize");
        assert_eq!(req.url("http://localhost:5000/"), "http://localhost:5000/optimize");
    }

    #[test]
    fn non_json_body_is_a_distinct_failure() {
        let reply = HttpReply::new(502, "Bad Gateway", "<html>oops</html>");
        assert_eq!(
            interpret_reply(&reply),
            Err(TransportError::NonJson {
                status: 502,
                status_text: "Bad Gateway".into()
            })
        );
    }

    #[test]
    fn error_status_prefers_body_error_then_status_text_then_code() {
        let with_field = HttpReply::new(400, "Bad Request", r#"{"error":"No code provided"}"#);
        assert_eq!(
            interpret_reply(&with_field),
            Err(TransportError::Status("No code provided".into()))
        );

        let with_text = HttpReply::new(500, "Internal Server Error", "{}");
        assert_eq!(
            interpret_reply(&with_text),
            Err(TransportError::Status("Internal Server Error".into()))
        );

        let bare = HttpReply::new(503, "", r#"{"error":""}"#);
        assert_eq!(
            interpret_reply(&bare),
            Err(TransportError::Status("HTTP error 503".into()))
        );
    }

    #[test]
    fn success_passes_body_through() {
        let reply = HttpReply::ok(r#"{"output":"5"}"#);
        assert_eq!(interpret_reply(&reply), Ok(json!({"output": "5"})));
    }

    #[test]
    fn transcript_layouts() {
        let out = RunReply {
            output: Some("5".into()),
            ..Default::default()
        };
        assert_eq!(out.transcript(), ("Output:\n-------\n5".to_string(), false));

        let err = RunReply {
            error: Some("boom".into()),
            ..Default::default()
        };
        assert_eq!(err.transcript(), ("Error:\n------\nboom".to_string(), true));

        let both = RunReply {
            output: Some("partial".into()),
            error: Some("exit 1".into()),
            metrics: None,
        };
        assert_eq!(
            both.transcript().0,
            "Error:\n------\nexit 1\n\nOutput:\n-------\npartial"
        );

        let blank = RunReply {
            output: Some(String::new()),
            error: Some(String::new()),
            metrics: None,
        };
        assert_eq!(blank.transcript(), (NO_OUTPUT_MESSAGE.to_string(), false));
    }

    #[test]
    fn metrics_format_sentinels_as_not_available() {
        assert_eq!(format_metric(Some(&json!(12)), " ms"), "12 ms");
        assert_eq!(format_metric(Some(&json!(12.5)), " ms"), "12.5 ms");
        assert_eq!(format_metric(Some(&json!(40.0)), " ms"), "40 ms");
        assert_eq!(format_metric(Some(&json!("1.20 MiB")), ""), "1.20 MiB");
        assert_eq!(format_metric(Some(&json!(-1)), " ms"), NOT_AVAILABLE);
        assert_eq!(format_metric(Some(&json!("N/A")), ""), NOT_AVAILABLE);
        assert_eq!(format_metric(Some(&Value::Null), ""), NOT_AVAILABLE);
        assert_eq!(format_metric(None, " ms"), NOT_AVAILABLE);
    }

    #[test]
    fn null_metric_fields_decode_as_absent() {
        let reply: RunReply =
            decode_reply(json!({"metrics": {"runtime_ms": null, "mem_used": "2.00 MiB"}}));
        let metrics = reply.metrics.unwrap();
        assert_eq!(metrics.runtime_ms, None);
        assert_eq!(metrics.mem_used, Some(json!("2.00 MiB")));
    }

    #[test]
    fn wrong_shape_decodes_to_empty_reply() {
        let reply: RunReply = decode_reply(json!(["not", "an", "object"]));
        assert_eq!(reply, RunReply::default());
    }

    #[test]
    fn mistyped_field_keeps_the_rest_of_the_reply() {
        let reply: RunReply =
            decode_reply(json!({"output": "5", "error": 42, "metrics": {"runtime_ms": 12}}));
        assert_eq!(reply.output.as_deref(), Some("5"));
        assert_eq!(reply.error.as_deref(), Some("42"));
        assert_eq!(reply.metrics.unwrap().runtime_ms, Some(json!(12)));

        let reply: RunReply = decode_reply(json!({"output": "ok", "metrics": "soon"}));
        assert_eq!(reply.output.as_deref(), Some("ok"));
        assert_eq!(reply.metrics, None);

        let reply: GenerateReply = decode_reply(json!({"generated_code": null}));
        assert_eq!(reply.generated_code, None);
    }

    #[test]
    fn code_outcome_classification() {
        assert_eq!(
            CodeOutcome::classify(Some("print(1)".into()), "fallback"),
            CodeOutcome::Ready("print(1)".into())
        );
        assert_eq!(
            CodeOutcome::classify(Some("Error: bad".into()), "fallback"),
            CodeOutcome::Failed("Error: bad".into())
        );
        assert_eq!(
            CodeOutcome::classify(Some(String::new()), "fallback"),
            CodeOutcome::Failed("fallback".into())
        );
        assert_eq!(
            CodeOutcome::classify(None, "fallback"),
            CodeOutcome::Failed("fallback".into())
        );
    }
}
