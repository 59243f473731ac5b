use coderunner::protocol::REQUEST_HEADERS;
use coderunner::{HttpReply, OutgoingRequest, TransportError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn network(e: JsValue) -> TransportError {
    TransportError::Network(describe(&e))
}

/// POST `request` as JSON. Any HTTP status comes back as a reply; only a
/// failure to reach the server is an error.
pub(super) async fn post_json(
    url: &str,
    request: &OutgoingRequest,
) -> Result<HttpReply, TransportError> {
    let headers = Headers::new().map_err(network)?;
    for (name, value) in REQUEST_HEADERS {
        headers.set(name, value).map_err(network)?;
    }

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_headers(&headers);
    opts.set_body(&JsValue::from_str(&request.body_json()));

    let req = Request::new_with_str_and_init(url, &opts).map_err(network)?;
    let window =
        web_sys::window().ok_or_else(|| TransportError::Network("no window".to_string()))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(network)?;
    let resp: Response = resp_value.dyn_into().map_err(network)?;

    let text = JsFuture::from(resp.text().map_err(network)?)
        .await
        .map_err(network)?;
    Ok(HttpReply::new(
        resp.status(),
        resp.status_text(),
        text.as_string().unwrap_or_default(),
    ))
}
