//! `fetch` transport with an `AbortController` deadline

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use portal_core::transport::decode_body;
use portal_core::{TransportError, WebhookTransport};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response, Window};

pub struct FetchTransport {
    timeout_ms: u64,
}

impl FetchTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

fn network(err: JsValue) -> TransportError {
    TransportError::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// Aborts the request when the timer fires or when dropped unfinished
///
/// Dropping happens when the caller's `Canceller` aborts the future, so
/// cancelling a component also cancels its network request.
struct Deadline {
    window: Window,
    handle: i32,
    controller: AbortController,
    fired: Rc<Cell<bool>>,
    settled: bool,
    _on_timeout: Closure<dyn FnMut()>,
}

impl Deadline {
    fn start(
        window: &Window,
        controller: &AbortController,
        timeout_ms: u64,
    ) -> Result<Self, JsValue> {
        let fired = Rc::new(Cell::new(false));
        let on_timeout = {
            let fired = fired.clone();
            let controller = controller.clone();
            Closure::wrap(Box::new(move || {
                fired.set(true);
                controller.abort();
            }) as Box<dyn FnMut()>)
        };
        let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.as_ref().unchecked_ref(),
            timeout,
        )?;

        Ok(Self {
            window: window.clone(),
            handle,
            controller: controller.clone(),
            fired,
            settled: false,
            _on_timeout: on_timeout,
        })
    }

    fn fired(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.handle);
        if !self.settled {
            self.controller.abort();
        }
    }
}

#[async_trait(?Send)]
impl WebhookTransport for FetchTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let window =
            web_sys::window().ok_or_else(|| TransportError::Network("No window".into()))?;
        let controller = AbortController::new().map_err(network)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body.to_string()));
        opts.set_signal(Some(&controller.signal()));

        let request = Request::new_with_str_and_init(url, &opts).map_err(network)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(network)?;

        let mut deadline =
            Deadline::start(&window, &controller, self.timeout_ms).map_err(network)?;

        let abort_reason = |err: JsValue, deadline: &Deadline| {
            if deadline.fired() {
                TransportError::Timeout(self.timeout_ms)
            } else if controller.signal().aborted() {
                TransportError::Aborted
            } else {
                network(err)
            }
        };

        let response = match JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(response) => response,
            Err(err) => return Err(abort_reason(err, &deadline)),
        };
        let response: Response = response.dyn_into().map_err(network)?;

        let text_promise = response.text().map_err(network)?;
        let text = match JsFuture::from(text_promise).await {
            Ok(text) => text.as_string().unwrap_or_default(),
            Err(err) => return Err(abort_reason(err, &deadline)),
        };
        deadline.settled = true;

        if !response.ok() {
            return Err(TransportError::Status {
                status: response.status(),
                body: text,
            });
        }
        Ok(decode_body(&text))
    }
}
