//! JS-facing facade over the portal core
//!
//! Components are checked out of their slot for the length of a request,
//! so a second call from JS while one is in flight sees "busy" instead of
//! a borrow panic.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use draft_model::{DocumentKind, FieldError};
use js_sys::Uint8Array;
use portal_core::{
    navigate, AuthContext, Canceller, ChatSession, FormSession, KeyValueStore, LoginForm,
    Navigation, PortalConfig, PortalError, PreviewModal, SignupFlow, SignupProfile, SignupStep,
    WebhookClient,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::download::trigger_download;
use crate::fetch::FetchTransport;
use crate::storage::SessionStore;

const BUSY_MESSAGE: &str = "A request is already in progress";

enum SlotState<T> {
    Empty,
    Idle(T),
    Busy,
}

/// A component that can be lent out to one async call at a time
struct Slot<T>(RefCell<SlotState<T>>);

impl<T> Slot<T> {
    fn empty() -> Self {
        Slot(RefCell::new(SlotState::Empty))
    }

    fn put(&self, value: T) {
        *self.0.borrow_mut() = SlotState::Idle(value);
    }

    fn clear(&self) {
        *self.0.borrow_mut() = SlotState::Empty;
    }

    fn is_empty(&self) -> bool {
        matches!(*self.0.borrow(), SlotState::Empty)
    }

    /// Lend the component out; `missing` names it when nothing is open
    fn checkout(&self, missing: &'static str) -> Result<T, PortalError> {
        let mut state = self.0.borrow_mut();
        match std::mem::replace(&mut *state, SlotState::Busy) {
            SlotState::Idle(value) => Ok(value),
            SlotState::Busy => Err(PortalError::Busy),
            SlotState::Empty => {
                *state = SlotState::Empty;
                Err(PortalError::OutOfStep(missing))
            }
        }
    }

    fn give_back(&self, value: T) {
        let mut state = self.0.borrow_mut();
        // Cleared while lent out (logout): drop the component
        if matches!(*state, SlotState::Busy) {
            *state = SlotState::Idle(value);
        }
    }

    fn with<R>(
        &self,
        missing: &'static str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, PortalError> {
        match &mut *self.0.borrow_mut() {
            SlotState::Idle(value) => Ok(f(value)),
            SlotState::Busy => Err(PortalError::Busy),
            SlotState::Empty => Err(PortalError::OutOfStep(missing)),
        }
    }
}

/// What a view shows after an action settles
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    ok: bool,
    step: Option<String>,
    message: Option<String>,
    field_errors: Vec<FieldError>,
}

#[wasm_bindgen]
impl Outcome {
    #[wasm_bindgen(getter)]
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// Signup step after the action, if the action was part of signup
    #[wasm_bindgen(getter)]
    pub fn step(&self) -> Option<String> {
        self.step.clone()
    }

    /// Inline message for the whole form
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> Option<String> {
        self.message.clone()
    }

    /// `[{ field, message }]`
    #[wasm_bindgen(getter)]
    pub fn field_errors(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.field_errors).unwrap_or(JsValue::NULL)
    }
}

impl Outcome {
    fn success() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    fn failure(err: PortalError, inline: Option<&str>) -> Self {
        match err {
            PortalError::Validation(field_errors) => Self {
                field_errors,
                ..Self::default()
            },
            PortalError::Busy => Self {
                message: Some(BUSY_MESSAGE.to_string()),
                ..Self::default()
            },
            other => Self {
                message: Some(inline.map(str::to_string).unwrap_or_else(|| other.to_string())),
                ..Self::default()
            },
        }
    }

    fn with_step(mut self, step: SignupStep) -> Self {
        self.step = Some(step_name(step).to_string());
        self
    }
}

fn step_name(step: SignupStep) -> &'static str {
    match step {
        SignupStep::Credentials => "credentials",
        SignupStep::OtpEntry => "otp",
        SignupStep::Profile => "profile",
        SignupStep::Complete => "complete",
    }
}

#[derive(Serialize)]
struct NavigationView {
    action: &'static str,
    path: Option<String>,
}

#[derive(Serialize)]
struct KindView {
    slug: &'static str,
    title: &'static str,
    path: String,
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

#[wasm_bindgen]
pub struct Portal {
    client: WebhookClient,
    store: Rc<dyn KeyValueStore>,
    auth: RefCell<AuthContext>,
    login: Slot<LoginForm>,
    signup: Slot<SignupFlow>,
    form: Slot<FormSession>,
    chat: Slot<ChatSession>,
    preview: RefCell<PreviewModal>,
    cancellers: RefCell<BTreeMap<&'static str, Canceller>>,
}

#[wasm_bindgen]
impl Portal {
    /// `config_json` has the same shape as the native TOML config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Portal, JsValue> {
        let config = PortalConfig::from_json(config_json).map_err(js_error)?;
        let store: Rc<dyn KeyValueStore> = Rc::new(SessionStore::open()?);
        let auth = AuthContext::restore(store.clone()).map_err(js_error)?;

        let transport = Rc::new(FetchTransport::new(config.http.timeout_ms));
        let preview = PreviewModal::new(config.render.clone());
        let client = WebhookClient::new(config, transport);

        let portal = Portal {
            client,
            store,
            auth: RefCell::new(auth),
            login: Slot::empty(),
            signup: Slot::empty(),
            form: Slot::empty(),
            chat: Slot::empty(),
            preview: RefCell::new(preview),
            cancellers: RefCell::new(BTreeMap::new()),
        };
        portal.reset_login();
        portal.reset_signup();
        Ok(portal)
    }

    /// Resolve a path against the route table and the login guard
    ///
    /// Returns `{ action: "render" | "redirect" | "not_found", path }`.
    #[wasm_bindgen]
    pub fn navigate(&self, path: &str) -> Result<JsValue, JsValue> {
        let view = match navigate(path, &self.auth.borrow()) {
            Navigation::Render(route) => NavigationView {
                action: "render",
                path: Some(route.path()),
            },
            Navigation::Redirect(route) => NavigationView {
                action: "redirect",
                path: Some(route.path()),
            },
            Navigation::NotFound => NavigationView {
                action: "not_found",
                path: None,
            },
        };
        to_js(&view)
    }

    #[wasm_bindgen(getter)]
    pub fn authenticated(&self) -> bool {
        self.auth.borrow().is_authenticated()
    }

    #[wasm_bindgen(getter)]
    pub fn user_email(&self) -> Option<String> {
        self.auth.borrow().user_email().ok().flatten()
    }

    fn track(&self, component: &'static str, canceller: Canceller) {
        self.cancellers.borrow_mut().insert(component, canceller);
    }

    // ----- Login -----

    fn reset_login(&self) {
        let form = LoginForm::new();
        self.track("login", form.canceller());
        self.login.put(form);
    }

    #[wasm_bindgen]
    pub async fn login(&self, email: String, password: String) -> Result<Outcome, JsValue> {
        let mut form = match self.login.checkout("login") {
            Ok(form) => form,
            Err(e) => return Ok(Outcome::failure(e, None)),
        };
        // The auth context is only touched after the reply arrives
        let mut auth = AuthContext::new(self.store.clone());
        let result = form.submit(&self.client, &mut auth, &email, &password).await;

        let outcome = match result {
            Ok(_) if auth.is_authenticated() => {
                *self.auth.borrow_mut() = auth;
                web_sys::console::log_1(&"Logged in".into());
                Outcome::success()
            }
            Ok(_) => Outcome {
                message: form.inline_message().map(str::to_string),
                ..Outcome::default()
            },
            Err(e) => Outcome::failure(e, form.inline_message()),
        };
        self.login.give_back(form);
        Ok(outcome)
    }

    /// Clears the token and session ids and closes every open component
    #[wasm_bindgen]
    pub fn logout(&self) -> Result<(), JsValue> {
        self.teardown();
        self.auth.borrow_mut().logout().map_err(js_error)?;
        self.form.clear();
        self.chat.clear();
        self.preview.borrow_mut().close();
        self.reset_login();
        self.reset_signup();
        Ok(())
    }

    // ----- Signup -----

    #[wasm_bindgen]
    pub fn reset_signup(&self) {
        let flow = SignupFlow::new();
        self.track("signup", flow.canceller());
        self.signup.put(flow);
    }

    #[wasm_bindgen(getter)]
    pub fn signup_step(&self) -> Result<String, JsValue> {
        self.signup
            .with("signup", |flow| step_name(flow.step()).to_string())
            .map_err(js_error)
    }

    fn settle_signup(&self, flow: SignupFlow, result: Result<SignupStep, PortalError>) -> Outcome {
        let outcome = match result {
            Ok(step) => Outcome {
                ok: flow.inline_message().is_none(),
                message: flow.inline_message().map(str::to_string),
                ..Outcome::default()
            }
            .with_step(step),
            Err(e) => Outcome::failure(e, flow.inline_message()).with_step(flow.step()),
        };
        self.signup.give_back(flow);
        outcome
    }

    #[wasm_bindgen]
    pub async fn request_otp(&self, email: String, password: String) -> Result<Outcome, JsValue> {
        let mut flow = match self.signup.checkout("signup") {
            Ok(flow) => flow,
            Err(e) => return Ok(Outcome::failure(e, None)),
        };
        let result = flow.request_otp(&self.client, &email, &password).await;
        Ok(self.settle_signup(flow, result))
    }

    #[wasm_bindgen]
    pub async fn resend_otp(&self) -> Result<Outcome, JsValue> {
        let mut flow = match self.signup.checkout("signup") {
            Ok(flow) => flow,
            Err(e) => return Ok(Outcome::failure(e, None)),
        };
        let result = flow.resend_otp(&self.client).await;
        Ok(self.settle_signup(flow, result))
    }

    #[wasm_bindgen]
    pub async fn verify_otp(&self, otp: String) -> Result<Outcome, JsValue> {
        let mut flow = match self.signup.checkout("signup") {
            Ok(flow) => flow,
            Err(e) => return Ok(Outcome::failure(e, None)),
        };
        let result = flow.verify_otp(&self.client, &otp).await;
        Ok(self.settle_signup(flow, result))
    }

    #[wasm_bindgen]
    pub async fn complete_signup(&self, name: String, phone: String) -> Result<Outcome, JsValue> {
        let mut flow = match self.signup.checkout("signup") {
            Ok(flow) => flow,
            Err(e) => return Ok(Outcome::failure(e, None)),
        };
        let result = flow.complete(&self.client, &SignupProfile { name, phone }).await;
        Ok(self.settle_signup(flow, result))
    }

    // ----- Document forms -----

    /// `[{ slug, title, path }]`
    #[wasm_bindgen]
    pub fn document_kinds(&self) -> Result<JsValue, JsValue> {
        let kinds: Vec<KindView> = DocumentKind::ALL
            .iter()
            .map(|k| KindView {
                slug: k.slug(),
                title: k.title(),
                path: k.route_path(),
            })
            .collect();
        to_js(&kinds)
    }

    /// Start a blank form and return its schema
    #[wasm_bindgen]
    pub fn open_form(&self, slug: &str) -> Result<JsValue, JsValue> {
        if !self.authenticated() {
            return Err(JsValue::from_str("Please log in first"));
        }
        let kind = DocumentKind::from_slug(slug)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown document kind: {}", slug)))?;

        if let Some(previous) = self.cancellers.borrow().get("form") {
            previous.cancel();
        }
        let session = FormSession::new(kind);
        let schema = to_js(session.schema())?;
        self.track("form", session.canceller());
        self.form.put(session);
        Ok(schema)
    }

    #[wasm_bindgen]
    pub fn set_field(&self, name: &str, value: &str) -> Result<(), JsValue> {
        self.form
            .with("form", |session| session.set(name, value))
            .map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn form_values(&self) -> Result<JsValue, JsValue> {
        self.form
            .with("form", |session| to_js(session.record()))
            .map_err(js_error)?
    }

    /// Submit, then open the preview with the generated document
    #[wasm_bindgen]
    pub async fn submit_form(&self) -> Result<Outcome, JsValue> {
        let mut session = match self.form.checkout("form") {
            Ok(session) => session,
            Err(e) => return Ok(Outcome::failure(e, None)),
        };

        let kind = session.kind();
        let outcome = match session.submit(&self.client).await {
            Ok(_) => {
                let model = session.take_model();
                match model.map(|m| self.preview.borrow_mut().open(m, kind)) {
                    Some(Ok(())) => Outcome::success(),
                    Some(Err(e)) => {
                        web_sys::console::error_1(&format!("Preview failed: {}", e).into());
                        Outcome::failure(e, Some(portal_core::forms::SUBMIT_FAILED_MESSAGE))
                    }
                    None => Outcome::success(),
                }
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Submit failed: {}", e).into());
                Outcome::failure(e, session.inline_message())
            }
        };
        self.form.give_back(session);
        Ok(outcome)
    }

    // ----- Preview -----

    /// Bytes for the inline viewer
    #[wasm_bindgen]
    pub fn preview_pdf(&self) -> Option<Uint8Array> {
        self.preview
            .borrow()
            .pdf()
            .map(|pdf| Uint8Array::from(pdf.bytes.as_slice()))
    }

    #[wasm_bindgen(getter)]
    pub fn preview_page_count(&self) -> usize {
        self.preview.borrow().pdf().map(|pdf| pdf.page_count).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn download_pdf(&self) -> Result<(), JsValue> {
        let artifact = self.preview.borrow().export_pdf().map_err(js_error)?;
        trigger_download(&artifact)
    }

    #[wasm_bindgen]
    pub fn download_docx(&self) -> Result<(), JsValue> {
        let artifact = self.preview.borrow().export_docx().map_err(js_error)?;
        trigger_download(&artifact)
    }

    #[wasm_bindgen]
    pub fn close_preview(&self) {
        self.preview.borrow_mut().close();
    }

    // ----- Chat -----

    /// Send one prompt and return the whole transcript
    #[wasm_bindgen]
    pub async fn send_chat(&self, prompt: String) -> Result<JsValue, JsValue> {
        if !self.authenticated() {
            return Err(JsValue::from_str("Please log in first"));
        }
        if self.chat.is_empty() {
            let chat = ChatSession::open(&self.store).map_err(js_error)?;
            self.track("chat", chat.canceller());
            self.chat.put(chat);
        }

        let mut chat = self.chat.checkout("chat").map_err(js_error)?;
        if let Err(e) = chat.send(&self.client, &prompt).await {
            web_sys::console::warn_1(&format!("Chat failed: {}", e).into());
        }
        let transcript = to_js(&chat.transcript());
        self.chat.give_back(chat);
        transcript
    }

    #[wasm_bindgen]
    pub fn chat_transcript(&self) -> Result<JsValue, JsValue> {
        match self.chat.with("chat", |chat| to_js(&chat.transcript())) {
            Ok(transcript) => transcript,
            Err(_) => to_js(&Vec::<()>::new()),
        }
    }

    // ----- Teardown -----

    /// Abort one component's request: "login", "signup", "form" or "chat"
    #[wasm_bindgen]
    pub fn cancel(&self, component: &str) -> bool {
        self.cancellers
            .borrow()
            .get(component)
            .map(Canceller::cancel)
            .unwrap_or(false)
    }

    /// Abort every in-flight request, e.g. on navigation away
    #[wasm_bindgen]
    pub fn teardown(&self) {
        for canceller in self.cancellers.borrow().values() {
            canceller.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lends_once() {
        let slot = Slot::empty();
        assert!(matches!(slot.checkout("form"), Err(PortalError::OutOfStep("form"))));
        assert!(slot.is_empty());

        slot.put(1);
        let value = slot.checkout("form").unwrap();
        assert!(matches!(slot.checkout("form"), Err(PortalError::Busy)));
        assert!(matches!(slot.with("form", |v| *v), Err(PortalError::Busy)));

        slot.give_back(value + 1);
        assert_eq!(slot.with("form", |v| *v).unwrap(), 2);
    }

    #[test]
    fn test_slot_cleared_while_lent() {
        let slot = Slot::empty();
        slot.put("session");
        let value = slot.checkout("form").unwrap();
        slot.clear();
        slot.give_back(value);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_outcome_from_errors() {
        let busy = Outcome::failure(PortalError::Busy, Some("ignored"));
        assert_eq!(busy.message.as_deref(), Some(BUSY_MESSAGE));

        let invalid = Outcome::failure(
            PortalError::Validation(vec![FieldError {
                field: "email".to_string(),
                message: "Email is required".to_string(),
            }]),
            None,
        );
        assert!(!invalid.ok);
        assert_eq!(invalid.message, None);
        assert_eq!(invalid.field_errors.len(), 1);

        let step = Outcome::success().with_step(SignupStep::OtpEntry);
        assert_eq!(step.step.as_deref(), Some("otp"));
    }
}
