//! End-to-end component flows against a recording transport

mod common;

use std::rc::Rc;

use common::{client, BASE_URL};
use draft_model::{DocumentKind, FormSchema, LoginReply, OtpVerifyReply};
use portal_core::account::{
    INVALID_CREDENTIALS_MESSAGE, INVALID_OTP_MESSAGE, SIGNUP_FAILED_MESSAGE,
};
use portal_core::chat::CHAT_ERROR_MESSAGE;
use portal_core::forms::SUBMIT_FAILED_MESSAGE;
use portal_core::storage::{SESSION_ID_KEY, TOKEN_KEY, USER_EMAIL_KEY};
use portal_core::{
    navigate, AuthContext, ChatSession, FormSession, KeyValueStore, LoginForm, MemoryStore,
    Navigation, PortalError, PreviewModal, Route, SignupFlow, SignupProfile, SignupStep,
    SubmitState, TransportError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn fill_required(session: &mut FormSession) {
    let required: Vec<String> = session
        .schema()
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.clone())
        .collect();
    for name in required {
        session.set(&name, "Filled in");
    }
}

fn bail_reply() -> serde_json::Value {
    json!([{
        "courtDetails": { "courtName": "Sessions Judge", "district": "Pune", "year": 2024 },
        "parties": {
            "applicant": { "name": "Ramesh Kumar", "fatherName": "Suresh Kumar", "age": 34 },
            "state": { "name": "State of Maharashtra" }
        },
        "applicationTitle": "APPLICATION FOR REGULAR BAIL",
        "applicationBody": { "grounds": ["A", "B", "C"] },
        "footer": { "place": "Pune", "advocateName": "Adv. Meera Joshi" }
    }])
}

#[tokio::test]
async fn test_valid_form_posts_once_with_schema_keys() {
    let (client, transport) = client();
    transport.reply(bail_reply());

    let mut session = FormSession::new(DocumentKind::BailApplication);
    fill_required(&mut session);
    session.set("notAField", "dropped");

    let model = session.submit(&client).await.unwrap();
    assert_eq!(model.body.paragraphs, vec!["A", "B", "C"]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);

    let (url, body) = &requests[0];
    assert_eq!(url, &format!("{}/bail-application", BASE_URL));

    let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    let schema = FormSchema::for_kind(DocumentKind::BailApplication);
    let mut expected = schema.field_names();
    keys.sort();
    expected.sort();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let (client, transport) = client();
    let mut session = FormSession::new(DocumentKind::ChequeBounce);

    let result = session.submit(&client).await;

    assert!(matches!(result, Err(PortalError::Validation(_))));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_timeout_surfaces_inline_message() {
    let (client, transport) = client();
    transport.fail(TransportError::Timeout(60_000));

    let mut session = FormSession::new(DocumentKind::BailApplication);
    fill_required(&mut session);

    let result = session.submit(&client).await;
    assert!(matches!(
        result,
        Err(PortalError::Transport(TransportError::Timeout(60_000)))
    ));
    assert_eq!(
        session.state(),
        &SubmitState::Failed(SUBMIT_FAILED_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn test_submit_then_preview_exports() {
    let (client, transport) = client();
    transport.reply(bail_reply());

    let mut session = FormSession::new(DocumentKind::BailApplication);
    fill_required(&mut session);
    session.submit(&client).await.unwrap();
    let model = session.take_model().unwrap();

    let mut modal = PreviewModal::new(client.config().render.clone());
    modal.open(model, DocumentKind::BailApplication).unwrap();

    let pdf = modal.export_pdf().unwrap();
    let docx = modal.export_docx().unwrap();
    assert_eq!(pdf.filename, "Ramesh_Kumar_Bail_Application.pdf");
    assert_eq!(docx.filename, "Ramesh_Kumar_Bail_Application.docx");
}

#[tokio::test]
async fn test_login_logout_and_guard() {
    let (client, transport) = client();
    transport.reply(json!({ "output": "Login successful", "token": "tok123" }));

    let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
    let mut auth = AuthContext::new(store.clone());
    let mut form = LoginForm::new();

    let reply = form
        .submit(&client, &mut auth, "asha@example.in", "hunter22")
        .await
        .unwrap();

    assert_eq!(
        reply,
        LoginReply::Success {
            token: Some("tok123".to_string())
        }
    );
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));
    assert_eq!(
        store.get(USER_EMAIL_KEY).unwrap().as_deref(),
        Some("asha@example.in")
    );
    assert_eq!(navigate("/chat", &auth), Navigation::Render(Route::Chat));

    auth.logout().unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(navigate("/chat", &auth), Navigation::Redirect(Route::Login));
    assert_eq!(
        navigate("/documents/bail-application", &auth),
        Navigation::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn test_login_without_token_still_logs_in() {
    let (client, transport) = client();
    transport.reply(json!([{ "output": "Login successful" }]));

    let mut auth = AuthContext::new(Rc::new(MemoryStore::new()));
    LoginForm::new()
        .submit(&client, &mut auth, "asha@example.in", "pw")
        .await
        .unwrap();

    assert!(auth.is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_is_inline() {
    let (client, transport) = client();
    transport.reply(json!({ "output": "Invalid password" }));

    let mut auth = AuthContext::new(Rc::new(MemoryStore::new()));
    let mut form = LoginForm::new();
    let reply = form
        .submit(&client, &mut auth, "asha@example.in", "nope")
        .await
        .unwrap();

    assert_eq!(reply, LoginReply::InvalidCredentials);
    assert_eq!(form.inline_message(), Some(INVALID_CREDENTIALS_MESSAGE));
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_otp_signup_scenario() {
    let (client, transport) = client();
    transport
        .reply(json!({ "output": "OTP sent successfully" }))
        .reply(json!({ "output": false }))
        .reply(json!({ "output": true }))
        .reply(json!({ "output": "User registered successfully" }));

    let mut flow = SignupFlow::new();

    let step = flow
        .request_otp(&client, "asha@example.in", "secret")
        .await
        .unwrap();
    assert_eq!(step, SignupStep::OtpEntry);

    let step = flow.verify_otp(&client, "000000").await.unwrap();
    assert_eq!(step, SignupStep::OtpEntry);
    assert_eq!(flow.inline_message(), Some(INVALID_OTP_MESSAGE));

    let step = flow.verify_otp(&client, "123456").await.unwrap();
    assert_eq!(step, SignupStep::Profile);
    assert_eq!(flow.inline_message(), None);

    let profile = SignupProfile {
        name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
    };
    let step = flow.complete(&client, &profile).await.unwrap();
    assert_eq!(step, SignupStep::Complete);

    let requests = transport.requests();
    assert_eq!(requests[0].1, json!({ "step": "send", "email": "asha@example.in" }));
    assert_eq!(
        requests[2].1,
        json!({ "step": "verify", "email": "asha@example.in", "otp": "123456" })
    );
    assert!(requests[..3].iter().all(|(url, _)| url.ends_with("/otp")));
    assert!(requests[3].0.ends_with("/signup"));
    assert_eq!(requests[3].1["phone"], "9876543210");
}

#[tokio::test]
async fn test_signup_failure_reply_stays_on_profile() {
    for output in ["Signup unsuccessful", "User could not be created"] {
        let (client, transport) = client();
        transport
            .reply(json!({ "output": "OTP sent successfully" }))
            .reply(json!({ "output": true }))
            .reply(json!({ "output": output }));

        let mut flow = SignupFlow::new();
        flow.request_otp(&client, "asha@example.in", "secret")
            .await
            .unwrap();
        flow.verify_otp(&client, "123456").await.unwrap();

        let profile = SignupProfile {
            name: "Asha Rao".to_string(),
            phone: String::new(),
        };
        let step = flow.complete(&client, &profile).await.unwrap();
        assert_eq!(step, SignupStep::Profile, "{}", output);
        assert_eq!(flow.inline_message(), Some(SIGNUP_FAILED_MESSAGE));
    }
}

#[tokio::test]
async fn test_otp_reply_other_than_true_rejects() {
    assert_eq!(OtpVerifyReply::decode(&json!({ "output": "yes" })), OtpVerifyReply::Rejected);

    let (client, transport) = client();
    transport
        .reply(json!({ "output": "OTP sent successfully" }))
        .reply(json!({ "output": "maybe" }));

    let mut flow = SignupFlow::new();
    flow.request_otp(&client, "asha@example.in", "secret")
        .await
        .unwrap();
    flow.verify_otp(&client, "1").await.unwrap();

    assert_eq!(flow.step(), SignupStep::OtpEntry);
    assert!(matches!(
        flow.complete(&client, &SignupProfile::default()).await,
        Err(PortalError::OutOfStep(_))
    ));
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (client, transport) = client();
    transport
        .reply(json!({ "response": "Section 438 CrPC covers it." }))
        .fail(TransportError::Network("connection reset".to_string()));

    let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
    let mut chat = ChatSession::open(&store).unwrap();

    let answer = chat
        .send(&client, "What is anticipatory bail?")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(answer.text, "Section 438 CrPC covers it.");

    let failure = chat.send(&client, "And regular bail?").await.unwrap().unwrap();
    assert_eq!(failure.text, CHAT_ERROR_MESSAGE);
    assert_eq!(chat.transcript().len(), 4);

    let requests = transport.requests();
    let session_id = store.get(SESSION_ID_KEY).unwrap().unwrap();
    assert_eq!(requests[0].1["sessionId"], json!(session_id));
    assert_eq!(requests[1].1["prompt"], "And regular bail?");
}
