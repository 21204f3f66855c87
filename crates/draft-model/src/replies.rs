//! Tagged decoders for the account and chat webhooks
//!
//! The services answer with human-readable `output` strings. Those strings
//! are matched here exactly once; callers only ever match on enums.

use serde_json::{Map, Value};

pub const LOGIN_SUCCESS: &str = "Login successful";
pub const OTP_SENT: &str = "OTP sent successfully";

const INVALID_CREDENTIAL_MARKERS: &[&str] = &["invalid", "incorrect", "wrong", "not found"];
/// Signup markers are whole words: "unsuccessful" must not read as "success"
const ALREADY_REGISTERED_WORDS: &[&str] = &["already", "exists", "exist", "duplicate"];
const SIGNUP_FAILURE_WORDS: &[&str] = &[
    "not",
    "no",
    "unsuccessful",
    "unable",
    "cannot",
    "couldn",
    "fail",
    "failed",
    "failure",
    "error",
    "invalid",
];
const SIGNUP_SUCCESS_WORDS: &[&str] = &["success", "successful", "successfully", "created"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    /// `token` is absent when the service does not issue one
    Success { token: Option<String> },
    InvalidCredentials,
    Unrecognized(String),
}

impl LoginReply {
    pub fn decode(reply: &Value) -> Self {
        let obj = first_object(reply);
        let output = output_text(reply);

        match output.as_deref() {
            Some(LOGIN_SUCCESS) => LoginReply::Success {
                token: obj.and_then(|o| text_field(o, &["token", "accessToken", "access_token"])),
            },
            Some(text) if contains_any(text, INVALID_CREDENTIAL_MARKERS) => {
                LoginReply::InvalidCredentials
            }
            Some(text) => LoginReply::Unrecognized(text.to_string()),
            None => LoginReply::Unrecognized(String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpSendReply {
    Sent,
    Failed(String),
}

impl OtpSendReply {
    pub fn decode(reply: &Value) -> Self {
        match output_text(reply) {
            Some(text) if text == OTP_SENT => OtpSendReply::Sent,
            Some(text) => OtpSendReply::Failed(text),
            None => OtpSendReply::Failed(String::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerifyReply {
    Verified,
    Rejected,
}

impl OtpVerifyReply {
    /// Only a literal `true` (boolean or string) verifies
    pub fn decode(reply: &Value) -> Self {
        let output = first_object(reply).and_then(|o| o.get("output"));
        match output {
            Some(Value::Bool(true)) => OtpVerifyReply::Verified,
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => {
                OtpVerifyReply::Verified
            }
            _ => OtpVerifyReply::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupReply {
    Created,
    AlreadyRegistered,
    Failed(String),
}

impl SignupReply {
    /// Already-registered wins over failure wording, failure over success
    pub fn decode(reply: &Value) -> Self {
        match output_text(reply) {
            Some(text) if has_word(&text, ALREADY_REGISTERED_WORDS) => {
                SignupReply::AlreadyRegistered
            }
            Some(text) if has_word(&text, SIGNUP_FAILURE_WORDS) => SignupReply::Failed(text),
            Some(text) if has_word(&text, SIGNUP_SUCCESS_WORDS) => SignupReply::Created,
            Some(text) => SignupReply::Failed(text),
            None => {
                if let Some(Value::Bool(true)) = first_object(reply).and_then(|o| o.get("output")) {
                    SignupReply::Created
                } else {
                    SignupReply::Failed(String::new())
                }
            }
        }
    }
}

/// Assistant message text pulled out of whatever shape the chat hook returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}

impl ChatReply {
    const TEXT_KEYS: [&'static str; 5] = ["output", "response", "message", "text", "answer"];

    /// `None` when the reply carries no usable text
    pub fn decode(reply: &Value) -> Option<Self> {
        let text = match reply {
            Value::String(s) => non_blank(s),
            Value::Array(items) => return items.first().and_then(Self::decode),
            Value::Object(obj) => text_field(obj, &Self::TEXT_KEYS),
            _ => None,
        }?;
        Some(ChatReply { text })
    }
}

fn first_object(reply: &Value) -> Option<&Map<String, Value>> {
    match reply {
        Value::Object(obj) => Some(obj),
        Value::Array(items) => items.first().and_then(Value::as_object),
        _ => None,
    }
}

fn output_text(reply: &Value) -> Option<String> {
    match reply {
        Value::String(s) => non_blank(s),
        _ => first_object(reply).and_then(|o| text_field(o, &["output", "message"])),
    }
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str).and_then(non_blank))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn has_word(text: &str, words: &[&str]) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| words.contains(&w))
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_success_with_token() {
        let reply = json!({ "output": "Login successful", "token": "tok123" });
        assert_eq!(
            LoginReply::decode(&reply),
            LoginReply::Success {
                token: Some("tok123".to_string())
            }
        );
    }

    #[test]
    fn test_login_success_in_array_without_token() {
        let reply = json!([{ "output": "Login successful" }]);
        assert_eq!(
            LoginReply::decode(&reply),
            LoginReply::Success { token: None }
        );
    }

    #[test]
    fn test_login_failures() {
        assert_eq!(
            LoginReply::decode(&json!({ "output": "Invalid email or password" })),
            LoginReply::InvalidCredentials
        );
        assert_eq!(
            LoginReply::decode(&json!({ "output": "Service paused" })),
            LoginReply::Unrecognized("Service paused".to_string())
        );
        assert_eq!(
            LoginReply::decode(&json!(42)),
            LoginReply::Unrecognized(String::new())
        );
    }

    #[test]
    fn test_otp_send() {
        assert_eq!(
            OtpSendReply::decode(&json!({ "output": "OTP sent successfully" })),
            OtpSendReply::Sent
        );
        assert_eq!(
            OtpSendReply::decode(&json!({ "output": "Email already registered" })),
            OtpSendReply::Failed("Email already registered".to_string())
        );
    }

    #[test]
    fn test_otp_verify_only_true_verifies() {
        assert_eq!(
            OtpVerifyReply::decode(&json!({ "output": true })),
            OtpVerifyReply::Verified
        );
        assert_eq!(
            OtpVerifyReply::decode(&json!([{ "output": "true" }])),
            OtpVerifyReply::Verified
        );
        for other in [json!({ "output": false }), json!({ "output": "yes" }), json!({})] {
            assert_eq!(OtpVerifyReply::decode(&other), OtpVerifyReply::Rejected);
        }
    }

    #[test]
    fn test_signup_outcomes() {
        assert_eq!(
            SignupReply::decode(&json!({ "output": "User registered successfully" })),
            SignupReply::Created
        );
        assert_eq!(
            SignupReply::decode(&json!({ "output": "User already exists" })),
            SignupReply::AlreadyRegistered
        );
        assert_eq!(
            SignupReply::decode(&json!({ "output": "Database unavailable" })),
            SignupReply::Failed("Database unavailable".to_string())
        );
        assert_eq!(
            SignupReply::decode(&json!({ "output": "Account created" })),
            SignupReply::Created
        );
    }

    #[test]
    fn test_signup_failure_wording_is_not_success() {
        for text in [
            "Signup unsuccessful",
            "User could not be created",
            "Account not created",
            "Signup failed, please try later",
        ] {
            assert_eq!(
                SignupReply::decode(&json!({ "output": text })),
                SignupReply::Failed(text.to_string()),
                "{}",
                text
            );
        }
        assert_eq!(
            SignupReply::decode(&json!({ "output": "Signup failed: email already exists" })),
            SignupReply::AlreadyRegistered
        );
    }

    #[test]
    fn test_chat_reply_shapes() {
        let text = |v: Value| ChatReply::decode(&v).map(|r| r.text);

        assert_eq!(text(json!({ "output": "Hello" })), Some("Hello".into()));
        assert_eq!(text(json!([{ "response": "Hi" }])), Some("Hi".into()));
        assert_eq!(text(json!("plain")), Some("plain".into()));
        assert_eq!(
            text(json!({ "answer": "late", "message": "early" })),
            Some("early".into())
        );
        assert_eq!(text(json!({ "output": "  " })), None);
        assert_eq!(text(json!([])), None);
    }
}
