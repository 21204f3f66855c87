//! Login and the OTP-verified signup flow
//!
//! Credentials are checked by the login webhook; OTPs are issued and
//! verified by the OTP webhook, whose body carries `step: "send"` or
//! `step: "verify"`. Every failure ends up as an inline message.

use draft_model::{
    FieldControl, FieldError, FieldSpec, FormSection, LoginReply, OtpSendReply, OtpVerifyReply,
    SignupReply,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::cancel::Canceller;
use crate::client::{Endpoint, WebhookClient};
use crate::error::PortalError;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";
pub const NETWORK_MESSAGE: &str = "Unable to reach the server. Please try again.";
pub const OTP_NOT_SENT_MESSAGE: &str = "Could not send the OTP. Please try again.";
pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP. Please try again.";
pub const ALREADY_REGISTERED_MESSAGE: &str = "An account with this email already exists.";
pub const SIGNUP_FAILED_MESSAGE: &str = "Could not create the account. Please try again.";

fn email_field() -> FieldSpec {
    FieldSpec::new("email", "Email", FormSection::Account)
        .control(FieldControl::Email)
        .required()
}

fn password_field() -> FieldSpec {
    FieldSpec::new("password", "Password", FormSection::Account).required()
}

fn check_all(checks: &[(FieldSpec, &str)]) -> Result<(), PortalError> {
    let errors: Vec<FieldError> = checks
        .iter()
        .filter_map(|(spec, value)| spec.check(value).err())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PortalError::Validation(errors))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Failed(String),
    LoggedIn,
}

pub struct LoginForm {
    state: LoginState,
    canceller: Canceller,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            state: LoginState::Idle,
            canceller: Canceller::new(),
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn inline_message(&self) -> Option<&str> {
        match &self.state {
            LoginState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Check credentials and, on success, log in through `auth`
    ///
    /// A success reply without a token still logs in; the portal then
    /// mints a random session token, since the token only gates routes.
    pub async fn submit(
        &mut self,
        client: &WebhookClient,
        auth: &mut AuthContext,
        email: &str,
        password: &str,
    ) -> Result<LoginReply, PortalError> {
        let email = email.trim();
        check_all(&[(email_field(), email), (password_field(), password)])?;

        let body = json!({ "email": email, "password": password });
        let reply = match self.canceller.run(client.post(Endpoint::Login, &body)).await {
            Ok(Ok(reply)) => LoginReply::decode(&reply),
            Ok(Err(e)) | Err(e) => {
                self.state = LoginState::Failed(NETWORK_MESSAGE.to_string());
                return Err(e);
            }
        };

        match &reply {
            LoginReply::Success { token } => {
                let token = token
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                auth.remember_email(email)?;
                auth.login(token)?;
                self.state = LoginState::LoggedIn;
            }
            LoginReply::InvalidCredentials => {
                self.state = LoginState::Failed(INVALID_CREDENTIALS_MESSAGE.to_string());
            }
            LoginReply::Unrecognized(text) => {
                warn!(reply = %text, "Unrecognized login reply");
                self.state = LoginState::Failed(LOGIN_FAILED_MESSAGE.to_string());
            }
        }
        Ok(reply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    Credentials,
    OtpEntry,
    Profile,
    Complete,
}

/// Details collected after the email is verified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupProfile {
    pub name: String,
    pub phone: String,
}

pub struct SignupFlow {
    step: SignupStep,
    email: String,
    password: String,
    error: Option<String>,
    canceller: Canceller,
}

impl Default for SignupFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SignupFlow {
    pub fn new() -> Self {
        Self {
            step: SignupStep::Credentials,
            email: String::new(),
            password: String::new(),
            error: None,
            canceller: Canceller::new(),
        }
    }

    pub fn step(&self) -> SignupStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn inline_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    fn expect_step(&self, step: SignupStep, action: &'static str) -> Result<(), PortalError> {
        if self.step == step {
            Ok(())
        } else {
            Err(PortalError::OutOfStep(action))
        }
    }

    async fn post(
        &mut self,
        client: &WebhookClient,
        endpoint: Endpoint,
        body: Value,
    ) -> Result<Value, PortalError> {
        match self.canceller.run(client.post(endpoint, &body)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) | Err(e) => {
                self.error = Some(NETWORK_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Credentials step: remember them and ask for an OTP
    pub async fn request_otp(
        &mut self,
        client: &WebhookClient,
        email: &str,
        password: &str,
    ) -> Result<SignupStep, PortalError> {
        self.expect_step(SignupStep::Credentials, "request_otp")?;
        let email = email.trim();
        check_all(&[(email_field(), email), (password_field(), password)])?;

        self.email = email.to_string();
        self.password = password.to_string();
        self.send_otp(client).await
    }

    pub async fn resend_otp(&mut self, client: &WebhookClient) -> Result<SignupStep, PortalError> {
        self.expect_step(SignupStep::OtpEntry, "resend_otp")?;
        self.send_otp(client).await
    }

    async fn send_otp(&mut self, client: &WebhookClient) -> Result<SignupStep, PortalError> {
        let body = json!({ "step": "send", "email": self.email });
        let reply = self.post(client, Endpoint::Otp, body).await?;

        match OtpSendReply::decode(&reply) {
            OtpSendReply::Sent => {
                info!("OTP sent");
                self.step = SignupStep::OtpEntry;
                self.error = None;
            }
            OtpSendReply::Failed(text) => {
                warn!(reply = %text, "OTP was not sent");
                self.error = Some(OTP_NOT_SENT_MESSAGE.to_string());
            }
        }
        Ok(self.step)
    }

    pub async fn verify_otp(
        &mut self,
        client: &WebhookClient,
        otp: &str,
    ) -> Result<SignupStep, PortalError> {
        self.expect_step(SignupStep::OtpEntry, "verify_otp")?;
        let otp = otp.trim();
        let field = FieldSpec::new("otp", "OTP", FormSection::Account).required();
        check_all(&[(field, otp)])?;

        let body = json!({ "step": "verify", "email": self.email, "otp": otp });
        let reply = self.post(client, Endpoint::Otp, body).await?;

        match OtpVerifyReply::decode(&reply) {
            OtpVerifyReply::Verified => {
                info!("OTP verified");
                self.step = SignupStep::Profile;
                self.error = None;
            }
            OtpVerifyReply::Rejected => {
                self.error = Some(INVALID_OTP_MESSAGE.to_string());
            }
        }
        Ok(self.step)
    }

    /// Profile step: create the account
    pub async fn complete(
        &mut self,
        client: &WebhookClient,
        profile: &SignupProfile,
    ) -> Result<SignupStep, PortalError> {
        self.expect_step(SignupStep::Profile, "complete")?;
        let name = FieldSpec::new("name", "Full name", FormSection::Account).required();
        let phone = FieldSpec::new("phone", "Mobile number", FormSection::Account)
            .control(FieldControl::Phone);
        check_all(&[(name, profile.name.as_str()), (phone, profile.phone.as_str())])?;

        let body = json!({
            "email": self.email,
            "password": self.password,
            "name": profile.name.trim(),
            "phone": profile.phone.trim(),
        });
        let reply = self.post(client, Endpoint::Signup, body).await?;

        match SignupReply::decode(&reply) {
            SignupReply::Created => {
                info!("Account created");
                self.step = SignupStep::Complete;
                self.error = None;
                self.password.clear();
            }
            SignupReply::AlreadyRegistered => {
                self.error = Some(ALREADY_REGISTERED_MESSAGE.to_string());
            }
            SignupReply::Failed(text) => {
                warn!(reply = %text, "Signup failed");
                self.error = Some(SIGNUP_FAILED_MESSAGE.to_string());
            }
        }
        Ok(self.step)
    }
}
