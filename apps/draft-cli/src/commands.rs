//! Subcommand implementations

use std::convert::Infallible;
use std::future::Future;
use std::io::Write as _;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context as _};
use draft_model::{relief_label, DocumentKind, DocumentModel, FieldError, LoginReply, Relief};
use draft_pdf::PdfVerifier;
use portal_core::account::NETWORK_MESSAGE;
use portal_core::forms::SUBMIT_FAILED_MESSAGE;
use portal_core::storage::FileStore;
use portal_core::transport::ReqwestTransport;
use portal_core::{
    navigate, AuthContext, Canceller, ChatSession, Endpoint, FormSession, KeyValueStore,
    LoginForm, Navigation, PortalConfig, PortalError, PreviewModal, Route, SignupFlow,
    SignupProfile, SignupStep, WebhookClient,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::output::{format_fields, read_json, record_from_json, write_artifact};
use crate::{Args, Command, Format};

const DEFAULT_CONFIG: &str = "lexdraft.toml";

pub(crate) async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Kinds => {
            print!("{}", format_kinds(&config));
            Ok(())
        }
        Command::Fields { kind } => {
            let kind = parse_kind(&kind)?;
            print!("{}", format_fields(&draft_model::FormSchema::for_kind(kind)));
            Ok(())
        }
        Command::Render {
            kind,
            model,
            out,
            format,
            verify,
        } => render(&config, &kind, &model, &out, format, verify).await,
        Command::Submit {
            kind,
            values,
            set,
            out,
            format,
            save_model,
        } => {
            let request = SubmitRequest {
                kind: parse_kind(&kind)?,
                values: values.as_deref(),
                set,
                save_model: save_model.as_deref(),
            };
            let mut ctx = Context::open(config, &args.store)?;
            ctx.submit(request, &out, format).await
        }
        Command::Login { email, password } => {
            let mut ctx = Context::open(config, &args.store)?;
            ctx.login(&email, &password).await
        }
        Command::Logout => {
            let mut ctx = Context::open(config, &args.store)?;
            ctx.auth.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Signup { email, password } => {
            let ctx = Context::open(config, &args.store)?;
            ctx.signup(&email, &password).await
        }
        Command::Chat { prompt } => {
            let ctx = Context::open(config, &args.store)?;
            ctx.chat(prompt.as_deref()).await
        }
        Command::Status => Context::open(config, &args.store)?.status(),
    }
}

/// Explicit path must exist; the default is optional
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PortalConfig> {
    let config = match path {
        Some(path) => PortalConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => PortalConfig::from_file(DEFAULT_CONFIG)?,
        None => PortalConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

pub fn parse_kind(slug: &str) -> anyhow::Result<DocumentKind> {
    DocumentKind::from_slug(slug).ok_or_else(|| {
        anyhow!(
            "Unknown document kind '{}'; run `lexdraft kinds` for the list",
            slug
        )
    })
}

pub fn format_kinds(config: &PortalConfig) -> String {
    DocumentKind::ALL
        .iter()
        .map(|kind| {
            let url = config
                .url_for(&Endpoint::Document(*kind))
                .unwrap_or_else(|_| "-".to_string());
            format!("{:<32} {:<36} {}\n", kind.slug(), kind.title(), url)
        })
        .collect()
}

/// Run `future`, cancelling it through `canceller` on Ctrl-C
async fn interruptible<F: Future>(canceller: Canceller, future: F) -> F::Output {
    let watch = async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            canceller.cancel();
        }
        futures::future::pending::<Infallible>().await
    };

    tokio::select! {
        output = future => output,
        never = watch => match never {},
    }
}

fn report_field_errors(errors: &[FieldError]) -> anyhow::Error {
    for error in errors {
        eprintln!("  {}: {}", error.field, error.message);
    }
    anyhow!("{} field(s) need attention", errors.len())
}

/// Check numbering of grounds and prayer items in the rendered PDF
pub fn verify_pdf(model: &DocumentModel, pdf: &[u8]) -> anyhow::Result<()> {
    let verifier = PdfVerifier::from_pdf(pdf)?;
    verifier.check_numbered(&model.body.paragraphs)?;

    if let Some(prayer) = &model.prayer {
        if let Relief::Items(items) = &prayer.relief {
            let markers: Vec<String> = (0..items.len()).map(relief_label).collect();
            verifier.check_sequence(&markers, items)?;
        }
    }
    info!(
        paragraphs = model.body.paragraphs.len(),
        "PDF numbering verified"
    );
    Ok(())
}

fn save(preview: &PreviewModal, out: &Path, format: Format) -> anyhow::Result<()> {
    if format.pdf() {
        let path = write_artifact(out, &preview.export_pdf()?)?;
        println!("{}", path.display());
    }
    if format.docx() {
        let path = write_artifact(out, &preview.export_docx()?)?;
        println!("{}", path.display());
    }
    Ok(())
}

pub(crate) async fn render(
    config: &PortalConfig,
    kind: &str,
    model_path: &Path,
    out: &Path,
    format: Format,
    verify: bool,
) -> anyhow::Result<()> {
    let kind = parse_kind(kind)?;
    let reply = read_json(model_path)?;
    let model = DocumentModel::from_reply(reply)
        .with_context(|| format!("{} is not a document model", model_path.display()))?;

    let mut preview = PreviewModal::new(config.render.clone());
    preview
        .open_with_timeout(model, kind, config.http.timeout_ms)
        .await
        .context("Failed to render the PDF")?;

    if verify {
        if let (Some(model), Some(pdf)) = (preview.model(), preview.pdf()) {
            verify_pdf(model, &pdf.bytes)?;
        }
    }
    save(&preview, out, format)
}

pub struct SubmitRequest<'a> {
    pub kind: DocumentKind,
    pub values: Option<&'a Path>,
    pub set: Vec<(String, String)>,
    pub save_model: Option<&'a Path>,
}

struct Context {
    client: WebhookClient,
    store: Rc<dyn KeyValueStore>,
    auth: AuthContext,
}

impl Context {
    fn open(config: PortalConfig, store_path: &Path) -> anyhow::Result<Self> {
        let store: Rc<dyn KeyValueStore> = Rc::new(
            FileStore::open(store_path).with_context(|| {
                format!("Failed to open session store {}", store_path.display())
            })?,
        );
        let auth = AuthContext::restore(store.clone())?;
        let transport = Rc::new(ReqwestTransport::new(config.http.timeout_ms)?);

        Ok(Self {
            client: WebhookClient::new(config, transport),
            store,
            auth,
        })
    }

    /// Apply the same guard the browser routes use
    fn require(&self, route: Route) -> anyhow::Result<()> {
        match navigate(&route.path(), &self.auth) {
            Navigation::Render(_) => Ok(()),
            Navigation::Redirect(_) => bail!("Not logged in; run `lexdraft login` first"),
            Navigation::NotFound => bail!("No such page: {}", route.path()),
        }
    }

    async fn submit(
        &mut self,
        request: SubmitRequest<'_>,
        out: &Path,
        format: Format,
    ) -> anyhow::Result<()> {
        self.require(Route::Document(request.kind))?;

        let mut session = FormSession::new(request.kind);
        if let Some(path) = request.values {
            let record = record_from_json(&read_json(path)?)?;
            for (name, value) in record.iter() {
                session.set(name, value);
            }
        }
        for (name, value) in request.set {
            session.set(&name, value);
        }

        let result = interruptible(session.canceller(), session.submit(&self.client))
            .await
            .map(DocumentModel::clone);

        let model = match result {
            Ok(model) => model,
            Err(PortalError::Validation(errors)) => return Err(report_field_errors(&errors)),
            Err(e) => {
                let message = session.inline_message().unwrap_or(SUBMIT_FAILED_MESSAGE);
                return Err(anyhow::Error::new(e).context(message.to_string()));
            }
        };

        if let Some(path) = request.save_model {
            let json = serde_json::to_string_pretty(&model)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        let render = &self.client.config().render;
        let timeout_ms = self.client.config().http.timeout_ms;
        let mut preview = PreviewModal::new(render.clone());
        preview
            .open_with_timeout(model, request.kind, timeout_ms)
            .await
            .context("Failed to render the PDF")?;
        save(&preview, out, format)
    }

    async fn login(&mut self, email: &str, password: &str) -> anyhow::Result<()> {
        let mut form = LoginForm::new();
        let result = interruptible(
            form.canceller(),
            form.submit(&self.client, &mut self.auth, email, password),
        )
        .await;

        match result {
            Ok(LoginReply::Success { .. }) => {
                println!("Logged in as {}", email.trim());
                Ok(())
            }
            Ok(_) => bail!(
                "{}",
                form.inline_message().unwrap_or("Login failed. Please try again.")
            ),
            Err(PortalError::Validation(errors)) => Err(report_field_errors(&errors)),
            Err(e) => Err(anyhow::Error::new(e)
                .context(form.inline_message().unwrap_or(NETWORK_MESSAGE).to_string())),
        }
    }

    async fn signup(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let mut flow = SignupFlow::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let step = flow
            .request_otp(&self.client, email, password)
            .await
            .map_err(|e| signup_error(&flow, e))?;
        if step != SignupStep::OtpEntry {
            bail!("{}", flow.inline_message().unwrap_or("Could not send the OTP"));
        }
        eprintln!("An OTP was sent to {}", flow.email());

        loop {
            let otp = prompt(&mut lines, "OTP (or 'resend')").await?;
            let step = if otp.eq_ignore_ascii_case("resend") {
                flow.resend_otp(&self.client).await
            } else {
                flow.verify_otp(&self.client, &otp).await
            }
            .map_err(|e| signup_error(&flow, e))?;

            if step == SignupStep::Profile {
                break;
            }
            if let Some(message) = flow.inline_message() {
                eprintln!("{}", message);
            }
        }

        let name = prompt(&mut lines, "Full name").await?;
        let phone = prompt(&mut lines, "Mobile number (optional)").await?;
        let step = flow
            .complete(&self.client, &SignupProfile { name, phone })
            .await
            .map_err(|e| signup_error(&flow, e))?;

        if step != SignupStep::Complete {
            bail!("{}", flow.inline_message().unwrap_or("Signup failed"));
        }
        println!("Account created; run `lexdraft login` to sign in");
        Ok(())
    }

    async fn chat(&self, prompt_text: Option<&str>) -> anyhow::Result<()> {
        self.require(Route::Chat)?;
        let mut chat = ChatSession::open(&self.store)?;

        if let Some(text) = prompt_text {
            return ask(&mut chat, &self.client, text).await;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let text = match prompt(&mut lines, ">").await {
                Ok(text) => text,
                // End of input ends the conversation
                Err(_) => return Ok(()),
            };
            if text == "exit" || text == "quit" {
                return Ok(());
            }
            ask(&mut chat, &self.client, &text).await?;
        }
    }

    fn status(&self) -> anyhow::Result<()> {
        if self.auth.is_authenticated() {
            let email = self.auth.user_email()?.unwrap_or_else(|| "unknown".to_string());
            println!("Logged in as {}", email);
        } else {
            println!("Not logged in");
        }
        Ok(())
    }
}

fn signup_error(flow: &SignupFlow, err: PortalError) -> anyhow::Error {
    match err {
        PortalError::Validation(errors) => report_field_errors(&errors),
        other => {
            let message = flow.inline_message().unwrap_or(NETWORK_MESSAGE).to_string();
            anyhow::Error::new(other).context(message)
        }
    }
}

async fn ask(chat: &mut ChatSession, client: &WebhookClient, text: &str) -> anyhow::Result<()> {
    let canceller = chat.canceller();
    if let Some(message) = interruptible(canceller, chat.send(client, text)).await? {
        println!("{}", message.text);
    }
    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<String> {
    eprint!("{} ", label);
    std::io::stderr().flush()?;
    let line = lines
        .next_line()
        .await?
        .context("Input closed")?;
    Ok(line.trim().to_string())
}
