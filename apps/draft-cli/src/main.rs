//! LexDraft command line
//!
//! Drives the same portal core as the browser front end: log in, fill a
//! document form, let the drafting webhook generate the document, and
//! save it as PDF and Word. Saved webhook replies can also be rendered
//! offline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;
#[cfg(test)]
mod tests;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "lexdraft", version)]
#[command(about = "Generate court documents through the LexDraft webhooks")]
struct Args {
    /// Portal config file (TOML); `lexdraft.toml` is used when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where the login token and session ids are kept between runs
    #[arg(long, default_value = ".lexdraft/session.json")]
    store: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Docx,
    Both,
}

impl Format {
    fn pdf(&self) -> bool {
        matches!(self, Format::Pdf | Format::Both)
    }

    fn docx(&self) -> bool {
        matches!(self, Format::Docx | Format::Both)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported document kinds
    Kinds,

    /// Show the form fields of one document kind
    Fields {
        /// Document kind slug, e.g. bail-application
        kind: String,
    },

    /// Render a saved webhook reply without contacting any service
    Render {
        /// Document kind slug
        #[arg(short, long)]
        kind: String,

        /// JSON file holding the webhook reply
        model: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Both)]
        format: Format,

        /// Read the PDF back and check paragraph numbering
        #[arg(long)]
        verify: bool,
    },

    /// Fill a form, submit it and save the generated document
    Submit {
        /// Document kind slug
        #[arg(short, long)]
        kind: String,

        /// JSON object of field values
        #[arg(long)]
        values: Option<PathBuf>,

        /// A single field value, `name=value`; repeatable, wins over --values
        #[arg(long = "set", value_parser = output::parse_assignment)]
        set: Vec<(String, String)>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Both)]
        format: Format,

        /// Also save the normalised document model as JSON
        #[arg(long)]
        save_model: Option<PathBuf>,
    },

    /// Log in and keep the token for later commands
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Forget the token and session ids
    Logout,

    /// Create an account; the OTP and profile are read from stdin
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Ask the drafting assistant; without a prompt, start a conversation
    Chat { prompt: Option<String> },

    /// Show who is logged in
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    commands::run(args).await
}
