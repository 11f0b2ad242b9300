#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Example server sending HTML notices

use anyhow::Result;
use clap::Parser;
use html_mailer::infrastructure::{
    email::smtp::SmtpConfig,
    http::{
        shutdown_signal,
        state::{AppState, MailConfig},
        HttpServer, HttpServerConfig,
    },
};
use tracing::{error, info};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The SMTP configuration
    #[clap(flatten)]
    pub smtp: SmtpConfig,

    /// The mail configuration
    #[clap(flatten)]
    pub mail: MailConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let dialer = args.smtp.dialer();

    let mut stats = dialer.stats();
    let stats_task = tokio::spawn(async move {
        while let Some(err) = stats.recv().await {
            error!(error = %err, "email error");
        }
    });

    let server = HttpServer::new(&args.server, AppState::new(args.mail, dialer.clone()))?;

    server.run(shutdown_signal()).await?;

    dialer.stop();
    stats_task.await?;

    info!("stopped");

    Ok(())
}
