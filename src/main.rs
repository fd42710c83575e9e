//! sqlquill - ask questions about your database in plain language.

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Context};
use sqlquill::app::{Orchestrator, SessionStatus};
use sqlquill::cli::Cli;
use sqlquill::commands::{Command, CommandOutput};
use sqlquill::config::{redact_password, Config};
use sqlquill::llm::create_client;
use sqlquill::logging;
use sqlquill::render::TerminalRenderer;
use sqlquill::repl;
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.is_one_shot() {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let env = |key: &str| std::env::var(key).ok();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let llm_config = cli.resolve_llm_config(&config.llm, env)?;
    info!(
        "Using LLM provider {} (model {})",
        llm_config.provider, llm_config.model
    );
    let llm = create_client(&llm_config).context("Failed to create LLM client")?;
    let mut orchestrator = Orchestrator::with_drivers(llm);

    let descriptor =
        config.resolve_connection(cli.connection_string.as_deref(), cli.connection_name(), env)?;
    if let Some(descriptor) = &descriptor {
        info!("Connection: {}", redact_password(descriptor));
    }

    let mut renderer = TerminalRenderer::new(io::stdout());

    match cli.question.as_deref() {
        Some(question) => {
            let result = one_shot(
                &mut orchestrator,
                &mut renderer,
                descriptor,
                question,
                cli.execute,
            )
            .await;
            orchestrator.close().await;
            result
        }
        None => interactive(&mut orchestrator, &mut renderer, descriptor).await,
    }
}

async fn interactive(
    orchestrator: &mut Orchestrator,
    renderer: &mut TerminalRenderer<io::Stdout>,
    descriptor: Option<String>,
) -> anyhow::Result<()> {
    renderer.render(&CommandOutput::info(format!(
        "sqlquill {}. Type /help for commands.",
        env!("CARGO_PKG_VERSION")
    )))?;

    if let Some(descriptor) = descriptor {
        let outputs = orchestrator.dispatch(Command::Connect(descriptor)).await;
        renderer.render_all(&outputs)?;
    }

    repl::run(orchestrator, BufReader::new(tokio::io::stdin()), renderer).await?;
    Ok(())
}

async fn one_shot(
    orchestrator: &mut Orchestrator,
    renderer: &mut TerminalRenderer<io::Stdout>,
    descriptor: Option<String>,
    question: &str,
    execute: bool,
) -> anyhow::Result<()> {
    let Some(descriptor) = descriptor else {
        bail!("No database connection configured. Pass a connection string or use -c NAME.");
    };

    let outputs = orchestrator.dispatch(Command::Connect(descriptor)).await;
    renderer.render_all(&outputs)?;
    if !orchestrator.state().is_connected() {
        bail!("{}", orchestrator.state().connection_status);
    }

    let outputs = orchestrator
        .dispatch(Command::SubmitQuestion(question.to_string()))
        .await;
    renderer.render_all(&outputs)?;
    if orchestrator.state().status != SessionStatus::SqlReady {
        bail!("No SQL was generated");
    }

    if execute {
        let outputs = orchestrator.dispatch(Command::Execute).await;
        renderer.render_all(&outputs)?;
        match &orchestrator.state().status {
            SessionStatus::ResultsReady => {}
            SessionStatus::ExecutionFailed(reason) => bail!("{reason}"),
            _ => bail!("The generated SQL was not executed"),
        }
    }

    Ok(())
}
