//! Interactive line-oriented session.
//!
//! Reads one line at a time, routes it through [`CommandRouter`] and renders
//! whatever the orchestrator returns. Ends on `/quit` or end of input.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::app::{Orchestrator, SessionStatus};
use crate::commands::{Command, CommandOutput, CommandRouter};
use crate::error::{QuillError, Result};
use crate::render::TerminalRenderer;

const PROMPT: &str = "sqlquill> ";

/// Runs the session until the user quits or input ends.
pub async fn run<R, W>(
    orchestrator: &mut Orchestrator,
    input: R,
    renderer: &mut TerminalRenderer<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        renderer
            .prompt(PROMPT)
            .map_err(|e| QuillError::internal(format!("Failed to write prompt: {e}")))?;

        let line = lines
            .next_line()
            .await
            .map_err(|e| QuillError::internal(format!("Failed to read input: {e}")))?;

        let Some(line) = line else {
            debug!("End of input");
            orchestrator.close().await;
            return Ok(());
        };

        let command = CommandRouter::parse(&line);
        let quit = command == Command::Quit;

        let mut outputs = orchestrator.dispatch(command).await;
        if orchestrator.state().status == SessionStatus::SqlReady
            && !outputs.iter().any(CommandOutput::is_error)
            && orchestrator
                .state()
                .parsed
                .as_ref()
                .is_some_and(|parsed| !parsed.is_sentinel())
        {
            outputs.push(CommandOutput::info("Type /run to execute."));
        }

        renderer
            .render_all(&outputs)
            .map_err(|e| QuillError::internal(format!("Failed to write output: {e}")))?;

        if quit {
            return Ok(());
        }
    }
}
