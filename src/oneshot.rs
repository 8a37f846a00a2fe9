//! Single-pass flow for prompts given on the command line.
//!
//! Generates one command, optionally explains, persists and executes it,
//! then exits. The interactive session in [`crate::tui`] covers the
//! open-ended case.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::CommandService;
use crate::executor::ShellExecutor;
use crate::output::write_command_file;
use crate::session::SessionContext;

const EMPTY_OUTPUT: &str = "Command response was empty";

/// Generate a command for `prompt` and carry out the session flags once.
pub async fn run(
    service: Arc<dyn CommandService>,
    ctx: &SessionContext,
    prompt: &str,
) -> Result<()> {
    let generated = service
        .generate(prompt, &ctx.language)
        .await
        .context("command generation failed")?;

    if let Some(warning) = generated.warning() {
        eprintln!("{}", warning);
    }
    if generated.cmd.is_empty() {
        println!("{}", EMPTY_OUTPUT);
        return Ok(());
    }
    println!("{}", generated.cmd);

    if ctx.explain {
        match service.explain(&generated.cmd, &ctx.language).await {
            Ok(explanation) => println!("\n{}", explanation),
            Err(err) => eprintln!("explanation unavailable: {}", err),
        }
    }

    if ctx.save_output && !ctx.outfile.is_empty() {
        write_command_file(&ctx.outfile, &generated.cmd)
            .with_context(|| format!("failed to write command to {}", ctx.outfile))?;
        info!(path = %ctx.outfile, "command written to file");
    }

    let execute = if ctx.confirm_exec {
        confirm(&generated.cmd, &mut io::stdin().lock(), &mut io::stdout())?
    } else {
        ctx.auto_execute
    };
    if !execute {
        return Ok(());
    }

    let output = tokio::task::spawn_blocking({
        let command = generated.cmd.clone();
        move || ShellExecutor::new().execute(&command)
    })
    .await
    .context("execution task failed")??;

    if output.is_empty() {
        println!("{}", EMPTY_OUTPUT);
    } else {
        print!("{}", output);
    }
    Ok(())
}

/// Ask on the terminal whether `command` should run. Only an explicit
/// `y` or `yes` counts as consent.
fn confirm<R: BufRead, W: Write>(command: &str, input: &mut R, output: &mut W) -> Result<bool> {
    writeln!(output, "Do you wish to execute the below? (y/n)")?;
    writeln!(output, "  {}", command)?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(reply: &str) -> bool {
        let mut input = reply.as_bytes();
        let mut output = Vec::new();
        confirm("ls -la", &mut input, &mut output).unwrap()
    }

    #[test]
    fn test_confirm_accepts_y_and_yes() {
        assert!(ask("y\n"));
        assert!(ask("yes\n"));
        assert!(ask("YES\n"));
    }

    #[test]
    fn test_confirm_rejects_anything_else() {
        assert!(!ask("n\n"));
        assert!(!ask("\n"));
        assert!(!ask("sure\n"));
    }

    #[test]
    fn test_confirm_prints_the_command() {
        let mut input = "n\n".as_bytes();
        let mut output = Vec::new();
        confirm("rm -rf target", &mut input, &mut output).unwrap();
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Do you wish to execute the below? (y/n)"));
        assert!(shown.contains("rm -rf target"));
    }
}
