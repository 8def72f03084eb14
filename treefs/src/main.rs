use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use clap::Parser;
use treefs::config::{state_path, CliArgs};
use treefs::shell::{ask, Shell};
use treefs::FileSystem;

const SAVE_QUESTION: &str = "Enter save path (or 'no' to skip saving): ";
const LOAD_QUESTION: &str = "Enter load path (or 'no' to skip loading): ";

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr; stdout carries the shell's replies
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let interactive = io::stdin().is_terminal();
    let mut input = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    let save_answer = match &args.save {
        Some(answer) => answer.clone(),
        None => ask(&mut input, &mut stdout, SAVE_QUESTION)?,
    };
    let load_answer = match &args.load {
        Some(answer) => answer.clone(),
        None => ask(&mut input, &mut stdout, LOAD_QUESTION)?,
    };

    let mut fs = FileSystem::with_limits(args.name_limits());

    if let Some(path) = state_path(&load_answer) {
        match fs.load_from(&path) {
            Ok(()) => writeln!(stdout, "State loaded successfully.")?,
            Err(e) => {
                tracing::warn!(path = %path.display(), code = e.code(), error = %e, "load failed");
                writeln!(stdout, "Unable to load state from file: {}", e)?;
            }
        }
    }

    tracing::info!(nodes = fs.node_count(), interactive, "shell starting");

    let mut shell = Shell::new(fs, stdout).with_prompt(interactive);
    // A broken input stream ends the session but the tree is still saved
    if let Err(e) = shell.run(&mut input) {
        tracing::error!(error = %e, "shell stopped reading input");
    }
    let (fs, mut stdout) = shell.into_inner();

    if let Some(path) = state_path(&save_answer) {
        match fs.save_to(&path) {
            Ok(()) => writeln!(stdout, "State saved successfully.")?,
            Err(e) => {
                tracing::warn!(path = %path.display(), code = e.code(), error = %e, "save failed");
                writeln!(stdout, "Unable to save state to file: {}", e)?;
            }
        }
    }

    tracing::info!("Shutting down");
    stdout.flush()?;
    Ok(())
}
