//! Clean command handler.

use clap::Args;
use mathtutor_core::{AppConfig, AppResult};

/// Clear the knowledge base
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl CleanCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clean command");

        if !self.yes {
            use std::io::Write;
            print!("Clear all ingested documents? [y/N] ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            if !line.trim().eq_ignore_ascii_case("y") {
                println!("Aborted");
                return Ok(());
            }
        }

        mathtutor_knowledge::ingest::clean(&config.index_path())?;
        println!("Knowledge base cleaned");

        Ok(())
    }
}
