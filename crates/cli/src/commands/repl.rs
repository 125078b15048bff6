//! Interactive REPL command.

use clap::Args;
use mathtutor_core::{AppConfig, AppResult};
use std::io::{BufRead, Write};

/// Inputs that end the loop.
const EXIT_COMMANDS: &[&str] = &["exit", "quit", ":q"];

/// Interactive question-answering loop
#[derive(Args, Debug)]
pub struct ReplCommand {}

impl ReplCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let agent = super::build_agent(config)?;

        println!("Math Tutor ready. Enter questions (type 'exit' to quit).");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            print!("\nQ > ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if EXIT_COMMANDS.contains(&question.to_lowercase().as_str()) {
                println!("Goodbye.");
                break;
            }

            match agent.answer(question).await {
                Ok(answer) => println!("A > {}", answer),
                Err(e) => eprintln!("error: {}", e),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        for cmd in ["exit", "quit", ":q"] {
            assert!(EXIT_COMMANDS.contains(&cmd));
        }
        assert!(!EXIT_COMMANDS.contains(&"continue"));
    }
}
