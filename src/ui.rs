use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::*;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Words that end an interactive session.
const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", ":q"];

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// Scrolling chat transcript in the terminal.
pub struct ChatUI {
    colorful: bool,
    input: Lines<BufReader<Stdin>>,
}

impl ChatUI {
    pub fn new(colorful: bool) -> Self {
        if !colorful {
            colored::control::set_override(false);
        }
        Self {
            colorful,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub fn start(&self, provider: &str) -> Result<()> {
        if self.colorful {
            execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        }
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "🧠 Chat Agent".bright_white().bold());
        println!(
            "{}",
            format!("Math, German translation and questions via {}. Type 'exit' to leave.", provider)
                .dimmed()
        );
        println!("{}", "=".repeat(60).bright_blue());
        Ok(())
    }

    /// Show the prompt and wait for the next message. `None` means the session is over.
    pub async fn read_message(&mut self) -> Result<Option<String>> {
        print!("\n{} ", ">".bright_blue().bold());
        io::stdout().flush()?;

        let line = self
            .input
            .next_line()
            .await
            .context("Failed to read from stdin")?;
        Ok(line.filter(|l| !is_exit_command(l)))
    }

    pub fn display_message(&self, text: &str, sender: Sender) {
        println!("{}", format_message(text, sender));
    }
}

fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Render one transcript entry: a styled header line followed by the message.
pub fn format_message(text: &str, sender: Sender) -> String {
    let header = match sender {
        Sender::User => "🧑 You:".bright_blue().bold(),
        Sender::Bot => "🤖 Bot:".bright_green().bold(),
    };
    format!("\n{}\n{}", header, text.white())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  QUIT "));
        assert!(!is_exit_command("exit strategy"));
    }

    #[test]
    fn test_message_layout() {
        colored::control::set_override(false);
        assert_eq!(format_message("hi", Sender::User), "\n🧑 You:\nhi");
        assert_eq!(format_message("a\nb", Sender::Bot), "\n🤖 Bot:\na\nb");
    }
}
