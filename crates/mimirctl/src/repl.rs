//! Interactive read loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use console::style;
use mimir_core::Resolver;
use owo_colors::OwoColorize;

pub const EXIT_COMMAND: &str = "quit";

/// Prompt, resolve, print - until `quit` or end of input.
pub fn run(resolver: &Resolver) -> Result<()> {
    println!(
        "{}",
        style("Mimir ready. Type 'quit' to exit.").cyan().bold()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "{} ", "You:".green().bold())?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case(EXIT_COMMAND) {
            println!("{}", style("Goodbye!").cyan());
            break;
        }

        let response = resolver.resolve(input);
        println!("{} {}", "Mimir:".magenta().bold(), response);
    }

    Ok(())
}
