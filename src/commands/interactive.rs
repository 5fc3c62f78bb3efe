use crate::cli::{Cli, Cmd};
use crate::commands::dispatch;
use crate::core::context::AppCtx;
use crate::ui;
use clap::Parser;
use console::style;
use dialoguer::Input;

/// Run the CLI in interactive REPL mode.
pub fn run(ctx: &mut AppCtx) -> Result<(), String> {
    println!("Entering interactive mode. Type 'exit' or 'quit' to leave.");
    loop {
        let input: String = Input::with_theme(&ui::theme())
            .with_prompt(format!("{}", style("cue >").blue().bold()))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| format!("Input error: {}", e))?;

        let input = input.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let args = match shell_words::split(input) {
            Ok(args) => args,
            Err(e) => {
                eprintln!("• Error parsing command: {}", e);
                continue;
            }
        };

        let full_args = std::iter::once("cuecli".to_string()).chain(args);

        match Cli::try_parse_from(full_args) {
            Ok(Cli {
                command: Cmd::Interactive,
                ..
            }) => println!("{}", style("Already in interactive mode").dim()),
            Ok(cli) => {
                if let Err(e) = dispatch(cli.command, ctx) {
                    eprintln!("• {}", e);
                }
            }
            Err(e) => {
                e.print().unwrap_or(());
            }
        }
    }
    Ok(())
}
