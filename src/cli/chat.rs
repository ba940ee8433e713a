//! Interactive chat command
//!
//! Reads prompts from the terminal, routes each one to a model and
//! streams the reply back word by word.

use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::ai::router::{explain_model, Router};
use crate::ai::stream::{FixedPacing, NoPacing, Pacing, Streamer};
use crate::ai::OpenAiClient;
use crate::config::Config;
use crate::core::session::{Command, Session, TurnOutcome};
use crate::ui::theme::symbols;
use crate::ui::{help_table, ChatTheme, TerminalSink};

const INPUT_HINT: &str = "Enter your prompt or 'helpme' or '!' for commands.";

/// Print a horizontal divider
fn print_divider(theme: &ChatTheme) {
    println!("{}", theme.muted.apply_to(symbols::DIVIDER.repeat(55)));
}

/// Print the assistant label that precedes a reply
fn print_ai_label(theme: &ChatTheme) {
    println!();
    println!("{}", theme.accent.apply_to(format!("{} Assistant", symbols::AI_ICON)));
}

/// Print a finished assistant message
fn print_ai_message(theme: &ChatTheme, content: &str) {
    print_ai_label(theme);
    println!("{}", content);
}

/// Print error message
fn print_error(theme: &ChatTheme, message: &str) {
    println!(
        "\n{}",
        theme.error.apply_to(format!("{} Error: {}", symbols::ERROR, message))
    );
}

/// Print success message
fn print_success(theme: &ChatTheme, message: &str) {
    println!(
        "\n{}",
        theme.success.apply_to(format!("{} {}", symbols::SUCCESS, message))
    );
}

/// Print which model answered and why it was chosen
fn print_explanation(theme: &ChatTheme, model: &str, default_model: &str) {
    println!(
        "{} {}",
        theme.muted.apply_to(format!("[{}]", model)),
        theme.primary.apply_to(format!("{} {}", symbols::INFO, explain_model(model, default_model)))
    );
}

/// Read one line of input; `None` on EOF
fn read_input(theme: &ChatTheme) -> Option<String> {
    print!("\n{} ", theme.primary.apply_to(symbols::USER_ICON));
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Print banner with the rule count and hint
fn print_banner(theme: &ChatTheme, router: &Router) {
    println!();
    println!(
        "{}",
        theme.heading.apply_to(format!("Model Sliding v{}", env!("CARGO_PKG_VERSION")))
    );
    println!(
        "{}",
        theme.muted.apply_to(format!(
            "{} routing rules, default model {}",
            router.rules().len(),
            router.fallback().model
        ))
    );
    println!("{}", theme.muted.apply_to(INPUT_HINT));
    println!("{}", theme.muted.apply_to("Commands: !, helpme, /model, /exit"));
    print_divider(theme);
}

/// Main chat loop
pub async fn run(config: Config, initial_prompt: Option<String>) -> Result<()> {
    let client = OpenAiClient::from_config(&config.ai)
        .context("Failed to set up the API client")?;
    let mut router = Router::from_config(&config.routing);
    let streamer = Streamer::new(
        &client,
        &config.ai.completion_model,
        config.ai.completion_max_tokens,
    )
    .with_cursor(&config.display.cursor);
    let pacing: Box<dyn Pacing> = match config.display.word_delay_ms {
        0 => Box::new(NoPacing),
        ms => Box::new(FixedPacing::from_millis(ms)),
    };
    let mut session = Session::start(&config.routing.default_model)
        .with_persona_as_system(config.ai.persona_as_system);

    let theme = ChatTheme::new();
    print_banner(&theme, &router);

    for message in session.transcript().messages() {
        print_ai_message(&theme, &message.content);
    }

    let mut pending = initial_prompt;

    loop {
        let input = match pending.take() {
            Some(prompt) => prompt,
            None => match read_input(&theme) {
                Some(i) => i,
                None => {
                    println!();
                    break;
                }
            },
        };

        if input.trim().is_empty() {
            continue;
        }

        let mut sink = if let Command::Prompt(_) = Command::parse(&input) {
            print_ai_label(&theme);
            TerminalSink::thinking(&config.display.cursor)
        } else {
            TerminalSink::new(&config.display.cursor)
        };
        let outcome = session
            .handle_input(&input, &mut router, &streamer, &mut sink, pacing.as_ref())
            .await;
        sink.finish();

        match outcome {
            Ok(TurnOutcome::Help) => {
                println!();
                print!("{}", help_table(router.rules()));
            }
            Ok(TurnOutcome::Exit) => {
                print_success(&theme, "Goodbye!");
                break;
            }
            Ok(TurnOutcome::ShowModel) => {
                println!(
                    "\n{}",
                    theme.muted.apply_to(format!("Current model: {}", session.current_model()))
                );
            }
            Ok(TurnOutcome::Reply(reply)) => {
                print_explanation(&theme, &reply.decision.model, &router.fallback().model);
                tracing::debug!(
                    "Transcript now holds {} messages, {} cached routes",
                    session.transcript().len(),
                    router.cached_len()
                );
            }
            Err(e) => {
                tracing::warn!("Turn failed: {}", e);
                print_error(&theme, &e.to_string());
            }
        }
    }

    println!();
    Ok(())
}
