//! Route command - show which model a prompt would go to, without calling it

use anyhow::Result;

use crate::ai::router::{explain_model, Router};
use crate::config::Config;
use crate::core::session::Command;
use crate::ui::{help_table, ChatTheme};

pub fn run(config: &Config, prompt: &str) -> Result<()> {
    let theme = ChatTheme::new();

    if !matches!(Command::parse(prompt), Command::Prompt(_)) {
        println!("{}", theme.muted.apply_to("Reserved command, not routed."));
        return Ok(());
    }

    let mut router = Router::from_config(&config.routing);
    let decision = router.route(prompt);
    let mode = if decision.model == config.ai.completion_model {
        "completion"
    } else {
        "streaming chat"
    };

    println!("{} {}", theme.heading.apply_to("Model:"), decision.model);
    println!("{} {}", theme.heading.apply_to("Mode: "), mode);
    println!("{} {}", theme.heading.apply_to("Role: "), decision.role);
    println!();
    println!("{}", theme.primary.apply_to(explain_model(&decision.model, &config.routing.default_model)));
    Ok(())
}

/// Models command - print the routing reference table
pub fn models(config: &Config) -> Result<()> {
    print!("{}", help_table(&config.routing.rules));
    println!();
    println!(
        "Unmatched prompts use {} ({}).",
        config.routing.default_model, config.routing.default_role
    );
    Ok(())
}
