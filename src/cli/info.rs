//! Info command - show system information

use anyhow::Result;

use crate::config::{self, Config};

pub fn run(config: &Config) -> Result<()> {
    println!("Model Sliding v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("System Information:");
    println!("  OS: {} {}", std::env::consts::OS, std::env::consts::ARCH);

    println!();
    println!("Configuration:");
    println!("  Config file: {}", config_file());
    println!("  API base URL: {}", config.ai.base_url);
    println!("  Routing rules: {}", config.routing.rules.len());
    println!("  Completion-mode model: {}", config.ai.completion_model);

    println!();
    println!("AI Provider:");
    check_provider(&config.ai.api_key_env);

    Ok(())
}

fn config_file() -> String {
    config::config_path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn check_provider(env_var: &str) {
    let status = match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => "configured",
        _ => "not configured",
    };
    println!("  {}: {}", env_var, status);
}
