
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{Config, ConfigError, LlmConfig};
use crate::llm::{ChatClient, LlmError};
use crate::retrieval::RetrievalConfig;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Knowledge RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Language Model Configuration").bold().yellow());
    eprintln!("Configure the OpenAI-compatible chat-completions endpoint used to answer questions.");
    eprintln!();

    configure_llm(&mut config.llm)?;

    eprintln!();
    eprintln!("{}", style("Retrieval Configuration").bold().yellow());
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    match test_llm_connection(&config.llm) {
        ConnectionStatus::Ok => {
            eprintln!("{}", style("✓ Model endpoint responded successfully!").green());
        }
        ConnectionStatus::Unauthorized(code) => {
            eprintln!(
                "{}",
                style(format!(
                    "⚠ Endpoint reachable but rejected the credentials (HTTP {code})"
                ))
                .yellow()
            );
            eprintln!(
                "Set {} before asking questions.",
                style(&config.llm.api_key_env).cyan()
            );
        }
        ConnectionStatus::Failed(reason) => {
            eprintln!(
                "{}",
                style("⚠ Warning: Could not reach the model endpoint").yellow()
            );
            eprintln!("  {}", style(reason).dim());
            eprintln!("You can continue, but answers will fail until the endpoint is available.");
        }
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Language Model:").bold().yellow());
    match config.llm.endpoint_url() {
        Ok(url) => eprintln!("  Endpoint: {}", style(url).cyan()),
        Err(e) => eprintln!("  Endpoint: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.llm.model).cyan());
    eprintln!(
        "  API key variable: {} ({})",
        style(&config.llm.api_key_env).cyan(),
        if std::env::var_os(&config.llm.api_key_env).is_some() {
            style("set").green()
        } else {
            style("not set").red()
        }
    );
    eprintln!("  Temperature: {}", style(config.llm.temperature).cyan());
    eprintln!("  Max tokens: {}", style(config.llm.max_tokens).cyan());
    eprintln!("  Timeout: {}s", style(config.llm.timeout_seconds).cyan());
    eprintln!("  Retry attempts: {}", style(config.llm.retry_attempts).cyan());

    eprintln!();
    eprintln!("{}", style("Chunking:").bold().yellow());
    eprintln!("  Max words: {}", style(config.chunking.max_words).cyan());
    eprintln!(
        "  Min chunk length: {}",
        style(config.chunking.min_chunk_len).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!("  Top k: {}", style(config.retrieval.top_k).cyan());
    eprintln!("  Min score: {}", style(config.retrieval.min_score).cyan());
    eprintln!(
        "  Chunks file: {}",
        style(config.chunks_path().display()).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Sessions:").bold().yellow());
    eprintln!("  TTL: {} minutes", style(config.session.ttl_minutes).cyan());
    eprintln!("  Max turns: {}", style(config.session.max_turns).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load_default().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_llm(llm: &mut LlmConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == llm.protocol)
        .unwrap_or(1);

    let protocol_index = Select::new()
        .with_prompt("Endpoint protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Endpoint host")
        .default(llm.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = LlmConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..LlmConfig::default()
            };
            temp_config.base_url()?;
            Ok(())
        })
        .interact_text()?;

    let default_port = if protocol == llm.protocol {
        llm.port
    } else if protocol == "https" {
        443
    } else {
        80
    };
    let port: u16 = Input::new()
        .with_prompt("Endpoint port")
        .default(default_port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let api_path: String = Input::new()
        .with_prompt("Chat completions path")
        .default(llm.api_path.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.starts_with('/') {
                Ok(())
            } else {
                Err("Path must start with '/'")
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Model name")
        .default(llm.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(llm.api_key_env.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Variable name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let temperature: f32 = Input::new()
        .with_prompt("Sampling temperature")
        .default(llm.temperature)
        .validate_with(|input: &f32| -> Result<(), &str> {
            if (0.0..=2.0).contains(input) {
                Ok(())
            } else {
                Err("Temperature must be between 0.0 and 2.0")
            }
        })
        .interact_text()?;

    llm.set_protocol(protocol)?;
    llm.set_host(host)?;
    llm.set_port(port)?;
    llm.set_api_path(api_path)?;
    llm.set_model(model)?;
    llm.set_api_key_env(api_key_env)?;
    llm.set_temperature(temperature)?;

    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let top_k: usize = Input::new()
        .with_prompt("Fragments passed to the model per question")
        .default(retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=50).contains(input) {
                Ok(())
            } else {
                Err("Must be between 1 and 50")
            }
        })
        .interact_text()?;

    let min_score: f64 = Input::new()
        .with_prompt("Minimum similarity score")
        .default(retrieval.min_score)
        .validate_with(|input: &f64| -> Result<(), &str> {
            if (0.0..1.0).contains(input) {
                Ok(())
            } else {
                Err("Must be at least 0.0 and below 1.0")
            }
        })
        .interact_text()?;

    retrieval.top_k = top_k;
    retrieval.min_score = min_score;

    Ok(())
}

#[derive(Debug)]
enum ConnectionStatus {
    Ok,
    Unauthorized(u16),
    Failed(String),
}

fn test_llm_connection(llm: &LlmConfig) -> ConnectionStatus {
    let client = match ChatClient::new(llm) {
        Ok(client) => client.with_retry_attempts(1),
        Err(e) => return ConnectionStatus::Failed(e.to_string()),
    };

    connection_status(client.health_check())
}

fn connection_status(result: Result<(), LlmError>) -> ConnectionStatus {
    match result {
        Ok(()) => ConnectionStatus::Ok,
        Err(LlmError::ClientStatus(code @ (401 | 403))) => ConnectionStatus::Unauthorized(code),
        Err(e) => ConnectionStatus::Failed(e.to_string()),
    }
}
