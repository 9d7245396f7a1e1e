//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, WEBHOOK_SECRET_ENV};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let config = &ctx.config;

    ctx.output.info("[catalog]");
    ctx.output.kv("path", &config.catalog.path);

    ctx.output.info("[server]");
    ctx.output.kv("bind_addr", &config.server.bind_addr);
    ctx.output.kv("transaction_log", &config.server.transaction_log);
    if let Some(url) = &config.server.public_base_url {
        ctx.output.kv("public_base_url", url);
    }
    let secret = if std::env::var_os(WEBHOOK_SECRET_ENV).is_some() {
        "set"
    } else {
        "not set"
    };
    ctx.output.kv(WEBHOOK_SECRET_ENV, secret);

    ctx.output.info("[cart]");
    ctx.output.kv("store_dir", &config.cart.store_dir);

    ctx.output.info("[logging]");
    ctx.output.kv("level", config.logging.level.as_str());
    ctx.output.kv("format", config.logging.format.as_str());
    if let Some(directives) = &config.logging.directives {
        ctx.output.kv("directives", directives);
    }

    ctx.output.info("[analytics]");
    ctx.output.kv(
        "measurement_id",
        config
            .analytics
            .measurement_id
            .as_deref()
            .unwrap_or("(none)"),
    );

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("route66.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (mut errors, warnings) = ctx.config.validate();

    let catalog = ctx.catalog_path(None);
    if !catalog.is_file() {
        errors.push(format!("catalog.path: {} does not exist", catalog.display()));
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
