//! CleanCity command-line tool.
//!
//! Loads configuration, then runs one subcommand:
//! - `topic`, `validate`: pure lookups, no network
//! - `decorate`, `decorate-notifications`: read JSON records and render them
//! - `send`, `emit`: publish pushes to the relay
//! - `config`: inspect or create the config file

mod cli;
mod commands;

use std::sync::Arc;

use clap::Parser;
use cleancity_core::bus::EventBus;
use cleancity_core::config::CleanCityConfig;
use cleancity_core::events::DomainEvent;
use cleancity_core::types::SystemClock;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

use cli::{CliArgs, Command, ConfigAction};
use commands::SendRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Logging comes up before the config is read so load warnings are kept.
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(args.bootstrap_log_level())),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_file = args.resolve_config_path();
    let mut config = CleanCityConfig::load_or_default(&config_file);
    if args.uses_config_log_level(rust_log_set) {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&config.general.log_level)) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }

    tracing::debug!("Starting CleanCity v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    config.notify.server_url = args.resolve_ntfy_url(&config.notify.server_url);
    config.notify.token = args.resolve_ntfy_token(config.notify.token.as_deref());
    config.validate()?;

    let clock = Arc::new(SystemClock);
    let bus: EventBus<DomainEvent> = EventBus::new();

    match args.command {
        Command::Topic { username } => {
            println!("{}", commands::topic(&config, &username));
        }
        Command::Validate {
            title,
            content,
            preset,
        } => {
            let result = commands::validate(&config, &title, &content, preset.as_deref())?;
            println!("{}", commands::render_validation(&result));
            if !result.is_valid {
                std::process::exit(1);
            }
        }
        Command::Decorate { file, format, json } => {
            println!(
                "{}",
                commands::decorate_posts(&config, clock, &file, format, json)?
            );
        }
        Command::DecorateNotifications { file, json } => {
            println!("{}", commands::decorate_notifications(clock, &file, json)?);
        }
        Command::Send {
            username,
            message,
            title,
            priority,
            tags,
            headers,
        } => {
            let request = SendRequest {
                username,
                message,
                title,
                priority,
                tags,
                headers,
            };
            match commands::send(&config, request).await? {
                Some(topic) => println!("Sent to {}", topic),
                None => println!("Push delivery is disabled; nothing sent"),
            }
        }
        Command::Emit { file } => {
            let relay = commands::wire_relay(&config, &bus)?;
            let count = commands::emit(&bus, &relay, &file).await?;
            relay.detach();
            println!("Emitted {} event(s)", count);
        }
        Command::Config { action } => match action {
            ConfigAction::Show => print!("{}", commands::config_show(&config)?),
            ConfigAction::Init { force } => {
                let path = commands::config_init(&config_file, force)?;
                println!("Wrote {}", path.display());
            }
            ConfigAction::Path => println!("{}", config_file.display()),
        },
    }

    Ok(())
}
