//! `vyra` - panic-button API server and store management CLI.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use vyra::cli::{AlertsCommand, Cli, Command, ConfigCommand, ContactsCommand, ServeCommand};
use vyra::{init_logging, server, AlertStatus, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::Contacts(contacts_cmd) => handle_contacts(&config, contacts_cmd).await,
        Command::Alerts(alerts_cmd) => handle_alerts(&config, alerts_cmd).await,
        Command::Config(config_cmd) => handle_config(&config, cli.config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    server::run(&config).await.context("server failed")
}

async fn handle_contacts(config: &Config, cmd: ContactsCommand) -> anyhow::Result<()> {
    let state = server::build_state(config)?;

    match cmd {
        ContactsCommand::List { json } => {
            let contacts = state.contacts.list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
            } else if contacts.is_empty() {
                println!("No trusted contacts.");
            } else {
                for (i, contact) in contacts.iter().enumerate() {
                    println!("{}. {:<30} {}", i + 1, contact.name, contact.phone);
                }
            }
        }
        ContactsCommand::Add { name, phone } => {
            let contacts = state.contacts.add(&name, &phone).await?;
            println!(
                "Registered contact ({} of {}).",
                contacts.len(),
                state.contacts.limit()
            );
        }
        ContactsCommand::Clear => {
            state.contacts.clear().await?;
            println!("Cleared trusted contacts.");
        }
    }
    Ok(())
}

async fn handle_alerts(config: &Config, cmd: AlertsCommand) -> anyhow::Result<()> {
    let state = server::build_state(config)?;

    match cmd {
        AlertsCommand::List { json } => {
            let alerts = state.alerts.list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&alerts)?);
            } else if alerts.is_empty() {
                println!("No alerts.");
            } else {
                for alert in &alerts {
                    println!(
                        "{}  {:<6}  {}  {}  {}",
                        alert.id,
                        alert.status,
                        vyra::alert::timestamp::format(&alert.ts),
                        alert.occurrence,
                        alert.driver_name
                    );
                }
            }
        }
        AlertsCommand::Ack { id, status } => {
            let status: AlertStatus = status.into();
            if state.alerts.acknowledge(&id, status).await? {
                println!("Alert {id} marked {status}.");
            } else {
                anyhow::bail!("no alert with id {id}");
            }
        }
        AlertsCommand::Clear => {
            state.alerts.clear().await?;
            println!("Cleared alerts.");
        }
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!("  Max contacts:       {}", config.storage.max_contacts);
                println!("  Max alerts:         {}", config.storage.max_alerts);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => anyhow::bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
