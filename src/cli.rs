// src/cli.rs
use crate::core::HttpRelay;
use crate::environment::AppConfig;
use crate::flows::{
    ConnectFlow, ConnectStatus, Location, MemoryLocation, PublishFlow, PublishStatus,
};
use crate::store::{
    watch, ConfigStore, FileStorage, LINKEDIN_CLIENT_SECRET, LINKEDIN_TOKEN, OPENAI_API_KEY,
};
use crate::web::start_web_server;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const WATCH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "social-creator")]
#[command(about = "Connect a LinkedIn account and publish posts through the relay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config.yaml
    #[arg(long, global = true, env = "SOCIAL_CREATOR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the relay server
    Serve,
    /// Print the LinkedIn authorization URL to open in a browser
    Connect,
    /// Finish connecting from the URL LinkedIn redirected back to
    Callback { url: String },
    /// Publish a text post
    Publish { text: String },
    /// Show whether a LinkedIn account is connected
    Status {
        /// Keep running and report every change
        #[arg(long)]
        watch: bool,
    },
    /// Forget the stored LinkedIn token
    Disconnect,
    /// Read or edit stored settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print one setting
    Get { key: String },
    /// Store one setting
    Set { key: String, value: String },
    /// Remove one setting
    Unset { key: String },
    /// List every setting, secrets masked
    List,
}

pub async fn handle_command(command: Command, config: &AppConfig) -> Result<()> {
    let store = ConfigStore::new(Arc::new(FileStorage::new(config.storage.dir.clone())));

    match command {
        Command::Serve => start_web_server(config).await?,

        Command::Connect => {
            let location = MemoryLocation::parse(&config.redirect_uri())?;
            let mut flow = connect_flow(&store, config)?;
            flow.connect(&location)?;
            if let Some(error) = flow.error() {
                anyhow::bail!("{}", error);
            }
            let url = location
                .assigned()
                .context("Connect flow did not produce an authorization URL")?;
            println!("Open this URL to authorize the application:");
            println!("{}", url);
        }

        Command::Callback { url } => {
            let location = MemoryLocation::parse(&url)
                .with_context(|| format!("Invalid callback URL: {}", url))?;
            let mut flow = connect_flow(&store, config)?;
            match flow.mount(&location).await {
                ConnectStatus::Connected => {
                    println!("✓ Connected with LinkedIn");
                    info!("Callback handled, location now {}", location.href());
                }
                ConnectStatus::Error => {
                    anyhow::bail!("{}", flow.error().unwrap_or("Connection failed"))
                }
                ConnectStatus::Idle | ConnectStatus::Connecting => anyhow::bail!(
                    "Nothing to exchange: the URL has no code or the client id/secret are not configured"
                ),
            }
        }

        Command::Publish { text } => {
            let relay = HttpRelay::new(config.relay_url.clone())?;
            let flow = PublishFlow::new(&store, relay, text);
            match flow.publish().await {
                PublishStatus::Success => println!("✓ Post published on LinkedIn"),
                _ => {
                    let view = flow.snapshot();
                    anyhow::bail!(
                        "{}",
                        view.error.unwrap_or_else(|| "Post was not published".to_string())
                    )
                }
            }
        }

        Command::Status { watch: follow } => {
            println!("{}", describe(store.get(LINKEDIN_TOKEN).is_some()));
            if follow {
                let _subscription = store.subscribe(|store, _change| {
                    println!("{}", describe(store.get(LINKEDIN_TOKEN).is_some()));
                });
                let watcher = watch(Arc::clone(&store), WATCH_INTERVAL);
                tokio::signal::ctrl_c()
                    .await
                    .context("Failed to listen for Ctrl-C")?;
                watcher.abort();
            }
        }

        Command::Disconnect => {
            let mut flow = connect_flow(&store, config)?;
            flow.disconnect()?;
            println!("Disconnected from LinkedIn");
        }

        Command::Config(ConfigCommand::Get { key }) => match store.get(&key) {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("{} is not configured", key),
        },

        Command::Config(ConfigCommand::Set { key, value }) => {
            store.set(&key, &value)?;
            println!("✓ {} saved", key);
        }

        Command::Config(ConfigCommand::Unset { key }) => {
            store.remove(&key)?;
            println!("✓ {} removed", key);
        }

        Command::Config(ConfigCommand::List) => {
            for (key, value) in store.snapshot() {
                println!("{} = {}", key, display_value(&key, &value));
            }
        }
    }

    Ok(())
}

fn connect_flow(
    store: &Arc<ConfigStore>,
    config: &AppConfig,
) -> Result<ConnectFlow<HttpRelay>> {
    let relay = HttpRelay::new(config.relay_url.clone())?;
    Ok(ConnectFlow::new(
        Arc::clone(store),
        relay,
        config.redirect_uri(),
        &config.linkedin,
    ))
}

fn describe(connected: bool) -> &'static str {
    if connected {
        "Connected with LinkedIn"
    } else {
        "Not connected with LinkedIn"
    }
}

fn display_value(key: &str, value: &Value) -> String {
    let secret = [LINKEDIN_CLIENT_SECRET, LINKEDIN_TOKEN, OPENAI_API_KEY].contains(&key);
    match value {
        Value::String(s) if secret => mask(s),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_secrets_are_masked() {
        assert_eq!(
            display_value(LINKEDIN_TOKEN, &json!("AQX1234567890")),
            "AQX1****"
        );
        assert_eq!(display_value(LINKEDIN_CLIENT_SECRET, &json!("short")), "****");
        assert_eq!(display_value("LINKEDIN_CLIENT_ID", &json!("abc")), "abc");
        assert_eq!(display_value("CUSTOM", &json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["social-creator", "publish", "hello"]).unwrap();
        assert!(matches!(cli.command, Command::Publish { ref text } if text == "hello"));

        let cli = Cli::try_parse_from(["social-creator", "config", "set", "K", "V"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Set { .. })));

        let cli = Cli::try_parse_from(["social-creator", "status", "--watch"]).unwrap();
        assert!(matches!(cli.command, Command::Status { watch: true }));
    }
}
