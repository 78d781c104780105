//! Subcommand handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use strata_backend::{BackendProvider, ConversationSession, WorkflowBackendClient};
use strata_types::ClientConfig;
use strata_util::{AppSettings, SettingKey, SettingsStore, expand_tilde, mask_secret, secrets_backend};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::args::{Cli, Command, ConfigCommand};

const SUPPORTED_PROVIDER: &str = "n8n";

pub async fn run(cli: Cli) -> Result<()> {
    let store = open_store(&cli);
    let settings = store.snapshot();

    match cli.command {
        Command::Config { ref action } => run_config(&store, action),
        Command::Test => {
            let client = build_client(&settings, &cli)?;
            let report = client.test_connection().await;
            if !report.success {
                bail!("{}", report.message);
            }
            println!("{}", report.message);
            Ok(())
        }
        Command::Send { ref text } => {
            let client = build_available_client(&settings, &cli)?;
            println!("{}", client.send_message(&text.join(" ")).await);
            Ok(())
        }
        Command::Chat => {
            let client = build_available_client(&settings, &cli)?;
            run_chat(Arc::new(client)).await
        }
        Command::Tools => {
            let client = build_available_client(&settings, &cli)?;
            for tool in client.get_tools().await {
                println!("{}\t{}\t{}", tool.id, tool.name, tool.description);
            }
            Ok(())
        }
        Command::Workflows => {
            let client = build_available_client(&settings, &cli)?;
            for workflow in client.search_workflows().await {
                println!(
                    "{}\t{}\t{}",
                    workflow.id,
                    workflow.name,
                    workflow.description.unwrap_or_default()
                );
            }
            Ok(())
        }
    }
}

fn open_store(cli: &Cli) -> SettingsStore {
    let opened = match &cli.settings {
        Some(path) => {
            let path = expand_tilde(&path.to_string_lossy());
            SettingsStore::open_at(path, secrets_backend().vault())
        }
        None => SettingsStore::open(),
    };
    opened.unwrap_or_else(|error| {
        warn!(error = %error, "Failed to open settings; continuing with defaults");
        SettingsStore::ephemeral()
    })
}

/// Stored settings with the per-invocation flags applied on top.
pub fn resolve_config(settings: &AppSettings, cli: &Cli) -> ClientConfig {
    let mut config = settings.client_config();
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.token = token.clone();
    }
    if let Some(workflow) = &cli.workflow {
        config.workflow_id = workflow.clone();
    }
    config
}

fn build_client(settings: &AppSettings, cli: &Cli) -> Result<WorkflowBackendClient> {
    if !settings.active_backend_provider.eq_ignore_ascii_case(SUPPORTED_PROVIDER) {
        bail!(
            "unsupported backend provider '{}'; only '{}' is available",
            settings.active_backend_provider,
            SUPPORTED_PROVIDER
        );
    }
    let config = resolve_config(settings, cli);
    info!(url = %config.url, workflow = %config.workflow_id, timeout = ?cli.timeout, "using MCP backend");
    let client = match cli.timeout {
        Some(seconds) => WorkflowBackendClient::with_timeout(config, Duration::from_secs(seconds)),
        None => WorkflowBackendClient::new(config),
    };
    client.context("build backend client")
}

fn build_available_client(settings: &AppSettings, cli: &Cli) -> Result<WorkflowBackendClient> {
    let client = build_client(settings, cli)?;
    if !client.is_available() {
        bail!(
            "backend is not configured; set '{}' and '{}' with `strata config set` or pass --url/--token",
            SettingKey::McpUrl,
            SettingKey::McpToken
        );
    }
    Ok(client)
}

async fn run_chat(provider: Arc<dyn BackendProvider>) -> Result<()> {
    eprintln!("Connected to {}. Type a message and press Enter; Ctrl-D to quit.", provider.name());
    let mut session = ConversationSession::new(provider);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read transcript")? {
        if let Some(reply) = session.submit_transcript(&line).await {
            println!("{}", reply.text);
        }
    }
    Ok(())
}

fn run_config(store: &SettingsStore, action: &ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Path => println!("{}", store.path().display()),
        ConfigCommand::Show => {
            for line in render_settings(&store.snapshot()) {
                println!("{line}");
            }
        }
        ConfigCommand::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            store
                .set(key, value)
                .with_context(|| format!("save setting '{key}'"))?;
            println!("{key} updated");
        }
    }
    Ok(())
}

/// `key = value` lines, with credentials masked.
pub fn render_settings(settings: &AppSettings) -> Vec<String> {
    SettingKey::ALL
        .into_iter()
        .map(|key| {
            let value = settings.get(key);
            let shown = if key.is_secure() { mask_secret(&value) } else { value };
            format!("{key} = {shown}")
        })
        .collect()
}
