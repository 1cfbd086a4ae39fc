use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use md2discord::bridge::Bridge;
use md2discord::config::Config;
use md2discord::discord::mask_webhook_url;
use md2discord::input::Source;
use md2discord::{clipboard, export};

#[derive(Parser)]
#[command(name = "md2discord", version, about = "Convert Markdown into Discord messages")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert Markdown and print the Discord JSON payloads
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long, conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Write the JSON to discord-messages-<millis>.json
        #[arg(long)]
        save: bool,

        /// Also copy the JSON to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Convert Markdown and post it to a Discord webhook
    Send {
        #[command(flatten)]
        input: InputArgs,

        /// Webhook URL; defaults to DISCORD_WEBHOOK_URL, then the saved one
        #[arg(long)]
        webhook: Option<String>,

        /// Pause between messages in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Manage the saved webhook URL
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Markdown file to read; `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// Footer text added to every embed
    #[arg(long)]
    footer: Option<String>,
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Verify and save a webhook URL
    Set {
        url: String,

        /// Save without checking the URL with Discord
        #[arg(long)]
        no_verify: bool,
    },
    /// Show the saved webhook URL with its token masked
    Show,
    /// Forget the saved webhook URL
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let bridge = Bridge::new(Config::from_env());

    match cli.command {
        Command::Convert {
            input,
            output,
            save,
            copy,
        } => {
            let source = Source::from_arg(input.input.as_deref());
            let result = bridge.convert(&source, input.footer.as_deref()).await?;
            let json = export::to_json(&result.messages)?;

            let target = output.or_else(|| save.then(|| export::default_file_name(Utc::now()).into()));
            match target {
                Some(path) => export::write_json(&path, &result.messages)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }

            if copy {
                clipboard::copy(&json).await?;
            }
        }
        Command::Send {
            input,
            webhook,
            delay_ms,
        } => {
            let webhook_url = bridge.resolve_webhook(webhook.as_deref()).await?;
            let source = Source::from_arg(input.input.as_deref());
            let result = bridge.convert(&source, input.footer.as_deref()).await?;

            if result.messages.is_empty() {
                warn!("Nothing to send");
                return Ok(());
            }

            bridge
                .send(&result, &webhook_url, delay_ms.map(Duration::from_millis))
                .await?;
        }
        Command::Webhook { action } => match action {
            WebhookAction::Set { url, no_verify } => {
                let info = bridge.save_webhook(&url, !no_verify).await?;
                match info {
                    Some(info) => info!(
                        "Webhook verified for channel {} and saved",
                        info.channel_id
                    ),
                    None => info!("Webhook saved without verification"),
                }
            }
            WebhookAction::Show => match bridge.database().await?.webhook_url().await? {
                Some(url) => println!("{}", mask_webhook_url(&url)),
                None => info!("No webhook saved"),
            },
            WebhookAction::Clear => {
                if bridge.database().await?.clear_webhook_url().await? {
                    info!("Saved webhook removed");
                } else {
                    info!("No webhook saved");
                }
            }
        },
    }

    Ok(())
}
