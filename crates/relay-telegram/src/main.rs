//! Feedback relay bot binary.
//!
//! Start the bot with:
//! ```bash
//! BOT_TOKEN=xxx ADMIN_CHAT_ID=-100123 cargo run -p relay-telegram -- --polling
//! ```

use clap::Parser;
use relay_telegram::{RelayBot, TelegramConfig};
use tracing_subscriber::EnvFilter;

/// Feedback relay bot - forwards user messages to an administrator group
#[derive(Parser, Debug)]
#[command(name = "relay-telegram")]
#[command(about = "Telegram feedback bot relaying user messages to administrators")]
struct Args {
    /// Use long polling instead of the webhook server
    #[arg(long)]
    polling: bool,

    /// Webhook server port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    // RUST_LOG wins over -v
    let filter = match args.verbose {
        0 => "relay_telegram=info,relay_core=info,teloxide=warn",
        1 => "relay_telegram=debug,relay_core=debug,teloxide=info",
        2 => "relay_telegram=trace,relay_core=trace,teloxide=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut config = TelegramConfig::from_env()?;
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    let admin_chat = config.relay.admin_chat;

    let bot = RelayBot::new(config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[relay] Feedback relay bot");
            println!("   Bot: @{}", username);
            println!("   Admin chat: {}", admin_chat);
            println!("   Mode: {}", if args.polling { "polling" } else { "webhook" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("   Press Ctrl+C to stop\n");

    if args.polling {
        bot.run_polling().await?;
    } else {
        bot.run_webhook().await?;
    }

    Ok(())
}
