use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use tikwatch_core::AppConfig;
use tikwatch_monitor::{load_state, run_cycle, save_state, ChangeEvent};
use tikwatch_profile::{ProfileClient, ProfileRecord};

#[derive(Debug, Parser)]
#[command(name = "tikwatch-cli")]
#[command(about = "TikTok profile lookup and watch-list tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up one profile and print it.
    Lookup { username: String },
    /// Run watch cycles over the configured watch-list.
    Watch {
        /// Run a single cycle and exit instead of looping.
        #[arg(long)]
        once: bool,
        /// Send detected changes to the configured Telegram chat.
        #[arg(long)]
        notify: bool,
    },
    /// Print the persisted watch state.
    State,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = tikwatch_core::load_app_config_from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup { username } => lookup(&config, &username).await,
        Commands::Watch { once, notify } => watch(&config, once, notify).await,
        Commands::State => show_state(&config),
    }
}

fn build_client(config: &AppConfig) -> anyhow::Result<ProfileClient> {
    Ok(ProfileClient::with_base_url(
        &config.api_key,
        config.request_timeout_secs,
        &config.api_base_url,
        &config.user_agent,
    )?)
}

async fn lookup(config: &AppConfig, username: &str) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let record = client.lookup(username).await?;
    print_record(&record);
    Ok(())
}

fn print_record(record: &ProfileRecord) {
    println!("Username : {}", record.username);
    println!("Nickname : {}", record.nickname);
    println!("Region   : {}", record.region);
    println!("Followers: {}", record.follower_count);
    println!("Following: {}", record.following_count);
    println!(
        "Bio      : {}",
        if record.bio.is_empty() {
            "(empty)"
        } else {
            &record.bio
        }
    );
    println!(
        "Private  : {}",
        if record.is_private { "yes" } else { "no" }
    );
    if let Some(avatar) = &record.avatar_url {
        println!("Avatar   : {avatar}");
    }
    println!("Profile  : {}", record.profile_url());
}

fn print_event(event: &ChangeEvent) {
    if let Some(delta) = &event.followers {
        println!("{}: followers {} -> {}", event.username, delta.old, delta.new);
    }
    if event.bio_changed {
        println!("{}: bio changed", event.username);
    }
}

async fn watch(config: &AppConfig, once: bool, notify: bool) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let watch_list = tikwatch_core::load_watch_list(&config.watchlist_path)?.watch;
    anyhow::ensure!(
        !watch_list.is_empty(),
        "watch-list at {} is empty",
        config.watchlist_path.display()
    );

    let notifier = if notify {
        let chat_id = config.notify_chat_id.ok_or_else(|| {
            anyhow::anyhow!("--notify requires TIKWATCH_NOTIFY_CHAT_ID to be set")
        })?;
        let notifier = tikwatch_notify::Notifier::new(
            config.require_bot_token()?,
            config.request_timeout_secs,
        )?;
        Some((Arc::new(notifier), chat_id))
    } else {
        None
    };

    loop {
        let prior = load_state(&config.state_path)?;
        let outcome = run_cycle(
            &client,
            &watch_list,
            &prior,
            config.max_concurrent_lookups,
        )
        .await;
        save_state(&config.state_path, &outcome.state)?;

        if outcome.events.is_empty() {
            println!(
                "no changes across {} watched account(s){}",
                watch_list.len(),
                if outcome.failed.is_empty() {
                    String::new()
                } else {
                    format!(" ({} lookup(s) failed)", outcome.failed.len())
                }
            );
        }
        for event in &outcome.events {
            print_event(event);
            if let Some((notifier, chat_id)) = &notifier {
                if let Err(err) = notifier.deliver_event(*chat_id, event).await {
                    tracing::error!(username = %event.username, error = %err,
                        "failed to deliver change notification");
                }
            }
        }

        if once {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(config.watch_interval_secs.max(1))).await;
    }
}

fn show_state(config: &AppConfig) -> anyhow::Result<()> {
    let state = load_state(&config.state_path)?;
    if state.is_empty() {
        println!("no watch state at {}", config.state_path.display());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
