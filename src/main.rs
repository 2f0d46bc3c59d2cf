use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

use maestro::application::errors::CommandError;
use maestro::domain::traits::{Client, RestApi};
use maestro::infrastructure::adapters::{ConsoleClient, DiscordClient};
use maestro::infrastructure::config::Config;
use maestro::{
    Application, ApplicationOptions, CommandResult, Credentials, FileBasedCommands, FileBasedEvents,
    HandlerCatalog, Interaction, ReplyMessage,
};

/// Token handed to the console client, which never checks it
const CONSOLE_TOKEN: &str = "console";

#[derive(Parser)]
#[command(name = "maestro")]
#[command(about = "A slash-command bot framework", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config; BOT_TOKEN overrides both)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.token) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("maestro v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(),
    }
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        Config::default()
    };

    tracing::info!("Starting maestro: {}", config.application.name);

    let catalog = demo_catalog();
    let mut options = ApplicationOptions::new(config.application.name.clone()).with_settings(config.settings());
    if let Some(intents) = config.intents() {
        options = options.with_intents(intents);
    }
    if let Some(dir) = &config.loaders.commands {
        options = options.with_commands(FileBasedCommands::new(dir, &catalog)?);
    }
    if let Some(dir) = &config.loaders.events {
        options = options.with_events(FileBasedEvents::new(dir, &catalog)?);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (app, credentials) = if config.discord_enabled() {
            let discord = config.adapters.discord.clone().unwrap_or_default();
            let client = Arc::new(
                DiscordClient::with_api_base(discord.api_base).with_gateway_url(discord.gateway_url),
            );
            let rest: Arc<dyn RestApi> = client.clone();
            let app = Application::new(options, client as Arc<dyn Client>, rest);
            (app, Credentials::from_env(token_override.or_else(|| config.discord_token())))
        } else {
            // Run console bot (dev mode)
            let client = Arc::new(ConsoleClient::new());
            let rest: Arc<dyn RestApi> = client.clone();
            let app = Application::new(options, client as Arc<dyn Client>, rest);
            (app, Credentials::explicit(CONSOLE_TOKEN))
        };

        app.on_command_error(|error, interaction, command| {
            tracing::warn!("/{} failed for {}: {}", command.name(), interaction.user(), error);
        });

        app.authorize(&credentials).await?;
        app.run().await?;
        app.deauthorize().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render default config: {}", e),
    }
}

/// Handlers the bundled demo manifests refer to
fn demo_catalog() -> HandlerCatalog {
    let mut catalog = HandlerCatalog::new();
    catalog
        .register_command("ping", ping)
        .register_command("rps", rps)
        .register_command("fail", fail)
        .register_event("log_ready", |app, args| {
            let user = args
                .first()
                .and_then(|ready| ready["user"]["username"].as_str())
                .unwrap_or("unknown");
            tracing::info!("{} is online as @{}", app.name(), user);
        })
        .register_event("log_message", |_app, args| {
            if let Some(content) = args.first().and_then(|m| m["content"].as_str()) {
                tracing::info!("Message: {}", content);
            }
        });
    catalog
}

async fn ping(interaction: Interaction, _app: Application) -> CommandResult {
    interaction.reply("Pong!").await?;
    Ok(())
}

async fn rps(interaction: Interaction, _app: Application) -> CommandResult {
    const MOVES: [&str; 3] = ["Rock", "Paper", "Scissors"];

    let choice = interaction
        .get_string("choice")
        .and_then(|c| MOVES.iter().position(|m| m.eq_ignore_ascii_case(c)))
        .ok_or_else(|| CommandError::InvalidArgs("choose Rock, Paper or Scissors".to_string()))?;
    let bot = (uuid::Uuid::new_v4().as_u128() % 3) as usize;

    let outcome = match (3 + choice - bot) % 3 {
        0 => "It's a tie!",
        1 => "You win!",
        _ => "I win!",
    };
    let content = format!("You chose {}, I chose {}. {}", MOVES[choice], MOVES[bot], outcome);
    interaction.reply(ReplyMessage::new(content)).await?;
    Ok(())
}

async fn fail(_interaction: Interaction, _app: Application) -> CommandResult {
    Err(CommandError::ExecutionFailed("this command always fails".to_string()))
}
