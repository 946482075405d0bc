use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use custom_commands::application::errors::{BotError, StorageError};
use custom_commands::application::messaging::MessageDispatcher;
use custom_commands::application::services::{self, DecodedEntry, NewCommand};
use custom_commands::domain::entities::{Message, TriggerType, User};
use custom_commands::domain::traits::HashStore;
use custom_commands::infrastructure::adapters::ConsoleAdapter;
use custom_commands::infrastructure::config::{Config, StorageBackend};
use custom_commands::infrastructure::storage::{MemoryStore, SqliteStore};
use custom_commands::plugins::{AdminRegistry, CustomCommandsPlugin};

#[derive(Parser)]
#[command(name = "custom-commands")]
#[command(about = "Per-guild custom trigger/response commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the console bot
    Run,
    /// List a guild's custom commands
    List {
        #[arg(short, long)]
        guild: String,
    },
    /// Add a custom command
    Add {
        #[arg(short, long)]
        guild: String,
        /// command, starts-with, contains, regex or exact
        #[arg(short = 't', long, default_value = "command")]
        trigger_type: TriggerType,
        trigger: String,
        response: String,
        #[arg(long)]
        case_sensitive: bool,
    },
    /// Delete a custom command by id
    Delete {
        #[arg(short, long)]
        guild: String,
        id: u32,
    },
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

    let result = match cli.command {
        Commands::Version => {
            println!("custom-commands v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        command => run_command(load_config(&cli.config), command),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(mut config) => {
                config.apply_env();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn HashStore>, StorageError> {
    match (config.storage.backend, &config.storage.path) {
        (StorageBackend::Sqlite, Some(path)) => {
            tracing::info!("Using sqlite store at {}", path.display());
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        (StorageBackend::Sqlite, None) => Err(StorageError::Unavailable("no sqlite path configured".to_string())),
        (StorageBackend::Memory, _) => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn run_command(config: Config, command: Commands) -> Result<(), BotError> {
    let store = open_store(&config)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async move {
        match command {
            Commands::Run => run_bot(config, store).await,
            Commands::List { guild } => list_commands(store.as_ref(), &guild).await,
            Commands::Add { guild, trigger_type, trigger, response, case_sensitive } => {
                let new = NewCommand { trigger_type, trigger, response, case_sensitive };
                let command = services::add_command(store.as_ref(), &guild, new).await?;
                println!("Added {}", command);
                Ok(())
            }
            Commands::Delete { guild, id } => {
                if services::delete_command(store.as_ref(), &guild, id).await? {
                    println!("Deleted #{}", id);
                } else {
                    println!("No command #{} in guild {}", id, guild);
                }
                Ok(())
            }
            Commands::Version | Commands::InitConfig => Ok(()),
        }
    })
}

async fn list_commands(store: &dyn HashStore, guild: &str) -> Result<(), BotError> {
    let entries = services::get_entries(store, guild).await?;
    if entries.is_empty() {
        println!("No custom commands in guild {}", guild);
        return Ok(());
    }

    for entry in entries {
        match entry {
            DecodedEntry::Valid(command) => println!("{}", command),
            DecodedEntry::Corrupt { field, reason } => println!("(corrupt field {}: {})", field, reason),
        }
    }
    Ok(())
}

async fn run_bot(config: Config, store: Arc<dyn HashStore>) -> Result<(), BotError> {
    tracing::info!("Starting {}", config.bot.name);

    let bot = Arc::new(ConsoleAdapter::new());
    let mut dispatcher = MessageDispatcher::new();
    let mut admin = AdminRegistry::new();
    CustomCommandsPlugin::register(&mut dispatcher, &mut admin, store, bot, &config.bot.prefix);

    tracing::info!(
        "Plugins registered: bot {:?}, web {:?}",
        dispatcher.plugins().names(),
        admin.plugin_names()
    );
    tracing::info!("Reading messages for guild {} from stdin", config.console.guild_id);

    let author = User::new("console-user").with_username("you");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(StorageError::Io)? {
        let message = Message::new(&config.console.channel_id, line)
            .in_guild(&config.console.guild_id)
            .with_author(author.clone());
        dispatcher.dispatch(message).await;
    }

    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| BotError::Internal(format!("Failed to render config: {}", e)))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
