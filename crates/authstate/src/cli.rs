//! CLI module for authstate.
//!
//! Inspects and maintains the `auth_state` table of a SQL backend.
//!
//! # Usage
//!
//! ```bash
//! # Create the table
//! authstate init -d sqlite:auth.db
//!
//! # List the keys stored for an identity
//! authstate list -d sqlite:auth.db --identity 5511999999999
//!
//! # Print one value
//! authstate get -d sqlite:auth.db --identity 5511999999999 creds
//!
//! # Delete one key, or everything stored for an identity
//! authstate delete -d sqlite:auth.db --identity 5511999999999 pre-key-12
//! authstate reset -d sqlite:auth.db --identity 5511999999999
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::codec::JsonCodec;
use crate::config::{AppConfig, LoggingConfig, load_config};
use crate::error::AuthStateError;
use crate::identity::Identity;
use crate::lookup::Lookup;
use crate::sql::SqlStore;
use crate::store::{
    APP_STATE_SYNC_KEY, AuthStateStore, CATEGORY_SEPARATOR, CREDS_KEY, KeyCache, StoreConfig,
    StoredEntry,
};
use crate::traits::KeyStore;

/// Categories a key name may start with, longest first.
const KNOWN_CATEGORIES: &[&str] = &[
    "app-state-sync-version",
    APP_STATE_SYNC_KEY,
    "sender-key-memory",
    "sender-key",
    "pre-key",
    "session",
];

/// Auth state management CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "authstate",
    version,
    about = "Inspect and maintain persisted session auth state"
)]
pub struct AuthStateArgs {
    #[command(subcommand)]
    pub command: AuthStateCommands,
}

/// Connection options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Database connection URL.
    #[arg(short, long, env = "DATABASE_URL")]
    pub database: Option<String>,

    /// Configuration file (.toml or .json).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Auth state CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AuthStateCommands {
    /// Initialize database schema.
    Init {
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// List the keys stored for an identity.
    List {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Phone-number identity.
        #[arg(short, long)]
        identity: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print a stored value.
    Get {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Phone-number identity.
        #[arg(short, long)]
        identity: String,

        /// Key name (e.g. "creds", "pre-key-12").
        key: String,
    },

    /// Delete one key.
    Delete {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Phone-number identity.
        #[arg(short, long)]
        identity: String,

        /// Key name.
        key: String,
    },

    /// Delete every key of an identity.
    Reset {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Phone-number identity.
        #[arg(short, long)]
        identity: String,
    },
}

/// Listing output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Key row for display.
#[derive(Tabled, Serialize)]
struct KeyDisplay {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Size")]
    #[serde(skip)]
    size: String,
    #[tabled(skip)]
    bytes: usize,
}

impl From<&StoredEntry> for KeyDisplay {
    fn from(entry: &StoredEntry) -> Self {
        Self {
            key: entry.key_name.clone(),
            category: category_of(&entry.key_name).to_string(),
            size: format_bytes(entry.value.len()),
            bytes: entry.value.len(),
        }
    }
}

/// Key store opened by the CLI: JSON values, key data passed through as stored.
type CliKeys = AuthStateStore<SqlStore, JsonCodec<Value>>;

/// Connected backend plus the store settings of the `[cache]` section.
struct Backend {
    store: SqlStore,
    settings: StoreConfig,
}

impl Backend {
    /// Create the table when `cache.provision_schema` is set.
    async fn prepare(&self) -> Result<(), AuthStateError> {
        if self.settings.provision_schema {
            self.store.provision().await?;
        }
        Ok(())
    }

    /// Cache-fronted store for `identity`, sized by `cache.capacity`.
    fn keys(self, identity: Identity) -> CliKeys {
        AuthStateStore::new(
            identity,
            self.store,
            Arc::new(JsonCodec::new()),
            Arc::new(|v: Value| v),
            Arc::new(KeyCache::new(self.settings.cache_capacity)),
        )
    }
}

/// Run the auth state CLI with the given arguments.
pub async fn run(args: AuthStateArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AuthStateCommands::Init { conn } => {
            let backend = connect(&conn).await?;
            backend.store.provision().await?;
            println!("Database schema initialized successfully.");
            Ok(())
        }
        AuthStateCommands::List {
            conn,
            identity,
            format,
        } => {
            let identity = Identity::parse(&identity)?;
            let backend = connect(&conn).await?;
            backend.prepare().await?;
            list_keys(&backend.store, &identity, format).await
        }
        AuthStateCommands::Get {
            conn,
            identity,
            key,
        } => {
            let identity = Identity::parse(&identity)?;
            let backend = connect(&conn).await?;
            backend.prepare().await?;
            let keys = backend.keys(identity);
            match keys.get(&key).await {
                Lookup::Found(value) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                    Ok(())
                }
                Lookup::NotFound => Err(format!(
                    "no value stored for {key} (identity {})",
                    keys.identity()
                )
                .into()),
                Lookup::Failed(e) => Err(e.into()),
            }
        }
        AuthStateCommands::Delete {
            conn,
            identity,
            key,
        } => {
            let identity = Identity::parse(&identity)?;
            let backend = connect(&conn).await?;
            backend.prepare().await?;
            let store = backend.store;
            if store.select(&identity, &key).await?.is_none() {
                println!("No value stored for {key}.");
                return Ok(());
            }
            store.delete(&identity, &key).await?;
            info!(identity = %identity, key = %key, "key deleted");
            println!("Deleted {key}.");
            Ok(())
        }
        AuthStateCommands::Reset { conn, identity } => {
            let identity = Identity::parse(&identity)?;
            let backend = connect(&conn).await?;
            backend.prepare().await?;
            let removed = backend.store.delete_all(&identity).await?;
            info!(identity = %identity, removed, "identity reset");
            println!("Deleted {removed} key(s) for identity {identity}.");
            Ok(())
        }
    }
}

/// Load configuration, initialize logging and connect.
async fn connect(conn: &ConnectionArgs) -> Result<Backend, Box<dyn std::error::Error>> {
    let config = match &conn.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    init_tracing(&config.logging);
    open(&config, conn.database.as_deref()).await
}

/// Connect with the `[database]` settings and keep the `[cache]` ones.
async fn open(
    config: &AppConfig,
    url_override: Option<&str>,
) -> Result<Backend, Box<dyn std::error::Error>> {
    let sql = config.database.sql_config(url_override)?;
    Ok(Backend {
        store: SqlStore::connect(&sql).await?,
        settings: config.cache.store_config(),
    })
}

async fn list_keys(
    store: &SqlStore,
    identity: &Identity,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = store.entries(identity).await?;

    if entries.is_empty() {
        println!("No keys found for identity {identity}.");
        return Ok(());
    }

    let rows: Vec<KeyDisplay> = entries.iter().map(KeyDisplay::from).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => {
            println!("key,category,bytes");
            for row in rows {
                println!("{},{},{}", row.key, row.category, row.bytes);
            }
        }
        OutputFormat::Table => println!("{}", Table::new(rows)),
    }

    Ok(())
}

/// Category of a key name, e.g. `pre-key` for `pre-key-12`.
fn category_of(key_name: &str) -> &str {
    if key_name == CREDS_KEY {
        return CREDS_KEY;
    }
    KNOWN_CATEGORIES
        .iter()
        .copied()
        .find(|category| {
            key_name
                .strip_prefix(category)
                .is_some_and(|rest| rest.starts_with(CATEGORY_SEPARATOR))
        })
        .unwrap_or("-")
}

/// Format bytes to human readable string.
#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Install the global tracing subscriber.
fn init_tracing(config: &LoggingConfig) {
    // Build the env filter from base level and per-module filters
    let base_level = config.level.as_deref().unwrap_or("warn");
    let mut filter_str = base_level.to_string();

    for (module, level) in &config.filters {
        filter_str.push(',');
        filter_str.push_str(module);
        filter_str.push('=');
        filter_str.push_str(level);
    }

    let filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new("warn"));

    let format = config.format.as_deref().unwrap_or("pretty");
    let output = config.output.as_deref().unwrap_or("stderr");

    // A subscriber may already be installed by an embedding binary.
    let _ = match (format, output) {
        ("json", "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stdout))
            .try_init(),
        ("json", _) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        ("compact", "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stdout))
            .try_init(),
        ("compact", _) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr))
            .try_init(),
        (_, "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stdout))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .try_init(),
    };
}
