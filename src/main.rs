//! Ledgerdesk main entry point

mod render;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use ledgerdesk_client::HttpTransport;
use ledgerdesk_config::{Config, ConfigError};
use ledgerdesk_core::{
    EntityCatalog, EntityConfig, ListController, RecordId, ResourceError, ResourceStore, StaticCredential,
};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

const DEFAULT_CONFIG_PATH: &str = "ledgerdesk.yaml";

#[derive(Parser, Debug)]
#[command(name = "ledgerdesk")]
#[command(version = "0.1.0")]
#[command(about = "Master-data console for a finance back office", long_about = None)]
struct Args {
    /// Configuration file path (defaults to ./ledgerdesk.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server-side page limit for the fetch behind each command
    #[arg(long, global = true, value_parser = parse_positive)]
    fetch_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List the resources this console manages
    Resources,
    /// Show one page of a resource
    List {
        resource: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, value_parser = parse_positive)]
        page_size: Option<usize>,
        /// Case-insensitive search over every field
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Create a record
    Create {
        resource: String,
        /// Field assignment, e.g. --set name=Finance (values parse as JSON when they can)
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Update a record
    Update {
        resource: String,
        id: String,
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Delete a record
    Delete {
        resource: String,
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// A count of at least 1
fn parse_positive(input: &str) -> Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// `field=value`; the value is JSON when it parses, else a plain string
fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let (field, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", input))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", input));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {}", path.display())),
        None => match Config::load(DEFAULT_CONFIG_PATH) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Config::default()),
            other => other.with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_PATH)),
        },
    }
}

/// Ask on stdin; anything but y/yes declines
fn prompt(question: &str) -> bool {
    print!("{} [y/N] ", question);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn report(error: ResourceError) -> anyhow::Error {
    anyhow!("{}", error.to_details())
}

struct Console {
    config: Config,
    catalog: EntityCatalog,
    transport: Arc<HttpTransport>,
    credentials: Arc<StaticCredential>,
    fetch_limit: usize,
}

impl Console {
    fn new(config: Config, fetch_limit: Option<usize>) -> anyhow::Result<Self> {
        let transport = HttpTransport::from_config(&config.server).context("Failed to set up HTTP client")?;
        let credentials = StaticCredential::from_token(config.auth.resolve_token());
        Ok(Self {
            catalog: EntityCatalog::from_config(&config),
            transport: Arc::new(transport),
            credentials: Arc::new(credentials),
            fetch_limit: fetch_limit.unwrap_or(config.pagination.fetch_limit),
            config,
        })
    }

    fn entity(&self, name: &str) -> anyhow::Result<EntityConfig> {
        self.catalog.require(name).cloned().map_err(report)
    }

    fn controller(&self, name: &str, page_size: Option<usize>) -> anyhow::Result<ListController> {
        let store = ResourceStore::new(self.entity(name)?, self.transport.clone(), self.credentials.clone())
            .with_fetch_limit(self.fetch_limit);
        let page_size = page_size.unwrap_or(self.config.pagination.page_size);
        Ok(ListController::new(Arc::new(store), page_size))
    }

    fn resources(&self) {
        for entity in self.catalog.iter() {
            println!("{:<20} {:<24} /{}", entity.name, entity.label, entity.endpoint);
        }
    }

    async fn list(&self, name: &str, page: usize, page_size: Option<usize>, query: Option<&str>) -> anyhow::Result<()> {
        let mut controller = self.controller(name, page_size)?;
        controller.refresh().await.map_err(report)?;
        if let Some(query) = query {
            controller.set_filter_query(query);
        }
        controller.go_to_page(page);

        let view = controller.view();
        if page != view.current_page {
            log::warn!("Page {} is out of range; showing page {}", page, view.current_page);
        }
        if !view.rows.is_empty() {
            println!("{}", render::render_table(controller.entity(), &view.rows));
        }
        println!("{}", render::render_footer(&view));
        Ok(())
    }

    async fn create(&self, name: &str, fields: Vec<(String, Value)>) -> anyhow::Result<()> {
        let mut controller = self.controller(name, None)?;
        controller.open_create();
        for (field, value) in fields {
            controller.set_draft_field(&field, value);
        }
        let created = controller.submit().await.map_err(report)?;
        println!("{}", serde_json::to_string_pretty(&created)?);
        Ok(())
    }

    async fn update(&self, name: &str, id: &str, fields: Vec<(String, Value)>) -> anyhow::Result<()> {
        let mut controller = self.controller(name, None)?;
        controller.refresh().await.map_err(report)?;

        let id = RecordId::from(id);
        controller.open_edit_by_id(&id).map_err(|e| {
            anyhow!(
                "{}\nOnly the first {} records are searched; raise --fetch-limit to reach more.",
                e.to_details(),
                self.fetch_limit
            )
        })?;
        for (field, value) in fields {
            controller.set_draft_field(&field, value);
        }
        let updated = controller.submit().await.map_err(report)?;
        println!("{}", serde_json::to_string_pretty(&updated)?);
        Ok(())
    }

    async fn delete(&self, name: &str, id: &str, yes: bool) -> anyhow::Result<()> {
        let mut controller = self.controller(name, None)?;
        let confirm = |question: &str| yes || prompt(question);
        if controller.request_delete(&RecordId::from(id), &confirm).await.map_err(report)? {
            println!("Deleted {} {}", controller.entity().label, id);
        } else {
            println!("Cancelled");
        }
        Ok(())
    }
}

fn init(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, Config::generate_default())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::Init { force } = args.command {
        env_logger::init();
        return init(args.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)), force);
    }

    let config = load_config(args.config.as_ref())?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();
    log::debug!("Using server {}", config.server.base_url);

    let console = Console::new(config, args.fetch_limit)?;
    let rt = Runtime::new()?;

    rt.block_on(async {
        match args.command {
            Command::Init { .. } => Ok(()),
            Command::Resources => {
                console.resources();
                Ok(())
            }
            Command::List { resource, page, page_size, query } => {
                console.list(&resource, page, page_size, query.as_deref()).await
            }
            Command::Create { resource, fields } => console.create(&resource, fields).await,
            Command::Update { resource, id, fields } => console.update(&resource, &id, fields).await,
            Command::Delete { resource, id, yes } => console.delete(&resource, &id, yes).await,
        }
    })
}
