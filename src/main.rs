//! Command-line front end for the investment registry.
//!
//! Works against whichever backend `STORAGE` (or `--storage`) selects.
//!
//! # Usage
//!
//! ```bash
//! # List clients, sorted by name, second page of 20
//! investment-registry client list --sort-by name --page 2 --page-size 20
//!
//! # Filter securities by type and income
//! investment-registry security list --type bond --income-min 6 --sort-by income --order desc
//!
//! # Add from flags (missing fields are prompted for) or from a `;`-separated record
//! investment-registry client add --name "Ivanov Ivan" --type-of-property ООО --address Moscow --phone 89991234567
//! investment-registry investment add --record "0;1;2;1000;2024-01-15;"
//!
//! # Edit, delete, export
//! investment-registry security edit 3 --income 7.5
//! investment-registry client delete 4
//! investment-registry client export backup/clients.yaml --sort-by-name
//!
//! # Database maintenance
//! investment-registry db check
//! investment-registry db migrate
//! ```

use investment_registry::application::{ClientForm, InvestmentForm, SecurityForm};
use investment_registry::config::Config;
use investment_registry::domain::entities::{
    Client, ClientShort, Entity, Investment, InvestmentShort, Security, SecurityShort,
};
use investment_registry::domain::pagination::total_pages;
use investment_registry::domain::repositories::{
    ClientQuery, InvestmentQuery, ListQuery, Repository, SecurityQuery,
};
use investment_registry::infrastructure::database;
use investment_registry::infrastructure::factory::StorageKind;
use investment_registry::infrastructure::persistence::{FileFormat, write_collection};
use investment_registry::state::AppState;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use validator::ValidationErrors;

/// Registry of clients, securities and investments.
#[derive(Parser)]
#[command(name = "investment-registry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend: db, json or yaml (overrides STORAGE)
    #[arg(long, global = true)]
    storage: Option<StorageKind>,

    /// Directory with entity files (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage clients
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },

    /// Manage securities
    Security {
        #[command(subcommand)]
        action: SecurityAction,
    },

    /// Manage investments
    Investment {
        #[command(subcommand)]
        action: InvestmentAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Paging and ordering shared by every `list` command.
#[derive(Args)]
struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: i64,

    /// Items per page
    #[arg(long, default_value_t = 10)]
    page_size: i64,

    /// Field to sort by
    #[arg(long, default_value = "")]
    sort_by: String,

    /// Sort order: asc or desc
    #[arg(long, default_value = "asc")]
    order: String,
}

/// Arguments shared by every `export` command.
#[derive(Args)]
struct ExportArgs {
    /// Target file; `.json`, `.yaml` or `.yml`
    path: PathBuf,

    /// Sort by name before writing
    #[arg(long)]
    sort_by_name: bool,

    /// With --sort-by-name, sort descending
    #[arg(long)]
    desc: bool,
}

/// Client fields; anything left out is prompted for on `add`.
#[derive(Args)]
struct ClientFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    type_of_property: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Subcommand)]
enum ClientAction {
    /// List clients
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Organizational form contains (case-sensitive)
        #[arg(long = "type", default_value = "")]
        type_of_property: String,
        /// Name contains (case-insensitive)
        #[arg(long, default_value = "")]
        name: String,
        /// Phone contains
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Show one client
    Show { id: i64 },
    /// Add a client
    Add {
        #[command(flatten)]
        fields: ClientFields,
        /// `id;name;type_of_property;address;phone` (id is reassigned)
        #[arg(long, conflicts_with_all = ["name", "type_of_property", "address", "phone"])]
        record: Option<String>,
    },
    /// Edit a client; only the given fields change
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ClientFields,
    },
    /// Delete a client
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Write all clients to another file
    Export(ExportArgs),
}

#[derive(Args)]
struct SecurityFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    security_type: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    income: Option<String>,
}

#[derive(Subcommand)]
enum SecurityAction {
    /// List securities
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Name contains (case-insensitive)
        #[arg(long, default_value = "")]
        name: String,
        /// Type contains (case-insensitive)
        #[arg(long = "type", default_value = "")]
        security_type: String,
        /// Minimum income, inclusive
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        income_min: String,
        /// Maximum income, inclusive
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        income_max: String,
    },
    /// Show one security
    Show { id: i64 },
    /// Add a security
    Add {
        #[command(flatten)]
        fields: SecurityFields,
        /// `id;name;security_type;income` (id is reassigned)
        #[arg(long, conflicts_with_all = ["name", "security_type", "income"])]
        record: Option<String>,
    },
    /// Edit a security; only the given fields change
    Edit {
        id: i64,
        #[command(flatten)]
        fields: SecurityFields,
    },
    /// Delete a security
    Delete {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Write all securities to another file
    Export(ExportArgs),
}

#[derive(Args)]
struct InvestmentFields {
    #[arg(long)]
    client_id: Option<String>,
    #[arg(long)]
    security_id: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,
    /// YYYY-MM-DD, empty for an open position
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    result: Option<String>,
}

#[derive(Subcommand)]
enum InvestmentAction {
    /// List investments
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        client_id: Option<i64>,
        #[arg(long)]
        security_id: Option<i64>,
    },
    /// Show one investment
    Show { id: i64 },
    /// Add an investment
    Add {
        #[command(flatten)]
        fields: InvestmentFields,
        /// `id;client_id;security_id;amount;start_date;end_date[;result]` (id is reassigned)
        #[arg(long, conflicts_with_all = ["client_id", "security_id", "amount", "start_date", "end_date", "result"])]
        record: Option<String>,
    },
    /// Edit an investment; only the given fields change
    Edit {
        id: i64,
        #[command(flatten)]
        fields: InvestmentFields,
    },
    /// Delete an investment
    Delete {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Write all investments to another file
    Export(ExportArgs),
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env(cli.storage)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.validate()?;

    init_tracing(&config);
    config.print_summary();

    let state = AppState::build(&config).await?;
    let outcome = run(cli.command, &state).await;
    state.shutdown().await;

    outcome
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(command: Commands, state: &AppState) -> Result<()> {
    match command {
        Commands::Client { action } => handle_client_action(action, state).await,
        Commands::Security { action } => handle_security_action(action, state).await,
        Commands::Investment { action } => handle_investment_action(action, state).await,
        Commands::Db { action } => handle_db_action(action, state).await,
    }
}

/// Prompts for a field that was not given on the command line.
fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
    }
}

async fn handle_client_action(action: ClientAction, state: &AppState) -> Result<()> {
    let repo = state.clients.as_ref();

    match action {
        ClientAction::List {
            list,
            type_of_property,
            name,
            phone,
        } => {
            let query = ClientQuery {
                type_of_property,
                name,
                phone,
                sort_by: list.sort_by.clone(),
                order: list.order.clone(),
            };
            list_page(repo, &query, &list).await
        }
        ClientAction::Show { id } => show(repo, id).await,
        ClientAction::Add { fields, record } => {
            let client = match record {
                Some(line) => Client::from_delimited(&line)?,
                None => {
                    let form = ClientForm {
                        name: value_or_prompt(fields.name, "Name")?,
                        type_of_property: value_or_prompt(
                            fields.type_of_property,
                            "Type of property",
                        )?,
                        address: value_or_prompt(fields.address, "Address")?,
                        phone: value_or_prompt(fields.phone, "Phone")?,
                    };
                    validated(form.build(0))?
                }
            };
            add(repo, client).await
        }
        ClientAction::Edit { id, fields } => {
            let current = find(repo, id).await?;
            let mut form = ClientForm::from(&current);
            merge(&mut form.name, fields.name);
            merge(&mut form.type_of_property, fields.type_of_property);
            merge(&mut form.address, fields.address);
            merge(&mut form.phone, fields.phone);
            replace(repo, id, validated(form.build(id))?).await
        }
        ClientAction::Delete { id, yes } => delete(repo, id, yes).await,
        ClientAction::Export(args) => export(repo, &args).await,
    }
}

async fn handle_security_action(action: SecurityAction, state: &AppState) -> Result<()> {
    let repo = state.securities.as_ref();

    match action {
        SecurityAction::List {
            list,
            name,
            security_type,
            income_min,
            income_max,
        } => {
            let query = SecurityQuery {
                name,
                security_type,
                income_min,
                income_max,
                sort_by: list.sort_by.clone(),
                order: list.order.clone(),
            };
            list_page(repo, &query, &list).await
        }
        SecurityAction::Show { id } => show(repo, id).await,
        SecurityAction::Add { fields, record } => {
            let security = match record {
                Some(line) => Security::from_delimited(&line)?,
                None => {
                    let form = SecurityForm {
                        name: value_or_prompt(fields.name, "Name")?,
                        security_type: value_or_prompt(fields.security_type, "Type")?,
                        income: value_or_prompt(fields.income, "Income")?,
                    };
                    validated(form.build(0))?
                }
            };
            add(repo, security).await
        }
        SecurityAction::Edit { id, fields } => {
            let current = find(repo, id).await?;
            let mut form = SecurityForm::from(&current);
            merge(&mut form.name, fields.name);
            merge(&mut form.security_type, fields.security_type);
            merge(&mut form.income, fields.income);
            replace(repo, id, validated(form.build(id))?).await
        }
        SecurityAction::Delete { id, yes } => delete(repo, id, yes).await,
        SecurityAction::Export(args) => export(repo, &args).await,
    }
}

async fn handle_investment_action(action: InvestmentAction, state: &AppState) -> Result<()> {
    let repo = state.investments.as_ref();

    match action {
        InvestmentAction::List {
            list,
            client_id,
            security_id,
        } => {
            let query = InvestmentQuery {
                client_id,
                security_id,
                sort_by: list.sort_by.clone(),
                order: list.order.clone(),
            };
            list_page(repo, &query, &list).await
        }
        InvestmentAction::Show { id } => show(repo, id).await,
        InvestmentAction::Add { fields, record } => {
            let investment = match record {
                Some(line) => Investment::from_delimited(&line)?,
                None => {
                    let form = InvestmentForm {
                        client_id: value_or_prompt(fields.client_id, "Client id")?,
                        security_id: value_or_prompt(fields.security_id, "Security id")?,
                        amount: value_or_prompt(fields.amount, "Amount")?,
                        start_date: value_or_prompt(fields.start_date, "Start date (YYYY-MM-DD)")?,
                        end_date: fields.end_date.unwrap_or_default(),
                        result: fields.result.unwrap_or_default(),
                    };
                    validated(form.build(0))?
                }
            };
            add(repo, investment).await
        }
        InvestmentAction::Edit { id, fields } => {
            let current = find(repo, id).await?;
            let mut form = InvestmentForm::from(&current);
            merge(&mut form.client_id, fields.client_id);
            merge(&mut form.security_id, fields.security_id);
            merge(&mut form.amount, fields.amount);
            merge(&mut form.start_date, fields.start_date);
            merge(&mut form.end_date, fields.end_date);
            merge(&mut form.result, fields.result);
            replace(repo, id, validated(form.build(id))?).await
        }
        InvestmentAction::Delete { id, yes } => delete(repo, id, yes).await,
        InvestmentAction::Export(args) => export(repo, &args).await,
    }
}

fn merge(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Prints every field error and turns them into a single failure.
fn validated<E>(result: Result<E, ValidationErrors>) -> Result<E> {
    result.map_err(|errors| {
        println!("{}", "❌ Invalid input:".red().bold());
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, failures) in &fields {
            for failure in failures.iter() {
                let message = failure.message.as_deref().unwrap_or("is invalid");
                println!("  {}: {}", field.bright_white(), message.red());
            }
        }
        println!();
        anyhow::anyhow!("{} field(s) failed validation", fields.len())
    })
}

/// A short projection rendered as one table row.
trait TableRow {
    const HEADER: &'static [(&'static str, usize)];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for ClientShort {
    const HEADER: &'static [(&'static str, usize)] =
        &[("ID", 5), ("Name", 28), ("Type", 20), ("Phone", 12)];

    fn cells(&self) -> Vec<String> {
        vec![
            self.client_id.to_string(),
            self.short_name.clone(),
            self.type_of_property.clone(),
            self.phone.clone(),
        ]
    }
}

impl TableRow for SecurityShort {
    const HEADER: &'static [(&'static str, usize)] =
        &[("ID", 5), ("Name", 20), ("Type", 16), ("Income", 10)];

    fn cells(&self) -> Vec<String> {
        vec![
            self.security_id.to_string(),
            self.short_name.clone(),
            self.security_type.clone(),
            self.income.to_string(),
        ]
    }
}

impl TableRow for InvestmentShort {
    const HEADER: &'static [(&'static str, usize)] =
        &[("ID", 5), ("Client", 8), ("Security", 9), ("Amount", 14)];

    fn cells(&self) -> Vec<String> {
        vec![
            self.investment_id.to_string(),
            self.client_id.to_string(),
            self.security_id.to_string(),
            self.amount.to_string(),
        ]
    }
}

fn format_row(widths: &[(&str, usize)], cells: &[String]) -> String {
    widths
        .iter()
        .zip(cells)
        .map(|((_, w), cell)| format!("{:<w$}", cell, w = *w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lists one page of a filtered, sorted view.
///
/// # Output Format
///
/// ```text
/// 📋 clients (page 1 of 3, 25 total)
///
///   ID    Name                         Type                 Phone
///   ───────────────────────────────────────────────────────────────────────
///   2     Antonov A.                   ИП                   79990001122
/// ```
async fn list_page<E, Q>(repo: &dyn Repository<E>, query: &Q, list: &ListArgs) -> Result<()>
where
    E: Entity,
    E::Short: TableRow,
    Q: ListQuery<E>,
{
    let view = query.apply(repo);

    let total = view.get_count().await?;
    let page = view
        .get_page(list.page_size, list.page)
        .await?
        .context("--page and --page-size must be positive")?;

    println!(
        "{} {} (page {} of {}, {} total)",
        "📋".bright_blue(),
        E::COLLECTION.bright_blue().bold(),
        list.page,
        total_pages(total, list.page_size).max(1),
        total
    );
    println!();

    if page.is_empty() {
        println!("{}", "  Nothing found".yellow());
        println!();
        return Ok(());
    }

    let columns = <E::Short as TableRow>::HEADER;
    let header: Vec<String> = columns.iter().map(|(h, _)| h.to_string()).collect();
    println!("  {}", format_row(columns, &header).bright_white().bold());
    println!("  {}", "─".repeat(75).bright_black());

    for row in &page {
        println!("  {}", format_row(columns, &row.cells()));
    }
    println!();

    Ok(())
}

async fn find<E: Entity>(repo: &dyn Repository<E>, id: i64) -> Result<E> {
    repo.get_by_id(id)
        .await?
        .with_context(|| format!("{} #{id} not found", E::KIND))
}

async fn show<E: Entity + Display>(repo: &dyn Repository<E>, id: i64) -> Result<()> {
    let entity = find(repo, id).await?;
    println!("{}", entity.to_string().cyan());
    Ok(())
}

async fn add<E: Entity + Display>(repo: &dyn Repository<E>, mut entity: E) -> Result<()> {
    repo.add(&mut entity)
        .await
        .with_context(|| format!("Failed to add {}", E::KIND))?;

    println!(
        "{} {} #{} added",
        "✅".green(),
        E::KIND,
        entity.id().to_string().bright_white().bold()
    );
    println!("  {}", entity.to_string().cyan());
    Ok(())
}

async fn replace<E: Entity + Display>(repo: &dyn Repository<E>, id: i64, entity: E) -> Result<()> {
    let shown = entity.to_string();
    repo.replace(id, entity)
        .await
        .with_context(|| format!("Failed to update {} #{id}", E::KIND))?;

    println!("{} {} #{} updated", "✅".green(), E::KIND, id);
    println!("  {}", shown.cyan());
    Ok(())
}

/// Deletes after showing the entity and asking for confirmation (default: No).
async fn delete<E: Entity + Display>(repo: &dyn Repository<E>, id: i64, yes: bool) -> Result<()> {
    let entity = find(repo, id).await?;
    println!("  {}", entity.to_string().cyan());
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete this {}?", E::KIND))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.delete(id)
        .await
        .with_context(|| format!("Failed to delete {} #{id}", E::KIND))?;

    println!("{} {} #{} deleted", "✅".green(), E::KIND, id);
    Ok(())
}

/// Reloads the collection, optionally sorts it by name, and writes it to `args.path`.
async fn export<E: Entity>(repo: &dyn Repository<E>, args: &ExportArgs) -> Result<()> {
    let format = export_format(&args.path)?;

    repo.read_all().await?;
    if args.sort_by_name {
        repo.sort_by_name(args.desc).await?;
    }
    let items = repo.snapshot().await;

    write_collection(&args.path, format, &items).await?;

    println!(
        "{} {} {} written to {}",
        "✅".green(),
        items.len().to_string().bright_white().bold(),
        E::COLLECTION,
        args.path.display().to_string().cyan()
    );
    Ok(())
}

fn export_format(path: &Path) -> Result<FileFormat> {
    FileFormat::from_path(path)
        .with_context(|| format!("Cannot tell format of {}: use .json, .yaml or .yml", path.display()))
}

/// Handles database maintenance commands.
async fn handle_db_action(action: DbAction, state: &AppState) -> Result<()> {
    let pool = state
        .pool
        .as_deref()
        .context("db commands require STORAGE=db")?;

    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🔧 Applying migrations...".bright_blue());

            database::migrate(pool).await?;

            println!("{}", "✅ Database is up to date".green().bold());
        }
    }

    Ok(())
}
