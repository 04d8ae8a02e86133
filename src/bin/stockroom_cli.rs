use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use stockroom_api::{
    config,
    db::{self, DbPool},
    errors::ServiceError,
    import,
    models::stock_item::{ItemKey, StockItem},
    services::StockItemService,
    validation::{self, RecordError, ValidationFailure},
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => handle_migrate(&context).await?,
        Commands::Import(args) => handle_import(&context, args, cli.json).await?,
        Commands::List => handle_list(&context, cli.json).await?,
        Commands::Update(args) => handle_update(&context, args).await?,
        Commands::Delete(args) => handle_delete(&context, args).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "stockroom", about = "Stockroom CLI for stock item maintenance", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Upsert stock items from a CSV file with a header row
    Import(ImportArgs),
    /// List every stock item
    List,
    /// Change the quantity or description of one item
    Update(UpdateArgs),
    /// Remove one item
    Delete(KeyArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// CSV file, e.g. `sku,store,quantity,description`
    file: PathBuf,
    /// Validate the file without writing anything
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
}

#[derive(Args)]
struct KeyArgs {
    #[arg(long)]
    store: String,
    #[arg(long)]
    sku: String,
}

impl KeyArgs {
    fn key(&self) -> ItemKey {
        ItemKey::new(self.store.clone(), self.sku.clone())
    }
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    key: KeyArgs,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,
    /// Set the description to null
    #[arg(long, action = ArgAction::SetTrue)]
    clear_description: bool,
}

impl UpdateArgs {
    fn patch(&self) -> Value {
        let mut patch = Map::new();
        if let Some(quantity) = self.quantity {
            patch.insert("quantity".into(), json!(quantity));
        }
        if let Some(description) = &self.description {
            patch.insert("description".into(), json!(description));
        } else if self.clear_description {
            patch.insert("description".into(), Value::Null);
        }
        Value::Object(patch)
    }
}

#[derive(Serialize)]
struct ImportSummary {
    file: String,
    rows: usize,
    written: usize,
    dry_run: bool,
}

async fn handle_migrate(context: &CliContext) -> Result<()> {
    db::run_migrations(&context.db)
        .await
        .context("failed to run migrations")?;
    println!("Migrations applied");
    Ok(())
}

async fn handle_import(context: &CliContext, args: ImportArgs, json: bool) -> Result<()> {
    let records = import::records_from_path(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    debug!(target: "stockroom_cli", rows = records.len(), "parsed import file");

    let written = if args.dry_run {
        validation::validate_many(&records).map_err(|errors| {
            report_rejections(&errors);
            anyhow!("{} of {} rows are invalid", errors.len(), records.len())
        })?;
        0
    } else {
        match context.stock_items().insert_items(Value::Array(records.clone())).await {
            Ok(written) => written,
            Err(ServiceError::ValidationError(ValidationFailure::Batch(errors))) => {
                report_rejections(&errors);
                return Err(anyhow!(
                    "{} of {} rows are invalid; nothing was imported",
                    errors.len(),
                    records.len()
                ));
            }
            Err(err) => return Err(err).context("import failed"),
        }
    };

    let summary = ImportSummary {
        file: args.file.display().to_string(),
        rows: records.len(),
        written,
        dry_run: args.dry_run,
    };
    if json {
        print_json(&summary)?;
    } else if summary.dry_run {
        println!("{}: {} rows valid, nothing written", summary.file, summary.rows);
    } else {
        println!("{}: {} items created or updated", summary.file, summary.written);
    }
    Ok(())
}

async fn handle_list(context: &CliContext, json: bool) -> Result<()> {
    let items = context
        .stock_items()
        .list_items()
        .await
        .context("failed to list stock items")?;

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No stock items");
    }
    for item in &items {
        render_item(item);
    }
    Ok(())
}

async fn handle_update(context: &CliContext, args: UpdateArgs) -> Result<()> {
    let key = args.key.key();
    context
        .stock_items()
        .update_item(&key, &args.patch())
        .await
        .with_context(|| format!("failed to update {}", key))?;
    println!("Updated {}", key);
    Ok(())
}

async fn handle_delete(context: &CliContext, args: KeyArgs) -> Result<()> {
    let key = args.key();
    context
        .stock_items()
        .delete_item(&key)
        .await
        .with_context(|| format!("failed to delete {}", key))?;
    println!("Deleted {}", key);
    Ok(())
}

fn report_rejections(errors: &[RecordError]) {
    for error in errors {
        eprintln!("- {} => {}", error.input, error.issues);
    }
}

fn render_item(item: &StockItem) {
    match &item.description {
        Some(description) => println!(
            "- {} @ {} • qty {} • {}",
            item.sku, item.store, item.quantity, description
        ),
        None => println!("- {} @ {} • qty {}", item.sku, item.store, item.quantity),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

struct CliContext {
    db: Arc<DbPool>,
    stock_items: StockItemService,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        Ok(Self {
            stock_items: StockItemService::new(db.clone()),
            db,
        })
    }

    fn stock_items(&self) -> &StockItemService {
        &self.stock_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_args(argv: &[&str]) -> UpdateArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Update(args) => args,
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn update_patch_carries_only_given_fields() {
        let args = update_args(&["stockroom", "update", "--store", "S1", "--sku", "A", "--quantity", "4"]);
        assert_eq!(args.patch(), json!({"quantity": 4}));
    }

    #[test]
    fn clear_description_sends_null() {
        let args = update_args(&[
            "stockroom",
            "update",
            "--store",
            "S1",
            "--sku",
            "A",
            "--clear-description",
        ]);
        assert_eq!(args.patch(), json!({"description": null}));
    }

    #[test]
    fn description_and_clear_conflict() {
        let result = Cli::try_parse_from([
            "stockroom",
            "update",
            "--store",
            "S1",
            "--sku",
            "A",
            "--description",
            "x",
            "--clear-description",
        ]);
        assert!(result.is_err());
    }
}
