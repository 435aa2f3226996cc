mod cli;
mod config;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use learn_frontend_rs::catalog::parse_rows;
use learn_frontend_rs::export::{export_markdown, randomize};
use learn_frontend_rs::filter::compute_visible;
use learn_frontend_rs::{
    Catalog, CatalogLoader, ProgressStore, ProgressSummary, ProgressTracker, QuestionRecord,
    Source, StaticCatalog, SupabaseCatalog,
};
use stash::FileStore;

async fn load_records(catalog_file: Option<&Path>) -> anyhow::Result<Vec<QuestionRecord>> {
    match catalog_file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let rows: Vec<serde_json::Value> = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a JSON array of rows", path.display()))?;
            let loader = StaticCatalog::new(parse_rows(rows));
            Ok(loader.load().await?)
        }
        None => {
            let config = config::supabase_config_from_env()?;
            log::debug!("Fetching questions from {}", config.rows_url());
            SupabaseCatalog::new(config)
                .load()
                .await
                .context("Failed to fetch questions")
        }
    }
}

fn print_question(record: &QuestionRecord) {
    println!("# {}", record.question);
    println!();
    println!("{} | {} | {}", record.category, record.level, record.domain);
    println!();
    println!("{}", record.answer);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    let criteria = cli.filters.criteria()?;
    let tab = Source::from(cli.filters.tab);

    let storage = FileStore::new(&cli.progress_dir)
        .with_context(|| format!("Failed to open {}", cli.progress_dir.display()))?;
    let mut progress = ProgressStore::load(Box::new(storage));

    match &cli.command {
        Commands::Star { id } => {
            let id = cli::parse_id(id);
            let starred = progress.toggle_star(&id);
            println!("{id} {}", if starred { "starred" } else { "unstarred" });
            return Ok(());
        }
        Commands::Read { id } => {
            let id = cli::parse_id(id);
            let read = progress.toggle_read(&id);
            println!("{id} {}", if read { "marked read" } else { "marked unread" });
            return Ok(());
        }
        Commands::Export { .. } | Commands::Random | Commands::Summary => {}
    }

    let catalog = Catalog::new(load_records(cli.catalog.as_deref()).await?);
    log::info!("Loaded {} questions", catalog.len());
    let visible = compute_visible(catalog.partition(tab), progress.state(), &criteria);

    match cli.command {
        Commands::Export { out } => {
            let today = chrono::Local::now().date_naive();
            let Some(document) = export_markdown(visible.iter().copied(), tab, today) else {
                anyhow::bail!("No questions match the filters, nothing to export");
            };
            std::fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let path = out.join(&document.file_name);
            std::fs::write(&path, document.bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} questions to {}", visible.len(), path.display());
        }
        Commands::Random => match randomize(&visible, &mut rand::rng()) {
            Some(record) => print_question(record),
            None => anyhow::bail!("No questions match the filters"),
        },
        Commands::Summary => {
            let summary = ProgressSummary::for_records(catalog.partition(tab), progress.state());
            println!(
                "{tab}: {mastered}/{total} mastered ({percent:.0}%), {starred} starred, {visible} visible",
                mastered = summary.mastered,
                total = summary.total,
                percent = summary.mastered_percent,
                starred = summary.starred,
                visible = visible.len(),
            );
        }
        Commands::Star { .. } | Commands::Read { .. } => {}
    }
    Ok(())
}
