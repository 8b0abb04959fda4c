//! Course catalog harvester
//!
//! Scrapes every course from the catalog through a WebDriver browser, then
//! embeds each course with Vertex AI and upserts it into Pinecone.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use harvester::pipeline::{index_records, EmbeddingPipeline, IngestReport, MetadataOptions, UpsertSink};
use harvester::surfaces::{WebDriverConfig, WebDriverSurface};
use harvester::{CourseRecord, FieldExtractor, TraversalConfig, TraversalEngine, TraversalReport};
use pinecone_client::PineconeClient;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vertex_client::{ServiceAccountAuth, ServiceAccountKey, VertexClient};

use crate::config::{Config, IndexingConfig, KeySource};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Scrape the course catalog and index it for semantic search")]
struct Cli {
    /// Visit at most this many courses (0 = all)
    #[arg(long)]
    max_courses: Option<usize>,

    /// Scrape only; skip embedding and upserting
    #[arg(long)]
    scrape_only: bool,

    /// Write scraped records to this file as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

type Indexer = (EmbeddingPipeline<ServiceAccountAuth, VertexClient>, UpsertSink<PineconeClient>);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env(cli.scrape_only).context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Indexing setup must succeed before any browsing starts
    let indexer = match &config.indexing {
        Some(indexing) => Some(build_indexer(indexing).await?),
        None => None,
    };

    let report = scrape(&config, cli.max_courses.or(config.max_courses)).await?;

    if let Some(path) = &cli.output {
        write_records(path, &report.records)?;
        tracing::info!(path = %path.display(), count = report.records.len(), "Wrote records");
    }

    let ingest = match &indexer {
        Some((pipeline, sink)) => Some(index_records(&report.records, pipeline, sink).await),
        None => None,
    };

    print_summary(&report, ingest.as_ref());
    Ok(())
}

async fn build_indexer(config: &IndexingConfig) -> Result<Indexer> {
    let key = match &config.key_source {
        KeySource::File(path) => ServiceAccountKey::from_file(path)
            .with_context(|| format!("Failed to load service account key {}", path.display()))?,
        KeySource::Env { email, private_key } => {
            ServiceAccountKey::new(email.clone(), private_key.expose())
        }
    };

    let project_id = config
        .project_id
        .clone()
        .or_else(|| key.project_id.clone())
        .context("GCP_PROJECT_ID must be set")?;
    let embedder = VertexClient::new(project_id, &config.location, &config.model);

    let mut index = PineconeClient::new(config.pinecone_api_key.expose());
    if let Some(host) = &config.pinecone_host {
        index = index.with_host(host);
    }
    if let Some(namespace) = &config.namespace {
        index = index.with_namespace(namespace);
    }
    let index = index
        .connect(&config.index_name)
        .await
        .with_context(|| format!("Failed to resolve Pinecone index {}", config.index_name))?;

    tracing::info!(
        model = %config.model,
        index = %config.index_name,
        account = %key.client_email,
        "Indexing configured"
    );

    let pipeline = EmbeddingPipeline::new(ServiceAccountAuth::new(key), embedder);
    let sink = UpsertSink::new(index)
        .with_options(MetadataOptions::default().with_level_fields(config.level_metadata));
    Ok((pipeline, sink))
}

async fn scrape(config: &Config, max_courses: Option<usize>) -> Result<TraversalReport> {
    let extractor = FieldExtractor::with_defaults().context("Invalid extraction patterns")?;

    let surface = WebDriverSurface::connect(
        WebDriverConfig::new(&config.webdriver_url).with_headless(config.headless),
    )
    .await
    .with_context(|| format!("Failed to start browser session at {}", config.webdriver_url))?;

    let engine = TraversalEngine::new(
        surface,
        extractor,
        TraversalConfig::new(&config.catalog_url).with_max_courses(max_courses),
    );
    let result = engine.run().await;

    if let Err(e) = engine.into_surface().close().await {
        tracing::warn!(error = %e, "Failed to close browser session");
    }

    result.context("Failed to open the course catalog")
}

fn write_records(path: &Path, records: &[CourseRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize records")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_summary(report: &TraversalReport, ingest: Option<&IngestReport>) {
    println!();
    println!("{}", "Harvest summary".bright_blue().bold());
    println!("  Courses listed:   {}", report.entry_count);
    println!("  Visited:          {}", report.visited);
    println!("  Scraped:          {}", report.records.len().to_string().green());
    println!("  Failed:           {}", count(report.failed_count()));
    println!("  Recovery faults:  {}", count(report.recovery_faults));

    if let Some(ingest) = ingest {
        println!("  Upserted:         {}", ingest.upserted.to_string().green());
        println!("  Upsert failures:  {}", count(ingest.failed_count()));
    }

    let clean = report.failed_count() == 0
        && report.recovery_faults == 0
        && ingest.map_or(true, |i| i.failed_count() == 0);
    println!();
    if clean {
        println!("{}", "Done.".bright_green().bold());
    } else {
        println!("{}", "Done with errors; see log for details.".yellow().bold());
    }
}

fn count(n: usize) -> colored::ColoredString {
    if n == 0 {
        n.to_string().normal()
    } else {
        n.to_string().red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extractor_builds() {
        assert!(FieldExtractor::with_defaults().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_webdriver_fails_before_traversal() {
        let config = Config::from_vars(
            |name| (name == "WEBDRIVER_URL").then(|| "http://127.0.0.1:9".to_string()),
            true,
        )
        .unwrap();

        let err = scrape(&config, None).await.unwrap_err();
        assert!(err.to_string().contains("Failed to start browser session"));
    }
}
