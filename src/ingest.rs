use anyhow::Context;
use bakery_recommender::domain::ports::RecordStore;
use bakery_recommender::infrastructure::{
    telemetry, AppConfig, InMemoryRecordStore, OpenMode, ServiceContext,
};
use tracing::info;

/// Offline ingestion: `ingest [seed.json]`.
///
/// With a seed file, its records are first written to the Redis record store.
/// Then every stored record is turned into a document, embedded and upserted
/// into the Qdrant collection.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("ingest=debug,bakery_recommender=debug");

    let seed = std::env::args().nth(1);

    let config = AppConfig::load()?;
    let context = ServiceContext::open(config, OpenMode::Ingest).await?;
    let records = context
        .record_store()
        .context("record store not opened for ingestion")?;

    if let Some(path) = seed {
        let seeded = InMemoryRecordStore::from_json_file(&path)?.load_all().await?;
        records.put_all(&seeded).await?;
        info!(path = %path, count = seeded.len(), "seed records stored");
    }

    let report = context.ingestion_service(records).ingest().await?;
    info!(
        loaded = report.loaded,
        indexed = report.indexed,
        skipped = report.skipped,
        "ingestion complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    context.close();
    Ok(())
}
