use std::sync::Arc;

use anyhow::Context;
use lighthouse::{
    config::AppConfig,
    db::Db,
    logger::init_tracing,
    mail::{MailDispatcher, MailjetClient},
    monitor::{Monitor, MonitorSettings, run_monitor_loop},
    opensea::OpenSeaClient,
    snapshot::{SnapshotStore, SqlxSnapshotRepository},
};

/// Connects the database, creates the snapshot table if needed and binds
/// the store to the configured partition.
async fn init_store(cfg: &AppConfig) -> anyhow::Result<SnapshotStore> {
    let db = Db::connect(cfg.database_url.expose())
        .await
        .context("failed to connect snapshot database")?;
    db.migrate(&cfg.table_name).await?;

    let repo = Arc::new(SqlxSnapshotRepository::new(db.pool, cfg.table_name.clone()));
    Ok(SnapshotStore::new(repo, cfg.partition_key.clone()))
}

fn init_dispatcher(cfg: &AppConfig) -> anyhow::Result<MailDispatcher> {
    let mailjet = MailjetClient::new(
        cfg.mailjet_base_url.clone(),
        cfg.mailjet_api_key.clone(),
        cfg.mailjet_secret_key.clone(),
        cfg.http_timeout,
    )?;

    Ok(MailDispatcher::new(
        Arc::new(mailjet),
        cfg.mail_from.clone(),
        cfg.mail_to.clone(),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(cfg.json_logs);

    tracing::info!(collection = %cfg.collection_slug, "Starting Lighthouse monitor...");

    let store = init_store(&cfg).await?;
    let source = Arc::new(OpenSeaClient::new(
        cfg.opensea_base_url.clone(),
        &cfg.opensea_api_key,
        cfg.http_timeout,
    )?);
    let dispatcher = init_dispatcher(&cfg)?;

    let monitor = Monitor::new(MonitorSettings::from(&cfg), source, store, dispatcher);

    tokio::select! {
        _ = run_monitor_loop(monitor, cfg.poll_interval) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
