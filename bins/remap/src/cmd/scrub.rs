//! Drop blacklisted columns from already-mapped event types.

use futures::StreamExt;

use remap_api::event::EventState;
use remap_api::mapping::MappingCommit;
use remap_engine::annotate::{cleanup, scrub_columns};
use remap_engine::config::RemapConfig;
use remap_platform::client::PlatformClient;

use super::error::RemapError;

pub async fn run(cfg: &RemapConfig, client: &PlatformClient) -> Result<(), RemapError> {
    let summaries = client.list_event_types().await?;
    let selected = super::select(&summaries, &cfg.run, |s| s == EventState::Mapped);
    tracing::info!(count = selected.len(), "event types selected for scrubbing");

    futures::stream::iter(selected)
        .for_each_concurrent(cfg.run.concurrency.max(1), |summary| async move {
            if let Err(e) = scrub_one(cfg, client, &summary.name).await {
                tracing::error!(event_type = %summary.name, error = %e, "scrub failed");
            }
        })
        .await;

    Ok(())
}

async fn scrub_one(
    cfg: &RemapConfig,
    client: &PlatformClient,
    name: &str,
) -> Result<(), RemapError> {
    tracing::info!(event_type = %name, "started");

    let mut evt = client.event_type(name).await?;
    let scrubbed = scrub_columns(&cfg.scrub, &mut evt);
    cleanup(&mut evt);

    if scrubbed == 0 {
        tracing::info!(event_type = %name, "nothing to scrub");
        return Ok(());
    }

    let commit = MappingCommit {
        name: evt.name.clone(),
        mapping: super::destination(cfg, name)?,
        fields: evt.fields,
        mapping_mode: cfg.platform.mapping_mode,
    };
    client.commit_mapping(&commit).await?;

    tracing::info!(event_type = %name, scrubbed, "finished");
    Ok(())
}
