//! Recommit event types stuck between states.
//!
//! Their recorded statistics are stale, so retention runs in the strict
//! profile: only untypeable or blacklisted fields are dropped. No table
//! creation — the destination table already exists.

use futures::StreamExt;

use remap_api::event::EventState;
use remap_api::mapping::MappingCommit;
use remap_engine::annotate::{cleanup, map_event_type, unmapped_columns, MappingProfile};
use remap_engine::config::RemapConfig;
use remap_platform::client::PlatformClient;

use super::error::RemapError;

pub async fn run(cfg: &RemapConfig, client: &PlatformClient) -> Result<(), RemapError> {
    let summaries = client.list_event_types().await?;
    let selected = super::select(&summaries, &cfg.run, |s| {
        s != EventState::Unmapped && s != EventState::Mapped
    });
    tracing::info!(count = selected.len(), "event types selected for repair");

    futures::stream::iter(selected)
        .for_each_concurrent(cfg.run.concurrency.max(1), |summary| async move {
            if let Err(e) = repair_one(cfg, client, &summary.name).await {
                tracing::error!(event_type = %summary.name, error = %e, "repair failed");
            }
        })
        .await;

    Ok(())
}

async fn repair_one(
    cfg: &RemapConfig,
    client: &PlatformClient,
    name: &str,
) -> Result<(), RemapError> {
    tracing::info!(event_type = %name, "started");

    let evt = client.event_type(name).await?;
    for column in unmapped_columns(&evt) {
        tracing::warn!(event_type = %name, column = %column, "field has no mapping");
    }

    let mut evt = client.auto_map(&evt).await?;
    let outcome = map_event_type(&cfg.mapper, MappingProfile::Strict, &mut evt);
    cleanup(&mut evt);

    let commit = MappingCommit {
        name: evt.name.clone(),
        mapping: super::destination(cfg, name)?,
        fields: evt.fields,
        mapping_mode: cfg.platform.mapping_mode,
    };
    client.commit_mapping(&commit).await?;

    tracing::info!(
        event_type = %name,
        columns = outcome.columns.len(),
        discarded = outcome.discarded,
        "finished"
    );
    Ok(())
}
