//! Main workflow: map every unmapped event type.

use futures::StreamExt;

use remap_api::event::EventState;
use remap_api::mapping::MappingCommit;
use remap_engine::annotate::{cleanup, map_event_type, MappingProfile};
use remap_engine::config::RemapConfig;
use remap_platform::client::PlatformClient;

use super::error::RemapError;

pub async fn run(cfg: &RemapConfig, client: &PlatformClient) -> Result<(), RemapError> {
    let summaries = client.list_event_types().await?;
    let selected = super::select(&summaries, &cfg.run, |s| s == EventState::Unmapped);
    tracing::info!(count = selected.len(), "event types selected for mapping");

    futures::stream::iter(selected)
        .for_each_concurrent(cfg.run.concurrency.max(1), |summary| async move {
            if let Err(e) = map_one(cfg, client, &summary.name).await {
                tracing::error!(event_type = %summary.name, error = %e, "mapping failed");
            }
        })
        .await;

    Ok(())
}

async fn map_one(
    cfg: &RemapConfig,
    client: &PlatformClient,
    name: &str,
) -> Result<(), RemapError> {
    tracing::info!(event_type = %name, "started");

    let evt = client.event_type(name).await?;
    let mut evt = client.auto_map(&evt).await?;

    let outcome = map_event_type(&cfg.mapper, MappingProfile::Standard, &mut evt);
    cleanup(&mut evt);

    let table = super::destination(cfg, name)?;
    client
        .create_table(&table.schema, &table.table_name, &outcome.columns)
        .await?;

    let commit = MappingCommit {
        name: evt.name.clone(),
        mapping: table,
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
