//! Delete mapped event-type definitions matching the include filter.

use futures::StreamExt;

use remap_api::event::EventState;
use remap_engine::config::RemapConfig;
use remap_platform::client::PlatformClient;

use super::error::RemapError;

pub async fn run(
    cfg: &RemapConfig,
    client: &PlatformClient,
    force: bool,
) -> Result<(), RemapError> {
    let summaries = client.list_event_types().await?;
    let selected = super::select(&summaries, &cfg.run, |s| s == EventState::Mapped);
    tracing::info!(count = selected.len(), "event types selected for purge");

    if !force {
        for summary in &selected {
            tracing::info!(event_type = %summary.name, "would delete (pass --force to apply)");
        }
        return Ok(());
    }

    futures::stream::iter(selected)
        .for_each_concurrent(cfg.run.concurrency.max(1), |summary| async move {
            match client.delete_event_type(&summary.name).await {
                Ok(()) => tracing::info!(event_type = %summary.name, "deleted"),
                Err(e) => {
                    tracing::error!(event_type = %summary.name, error = %e, "delete failed")
                }
            }
        })
        .await;

    Ok(())
}
