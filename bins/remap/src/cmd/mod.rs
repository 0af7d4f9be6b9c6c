pub mod error;
pub mod map;
pub mod purge;
pub mod repair;
pub mod scrub;

use remap_api::event::{EventState, EventTypeSummary};
use remap_api::mapping::TableRef;
use remap_engine::config::{RemapConfig, RunConfig};
use remap_engine::naming::contains_any;

use self::error::RemapError;

/// Pick the event types a workflow operates on: state predicate first, then
/// the run's exclusion list, then the inclusion list (when non-empty).
pub fn select<'a>(
    summaries: &'a [EventTypeSummary],
    run: &RunConfig,
    wanted: impl Fn(EventState) -> bool,
) -> Vec<&'a EventTypeSummary> {
    summaries
        .iter()
        .filter(|s| wanted(s.state))
        .filter(|s| !contains_any(&s.name, &run.exclude))
        .filter(|s| run.include.is_empty() || contains_any(&s.name, &run.include))
        .collect()
}

/// Destination table for an event type, or a per-event error when the name
/// carries no schema and none is configured.
pub fn destination(cfg: &RemapConfig, event_name: &str) -> Result<TableRef, RemapError> {
    TableRef::resolve(event_name, cfg.platform.target_schema.as_deref()).ok_or_else(|| {
        RemapError::NoDestination {
            event_type: event_name.to_string(),
        }
    })
}
