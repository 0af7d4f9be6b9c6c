use remap_engine::error::EngineError;
use remap_platform::error::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error(
        "event type '{event_type}' has no destination: name carries no schema prefix and no target_schema is configured"
    )]
    NoDestination { event_type: String },
}
