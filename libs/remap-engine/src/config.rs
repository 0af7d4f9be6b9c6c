use serde::Deserialize;

use remap_api::mapping::MappingMode;

use crate::error::EngineError;

/// Root configuration — parsed from TOML.
///
/// One immutable value per process: every threshold, pattern list and key
/// name the engine consults lives here and is passed by reference into the
/// passes. Nothing is read from ambient state.
#[derive(Debug, Clone, Deserialize)]
pub struct RemapConfig {
    pub platform: PlatformConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub mapper: MapperConfig,

    #[serde(default)]
    pub scrub: ScrubConfig,
}

/// Remote platform endpoint and destination settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform REST interface.
    pub base_url: String,

    /// Fixed destination schema. When set, the full event-type name becomes
    /// the table name. When unset, event names carry the destination as
    /// `schema.table`.
    #[serde(default)]
    pub target_schema: Option<String>,

    /// Mapping mode for committed mappings.
    #[serde(default)]
    pub mapping_mode: MappingMode,
}

/// Event-type selection and fan-out settings for a run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Maximum number of event types processed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Event types whose name matches any of these substrings are skipped.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// When non-empty, only event types matching one of these substrings
    /// are processed.
    #[serde(default)]
    pub include: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            exclude: default_exclude(),
            include: Vec::new(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

fn default_exclude() -> Vec<String> {
    strings(&["develop", "other"])
}

/// Rule tables and thresholds for the mapping engine.
#[derive(Debug, Clone, Deserialize)]
pub struct MapperConfig {
    /// Minimum number of global observations before a field is kept.
    #[serde(default = "default_min_occurrence")]
    pub min_occurrence: u64,

    /// Minimum occurrence relative to the event type's total count, percent.
    #[serde(default = "default_min_occurrence_percent")]
    pub min_occurrence_percent: f64,

    /// Minimum number of distinct sample values.
    #[serde(default = "default_min_distinct_samples")]
    pub min_distinct_samples: u64,

    /// Maximum share of a single sample value, percent. Fields dominated by
    /// one value beyond this are near-constant and dropped.
    #[serde(default = "default_max_sample_occurrence_percent")]
    pub max_sample_occurrence_percent: f64,

    /// Columns matching these substrings are discarded outright.
    #[serde(default = "default_discard_patterns")]
    pub discard_patterns: Vec<String>,

    /// High-dispersion numeric fields forced to floating point.
    #[serde(default = "default_force_float_patterns")]
    pub force_float_patterns: Vec<String>,

    /// Large numeric fields forced to 64-bit integers.
    #[serde(default = "default_force_bigint_patterns")]
    pub force_bigint_patterns: Vec<String>,

    /// Fields forced to variable characters regardless of inferred type.
    #[serde(default = "default_force_varchar_patterns")]
    pub force_varchar_patterns: Vec<String>,

    /// Length/truncation applied to every VARCHAR column.
    #[serde(default = "default_varchar_length")]
    pub varchar_length: u32,
    #[serde(default = "default_varchar_truncate")]
    pub varchar_truncate: bool,

    /// Canonical timestamp type (timezone-aware or not).
    #[serde(default = "default_timestamp_type")]
    pub timestamp_type: String,

    /// Identifier columns and the type forced onto them.
    #[serde(default = "default_id_patterns")]
    pub id_patterns: Vec<String>,
    #[serde(default = "default_id_type")]
    pub id_type: String,
    #[serde(default = "default_id_length")]
    pub id_length: u32,
    #[serde(default)]
    pub id_truncate: bool,

    /// Sort-key candidates, assigned indices in document order.
    #[serde(default = "default_sort_key_patterns")]
    pub sort_key_patterns: Vec<String>,
    /// VARCHAR sort keys are narrowed to this length.
    #[serde(default = "default_sort_key_varchar_length")]
    pub sort_key_varchar_length: u32,

    /// Column distributing fact-table rows across nodes (exact name).
    #[serde(default = "default_distribution_key")]
    pub distribution_key: String,

    /// Primary-key column (exact name) and its forced type.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default = "default_primary_key_type")]
    pub primary_key_type: String,
    #[serde(default = "default_primary_key_length")]
    pub primary_key_length: u32,
    #[serde(default)]
    pub primary_key_truncate: bool,

    /// Substring marking platform bookkeeping fields.
    #[serde(default = "default_metadata_marker")]
    pub metadata_marker: String,

    #[serde(default)]
    pub metadata: MetadataRules,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            min_occurrence: default_min_occurrence(),
            min_occurrence_percent: default_min_occurrence_percent(),
            min_distinct_samples: default_min_distinct_samples(),
            max_sample_occurrence_percent: default_max_sample_occurrence_percent(),
            discard_patterns: default_discard_patterns(),
            force_float_patterns: default_force_float_patterns(),
            force_bigint_patterns: default_force_bigint_patterns(),
            force_varchar_patterns: default_force_varchar_patterns(),
            varchar_length: default_varchar_length(),
            varchar_truncate: default_varchar_truncate(),
            timestamp_type: default_timestamp_type(),
            id_patterns: default_id_patterns(),
            id_type: default_id_type(),
            id_length: default_id_length(),
            id_truncate: false,
            sort_key_patterns: default_sort_key_patterns(),
            sort_key_varchar_length: default_sort_key_varchar_length(),
            distribution_key: default_distribution_key(),
            primary_key: default_primary_key(),
            primary_key_type: default_primary_key_type(),
            primary_key_length: default_primary_key_length(),
            primary_key_truncate: false,
            metadata_marker: default_metadata_marker(),
            metadata: MetadataRules::default(),
        }
    }
}

/// Type rules for platform bookkeeping fields, keyed on substrings of the
/// resolved column name or the raw field name. These fields bypass the
/// retention classifier entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataRules {
    #[serde(default = "default_metadata_varchar_patterns")]
    pub varchar_patterns: Vec<String>,
    #[serde(default = "default_metadata_varchar_length")]
    pub varchar_length: u32,
    #[serde(default = "default_metadata_timestamp_patterns")]
    pub timestamp_patterns: Vec<String>,
    #[serde(default = "default_metadata_boolean_patterns")]
    pub boolean_patterns: Vec<String>,
    #[serde(default = "default_metadata_bigint_patterns")]
    pub bigint_patterns: Vec<String>,
}

impl Default for MetadataRules {
    fn default() -> Self {
        Self {
            varchar_patterns: default_metadata_varchar_patterns(),
            varchar_length: default_metadata_varchar_length(),
            timestamp_patterns: default_metadata_timestamp_patterns(),
            boolean_patterns: default_metadata_boolean_patterns(),
            bigint_patterns: default_metadata_bigint_patterns(),
        }
    }
}

/// Blacklist pass over already-mapped trees.
///
/// A mapped column is dropped when its name matches any `blacklist` entry
/// and at least one `require` marker, and no `exempt` marker.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrubConfig {
    #[serde(default = "default_scrub_blacklist")]
    pub blacklist: Vec<String>,
    #[serde(default = "default_scrub_require")]
    pub require: Vec<String>,
    #[serde(default = "default_scrub_exempt")]
    pub exempt: Vec<String>,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            blacklist: default_scrub_blacklist(),
            require: default_scrub_require(),
            exempt: default_scrub_exempt(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_min_occurrence() -> u64 {
    5
}
fn default_min_occurrence_percent() -> f64 {
    1.0
}
fn default_min_distinct_samples() -> u64 {
    2
}
fn default_max_sample_occurrence_percent() -> f64 {
    98.9
}
fn default_discard_patterns() -> Vec<String> {
    strings(&["password", "floor_level", "integrations", "__c"])
}
fn default_force_float_patterns() -> Vec<String> {
    strings(&["geolocation"])
}
fn default_force_bigint_patterns() -> Vec<String> {
    strings(&["geolocation_timestamp"])
}
fn default_force_varchar_patterns() -> Vec<String> {
    strings(&["_id", "version", "timezone", "build"])
}
fn default_varchar_length() -> u32 {
    4096
}
fn default_varchar_truncate() -> bool {
    true
}
fn default_timestamp_type() -> String {
    "TIMESTAMPTZ".into()
}
fn default_id_patterns() -> Vec<String> {
    strings(&["id"])
}
fn default_id_type() -> String {
    "VARCHAR".into()
}
fn default_id_length() -> u32 {
    256
}
fn default_sort_key_patterns() -> Vec<String> {
    strings(&[
        "timestamp",
        "id",
        "user",
        "email",
        "gender",
        "os_name",
        "birthday",
        "created_at",
    ])
}
fn default_sort_key_varchar_length() -> u32 {
    256
}
fn default_distribution_key() -> String {
    "timestamp".into()
}
fn default_primary_key() -> String {
    "message_id".into()
}
fn default_primary_key_type() -> String {
    "CHAR".into()
}
fn default_primary_key_length() -> u32 {
    36
}
fn default_metadata_marker() -> String {
    "_metadata".into()
}
fn default_metadata_varchar_patterns() -> Vec<String> {
    strings(&[
        "_object",
        "_url",
        "_id",
        "uuid",
        "input",
        "type",
        "database",
        "db",
        "collection",
        "table",
        "schema",
        "token",
        "version",
        "client",
    ])
}
fn default_metadata_varchar_length() -> u32 {
    1024
}
fn default_metadata_timestamp_patterns() -> Vec<String> {
    strings(&["timestamp", "updated", "pull_time"])
}
fn default_metadata_boolean_patterns() -> Vec<String> {
    strings(&["deleted"])
}
fn default_metadata_bigint_patterns() -> Vec<String> {
    strings(&["restream_count", "ordinal"])
}
fn default_scrub_blacklist() -> Vec<String> {
    strings(&[
        "age",
        "avatar",
        "birthday",
        "currency",
        "email",
        "fb",
        "gender",
        "itunes",
        "language",
        "locale",
        "_location",
        "name",
        "password",
        "signal",
        "store",
        "timezone",
        "token",
    ])
}
fn default_scrub_require() -> Vec<String> {
    strings(&["traits"])
}
fn default_scrub_exempt() -> Vec<String> {
    strings(&["meta"])
}

impl RemapConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}
