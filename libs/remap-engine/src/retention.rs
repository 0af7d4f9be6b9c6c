//! Statistics-based retention policy for leaf fields.

use remap_api::event::FieldStats;

use crate::config::MapperConfig;
use crate::naming::contains_any;

/// Rollup of a leaf's observation statistics across all type variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSummary {
    /// Total observation count.
    pub total: u64,
    /// Number of distinct sample values seen with a non-zero count.
    pub distinct: u64,
    /// Largest count recorded for any single sample value.
    pub top: u64,
}

impl StatsSummary {
    pub fn of(stats: Option<&FieldStats>) -> Self {
        let mut summary = StatsSummary::default();
        let Some(stats) = stats else {
            return summary;
        };
        for variant in stats.values() {
            summary.total += variant.count;
            let Some(samples) = variant.samples.as_ref() else {
                continue;
            };
            for sample in samples.values() {
                if sample.count == 0 {
                    continue;
                }
                summary.distinct += 1;
                summary.top = summary.top.max(sample.count);
            }
        }
        summary
    }
}

/// Decide whether a non-metadata leaf is discarded.
///
/// A field is dropped when it is rare (absolutely or relative to the event
/// type's total count), dominated by one near-constant value, carries too
/// few distinct values, or matches a discard pattern — unless its resolved
/// name is the configured primary or distribution key.
///
/// A zero `event_total` disables the relative-occurrence clause; the
/// absolute clauses still apply.
pub fn should_discard(
    mapper: &MapperConfig,
    column_name: &str,
    stats: &StatsSummary,
    event_total: u64,
) -> bool {
    if column_name == mapper.primary_key || column_name == mapper.distribution_key {
        return false;
    }

    let rare = stats.total > 0
        && (stats.total < mapper.min_occurrence
            || (event_total > 0
                && (stats.total as f64 * 100.0 / event_total as f64)
                    < mapper.min_occurrence_percent));

    let dominated = stats.total > 0
        && stats.top > 0
        && (stats.top as f64 * 100.0 / stats.total as f64) > mapper.max_sample_occurrence_percent;

    let few_distinct = stats.distinct > 0 && stats.distinct < mapper.min_distinct_samples;

    rare || dominated || few_distinct || contains_any(column_name, &mapper.discard_patterns)
}
