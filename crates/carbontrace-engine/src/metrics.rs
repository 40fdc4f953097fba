//! Per-run performance and accounting metrics.
//!
//! [`RunMetrics`] captures timing, ledger growth, and trimming totals for a
//! routing run, so callers can judge how much provenance the threshold
//! discarded.

/// Timing and accounting metrics collected during a routing run.
///
/// All durations are in microseconds. The engine updates these fields as
/// it goes; [`RunOutput`](crate::RunOutput) carries the final values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Number of routing steps performed.
    pub iterations_completed: u32,
    /// Time spent compiling the routing plan, in microseconds.
    pub plan_us: u64,
    /// Cumulative time spent in routing steps, in microseconds.
    pub routing_us: u64,
    /// Time spent trimming and compacting the final ledger, in microseconds.
    pub compaction_us: u64,
    /// Largest ledger entry count observed after any step.
    pub peak_entries: usize,
    /// Number of attributions removed by the final trim.
    pub entries_trimmed: usize,
    /// Total amount removed by the final trim.
    pub mass_trimmed: f64,
    /// Number of attributions in the exported table.
    pub total_sources: usize,
    /// Patches whose displacement exceeds one cell per step.
    pub overshooting_cells: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.iterations_completed, 0);
        assert_eq!(m.plan_us, 0);
        assert_eq!(m.routing_us, 0);
        assert_eq!(m.compaction_us, 0);
        assert_eq!(m.peak_entries, 0);
        assert_eq!(m.entries_trimmed, 0);
        assert_eq!(m.mass_trimmed, 0.0);
        assert_eq!(m.total_sources, 0);
        assert_eq!(m.overshooting_cells, 0);
    }
}
