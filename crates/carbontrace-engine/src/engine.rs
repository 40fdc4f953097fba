//! The flow-routing engine.
//!
//! [`FlowRoutingEngine`] owns a [`LedgerPair`] and a compiled
//! [`RoutingPlan`]. Each [`step`](FlowRoutingEngine::step) rebuilds the
//! staging ledger from the published one by visiting destinations in
//! linear order and gathering their inflows. [`finish`](FlowRoutingEngine::finish)
//! trims the published ledger once and compacts it into a
//! [`CompactedSourceTable`].

use std::time::Instant;

use log::{debug, info};

use carbontrace_core::{Cell, Hydrology};
use carbontrace_ledger::{CompactedSourceTable, LedgerPair, Source, SourceCollection};

use crate::config::RoutingConfig;
use crate::error::RoutingError;
use crate::metrics::RunMetrics;
use crate::plan::RoutingPlan;

/// The artifacts of a finished run.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// The exported attribution table.
    pub table: CompactedSourceTable,
    /// Timing and accounting for the run.
    pub metrics: RunMetrics,
}

/// Iterative provenance router over one hydrology snapshot.
///
/// # Examples
///
/// ```
/// use carbontrace_core::{Cell, HydroGrid};
/// use carbontrace_engine::{FlowRoutingEngine, RoutingConfig};
///
/// // A quarter cell east per step.
/// let hydro = HydroGrid::uniform(3, 3, 0.125, 0.0).unwrap();
/// let mut engine = FlowRoutingEngine::new(&hydro, RoutingConfig::new(1).unwrap()).unwrap();
/// engine.step().unwrap();
///
/// let table = engine.finish().unwrap().table;
/// let centre: Vec<_> = table.sources_at(Cell::new(1, 1)).collect();
/// assert_eq!(centre.len(), 2);
/// ```
#[derive(Debug)]
pub struct FlowRoutingEngine {
    config: RoutingConfig,
    plan: RoutingPlan,
    ledgers: LedgerPair,
    /// Reused per-destination accumulator.
    scratch: SourceCollection,
    metrics: RunMetrics,
}

impl FlowRoutingEngine {
    /// Validate `config`, compile the routing plan, and seed every existing
    /// patch with an identity attribution.
    pub fn new<H: Hydrology + ?Sized>(
        hydrology: &H,
        config: RoutingConfig,
    ) -> Result<Self, RoutingError> {
        config.validate()?;

        let plan_start = Instant::now();
        let plan = RoutingPlan::compile(hydrology, &config)?;
        let plan_us = plan_start.elapsed().as_micros() as u64;

        let ledgers = LedgerPair::seeded(plan.width(), plan.height(), |cell| {
            hydrology.patch_exists(cell)
        })?;

        let metrics = RunMetrics {
            plan_us,
            peak_entries: ledgers.published().entry_count(),
            overshooting_cells: plan.overshooting_cells(),
            ..RunMetrics::default()
        };

        debug!(
            "routing plan: {}x{} grid, {} wet patches, {} inflows",
            plan.width(),
            plan.height(),
            plan.wet_cells(),
            plan.inflow_count()
        );

        Ok(Self {
            config,
            plan,
            ledgers,
            scratch: SourceCollection::new(),
            metrics,
        })
    }

    /// Run one routing step.
    ///
    /// Returns `Ok(false)` without doing anything once the configured
    /// number of iterations has been reached.
    pub fn step(&mut self) -> Result<bool, RoutingError> {
        if self.metrics.iterations_completed >= self.config.iterations {
            return Ok(false);
        }
        let start = Instant::now();

        {
            let mut guard = self.ledgers.begin_pass()?;
            for dest in 0..self.plan.cell_count() {
                let inflows = self.plan.inflows(dest);
                if inflows.is_empty() {
                    continue;
                }
                let mut first = true;
                for inflow in inflows {
                    let sources = guard.previous.sources_at_index(inflow.from as usize);
                    if sources.is_empty() {
                        continue;
                    }
                    if first {
                        self.scratch.assign_scaled(sources, inflow.weight);
                        first = false;
                    } else {
                        self.scratch.add_scaled(sources, inflow.weight);
                    }
                }
                if !first {
                    guard
                        .next
                        .push_cell(self.plan.cell_at(dest), self.scratch.as_slice())?;
                }
            }
        }
        self.ledgers.publish()?;

        let entries = self.ledgers.published().entry_count();
        self.metrics.iterations_completed += 1;
        self.metrics.routing_us += start.elapsed().as_micros() as u64;
        self.metrics.peak_entries = self.metrics.peak_entries.max(entries);
        debug!(
            "iteration {}/{}: {} source entries",
            self.metrics.iterations_completed, self.config.iterations, entries
        );
        Ok(true)
    }

    /// The live attributions of `cell` after the most recent step.
    pub fn sources(&self, cell: Cell) -> &[Source] {
        self.ledgers.published().sources(cell)
    }

    /// Steps performed so far.
    pub fn iterations_completed(&self) -> u32 {
        self.metrics.iterations_completed
    }

    /// Steps left before the configured count is reached.
    pub fn iterations_remaining(&self) -> u32 {
        self.config.iterations - self.metrics.iterations_completed
    }

    /// The run configuration.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// The compiled routing plan.
    pub fn plan(&self) -> &RoutingPlan {
        &self.plan
    }

    /// Metrics accumulated so far.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Memory held by both working ledgers, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.ledgers.memory_bytes()
    }

    /// Trim the current ledger and compact it into a table, releasing the
    /// working buffers.
    ///
    /// Does not run remaining iterations; see [`run`](Self::run).
    pub fn finish(self) -> Result<RunOutput, RoutingError> {
        let Self {
            config,
            ledgers,
            mut metrics,
            ..
        } = self;
        let start = Instant::now();

        let mut ledger = ledgers.into_published();
        let trimmed = ledger.trim(config.trim_threshold);
        let table = CompactedSourceTable::from_ledger(&ledger)?;
        drop(ledger);

        metrics.compaction_us = start.elapsed().as_micros() as u64;
        metrics.entries_trimmed = trimmed.entries;
        metrics.mass_trimmed = trimmed.mass;
        metrics.total_sources = table.total_sources();

        info!(
            "provenance run finished: {}x{} grid, {} iterations, {} sources kept, \
             {} trimmed ({:.6} mass), {} us",
            table.width(),
            table.height(),
            metrics.iterations_completed,
            metrics.total_sources,
            metrics.entries_trimmed,
            metrics.mass_trimmed,
            metrics.plan_us + metrics.routing_us + metrics.compaction_us
        );

        Ok(RunOutput { table, metrics })
    }

    /// Perform every remaining step, then [`finish`](Self::finish).
    pub fn run(mut self) -> Result<RunOutput, RoutingError> {
        while self.step()? {}
        self.finish()
    }
}

/// Trace provenance over `hydrology` for `iterations` steps with the
/// default geometry and threshold, returning only the table.
pub fn trace<H: Hydrology + ?Sized>(
    hydrology: &H,
    iterations: u32,
) -> Result<CompactedSourceTable, RoutingError> {
    let config = RoutingConfig::new(iterations)?;
    Ok(FlowRoutingEngine::new(hydrology, config)?.run()?.table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbontrace_core::HydroGrid;
    use carbontrace_ledger::LedgerError;

    use crate::config::ConfigError;

    fn c(x: u32, y: u32) -> Cell {
        Cell::new(x, y)
    }

    fn amount(engine: &FlowRoutingEngine, cell: Cell, origin: Cell) -> Option<f64> {
        engine
            .sources(cell)
            .iter()
            .find(|s| s.origin == origin)
            .map(|s| s.amount)
    }

    fn east_quarter(iterations: u32) -> FlowRoutingEngine {
        let h = HydroGrid::uniform(3, 3, 0.125, 0.0).unwrap();
        FlowRoutingEngine::new(&h, RoutingConfig::new(iterations).unwrap()).unwrap()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn new_seeds_identity_for_wet_cells_only() {
        let mut h = HydroGrid::uniform(2, 2, 0.0, 0.0).unwrap();
        h.set_dry(c(1, 1));
        let engine = FlowRoutingEngine::new(&h, RoutingConfig::new(1).unwrap()).unwrap();
        assert_eq!(engine.sources(c(0, 1)), &[Source::new(c(0, 1), 1.0)]);
        assert!(engine.sources(c(1, 1)).is_empty());
        assert_eq!(engine.metrics().peak_entries, 3);
    }

    #[test]
    fn new_revalidates_config() {
        let h = HydroGrid::uniform(2, 2, 0.0, 0.0).unwrap();
        let mut cfg = RoutingConfig::new(1).unwrap();
        cfg.iterations = 0;
        match FlowRoutingEngine::new(&h, cfg) {
            Err(RoutingError::Config(ConfigError::ZeroIterations)) => {}
            other => panic!("expected ZeroIterations, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Stepping
    // ---------------------------------------------------------------

    #[test]
    fn one_step_splits_centre() {
        let mut engine = east_quarter(2);
        assert!(engine.step().unwrap());
        assert_eq!(amount(&engine, c(1, 1), c(1, 1)), Some(0.75));
        assert_eq!(amount(&engine, c(1, 1), c(0, 1)), Some(0.25));
        assert_eq!(engine.sources(c(1, 1)).len(), 2);
    }

    #[test]
    fn two_steps_compound() {
        let mut engine = east_quarter(2);
        engine.step().unwrap();
        engine.step().unwrap();
        assert_eq!(amount(&engine, c(1, 1), c(1, 1)), Some(0.5625));
        assert_eq!(amount(&engine, c(1, 1), c(0, 1)), Some(0.375));
        assert_eq!(engine.iterations_completed(), 2);
        assert_eq!(engine.iterations_remaining(), 0);
    }

    #[test]
    fn step_past_configured_count_is_noop() {
        let mut engine = east_quarter(1);
        assert!(engine.step().unwrap());
        let before = engine.sources(c(2, 1)).to_vec();
        assert!(!engine.step().unwrap());
        assert_eq!(engine.sources(c(2, 1)), before.as_slice());
        assert_eq!(engine.iterations_completed(), 1);
    }

    #[test]
    fn east_edge_keeps_its_overflow() {
        let mut engine = east_quarter(1);
        engine.step().unwrap();
        assert_eq!(amount(&engine, c(2, 0), c(2, 0)), Some(1.0));
        assert_eq!(amount(&engine, c(2, 0), c(1, 0)), Some(0.25));
    }

    // ---------------------------------------------------------------
    // Finishing
    // ---------------------------------------------------------------

    #[test]
    fn finish_trims_small_attributions() {
        let h = HydroGrid::uniform(2, 1, 0.125, 0.0).unwrap();
        let cfg = RoutingConfig::builder()
            .iterations(1)
            .trim_threshold(0.3)
            .build()
            .unwrap();
        let mut engine = FlowRoutingEngine::new(&h, cfg).unwrap();
        engine.step().unwrap();
        // (1,0) holds {(0,0): 0.25, (1,0): 1.0}; the 0.25 is dropped.
        let out = engine.finish().unwrap();
        assert_eq!(out.metrics.entries_trimmed, 1);
        assert_eq!(out.metrics.mass_trimmed, 0.25);
        let kept: Vec<Source> = out.table.sources_at(c(1, 0)).collect();
        assert_eq!(kept, vec![Source::new(c(1, 0), 1.0)]);
        assert_eq!(out.metrics.total_sources, out.table.total_sources());
    }

    #[test]
    fn run_completes_all_iterations() {
        let out = east_quarter(3).run().unwrap();
        assert_eq!(out.metrics.iterations_completed, 3);
        assert!(out.metrics.peak_entries >= 9);
    }

    #[test]
    fn trace_rejects_zero_iterations() {
        let h = HydroGrid::uniform(2, 2, 0.0, 0.0).unwrap();
        assert_eq!(
            trace(&h, 0).unwrap_err(),
            RoutingError::Config(ConfigError::ZeroIterations)
        );
    }

    #[test]
    fn still_water_keeps_identity() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let table = trace(&h, 4).unwrap();
        assert_eq!(table.total_sources(), 9);
        for cell in [c(0, 0), c(1, 2), c(2, 2)] {
            let got: Vec<Source> = table.sources_at(cell).collect();
            assert_eq!(got, vec![Source::new(cell, 1.0)]);
        }
    }

    #[test]
    fn ledger_errors_convert() {
        let e: RoutingError = LedgerError::SpanOverflow { entries: 1 }.into();
        assert!(matches!(e, RoutingError::Ledger(_)));
    }
}
