//! Property tests over seeded random flow fields.

use carbontrace_core::Cell;
use carbontrace_engine::{FlowRoutingEngine, RoutingConfig};
use carbontrace_ledger::Source;
use carbontrace_test_utils::fixtures::random_flow;
use carbontrace_test_utils::{assert_close, mass, table_sources};
use proptest::prelude::*;

fn cells(width: u32, height: u32) -> impl Iterator<Item = Cell> {
    (0..height).flat_map(move |y| (0..width).map(move |x| Cell::new(x, y)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn total_mass_equals_wet_patch_count(
        seed in any::<u64>(),
        w in 1u32..8,
        h in 1u32..8,
        iterations in 1u32..6,
    ) {
        let hydro = random_flow(w, h, seed, 0.4, 0.7);
        let cfg = RoutingConfig::new(iterations).unwrap();
        let mut engine = FlowRoutingEngine::new(&hydro, cfg).unwrap();
        while engine.step().unwrap() {
            let total: f64 = cells(w, h).map(|c| mass(engine.sources(c))).sum();
            prop_assert!((total - hydro.wet_count() as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn table_matches_trimmed_ledger(
        seed in any::<u64>(),
        w in 1u32..8,
        h in 1u32..8,
        iterations in 1u32..8,
    ) {
        let hydro = random_flow(w, h, seed, 0.4, 0.8);
        let cfg = RoutingConfig::new(iterations).unwrap();
        let threshold = cfg.trim_threshold;
        let mut engine = FlowRoutingEngine::new(&hydro, cfg).unwrap();
        while engine.step().unwrap() {}

        let expected: Vec<(Cell, Vec<Source>)> = cells(w, h)
            .map(|c| {
                let kept = engine
                    .sources(c)
                    .iter()
                    .copied()
                    .filter(|s| s.amount > threshold)
                    .collect();
                (c, kept)
            })
            .collect();
        let live_mass: f64 = cells(w, h).map(|c| mass(engine.sources(c))).sum();

        let out = engine.finish().unwrap();
        let table = &out.table;
        let mut size_sum = 0usize;
        for (cell, kept) in &expected {
            prop_assert_eq!(&table_sources(table, *cell), kept);
            let (offset, size) = table.span(*cell);
            prop_assert_eq!(size, kept.len());
            prop_assert!(offset + size <= table.total_sources());
            size_sum += size;
        }
        prop_assert_eq!(size_sum, table.total_sources());
        prop_assert!(table.amounts().iter().all(|&a| a > threshold));

        let retained: f64 = table.amounts().iter().sum();
        assert_close(retained + out.metrics.mass_trimmed, live_mass, 1e-9);
    }

    #[test]
    fn runs_are_deterministic(seed in any::<u64>(), iterations in 1u32..5) {
        let hydro = random_flow(6, 5, seed, 0.3, 0.9);
        let run = || {
            FlowRoutingEngine::new(&hydro, RoutingConfig::new(iterations).unwrap())
                .unwrap()
                .run()
                .unwrap()
                .table
        };
        prop_assert_eq!(run(), run());
    }
}
