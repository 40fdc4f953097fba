//! Trace provenance through a small river and print the attribution dump.
//!
//! Run with `RUST_LOG=debug` to see per-iteration ledger sizes.

use carbontrace_bench::river_profile;
use carbontrace_engine::{FlowRoutingEngine, RoutingConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let hydro = river_profile(16, 8)?;
    let config = RoutingConfig::builder()
        .iterations(6)
        .trim_threshold(0.01)
        .build()?;
    let out = FlowRoutingEngine::new(&hydro, config)?.run()?;

    print!("{}", out.table);
    eprintln!("{:#?}", out.metrics);
    Ok(())
}
