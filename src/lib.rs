pub mod cli;
pub mod document;
pub mod model;
pub mod parser;
pub mod store;
pub mod writer;

use anyhow::Context;
use clap::Parser;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // 1. ── Load ───────────────────────────────────────────────────────
    // Missing or corrupt inputs degrade to empty stores (warned, never fatal).
    let (atlas, items) = parser::load_world(&args.atlas, &args.items);

    // 2. ── Report ─────────────────────────────────────────────────────
    log::info!(
        "loaded {} region(s), next region number {}",
        atlas.region_count(),
        atlas.map_count()
    );
    for region in atlas.regions_by_number() {
        let counts = items.region_counts(region.number());
        log::info!(
            "  [{}] {} ({}x{}): {} item(s)",
            region.number(),
            region.name(),
            region.width(),
            region.height(),
            counts.map_or(0, |c| c.total)
        );
    }

    // 3. ── Write normalized outputs ───────────────────────────────────
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;

    writer::save_atlas(&atlas, &args.output.join("atlas.json"))
        .with_context(|| "Writing atlas document")?;
    writer::save_items(&items, &args.output.join("items.json"))
        .with_context(|| "Writing items document")?;

    Ok(())
}
