use anyhow::{Context, Result};
use clap::Parser;
use dungeon_core::mapgen::EnemyRoster;
use dungeon_core::rng::seeded;
use dungeon_core::{GameCatalog, MapGenerator};
use tools::render::render_floor;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Floor number from the built-in catalog
    #[arg(short, long, default_value_t = 1)]
    floor: u32,
    /// Print the floor as JSON instead of ASCII
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tools::init_tracing();
    let args = Args::parse();

    let catalog = GameCatalog::build_default();
    let config = catalog
        .floor_config(args.floor)
        .with_context(|| format!("No floor {} in the catalog", args.floor))?;
    let roster = EnemyRoster::from_templates(&catalog.enemies);
    let (floor, report) =
        MapGenerator::new(config, &roster).generate_with_report(&mut seeded(args.seed));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&floor)?);
        return Ok(());
    }

    print!("{}", render_floor(&floor, |_| true));
    println!(
        "{}x{} start {} | enemies {}/{} | loot {}/{} | spacing {} | edges {}",
        floor.width,
        floor.height,
        floor.start,
        report.enemies_placed,
        report.enemies_requested,
        report.loot_placed,
        report.loot_requested,
        report.spacing,
        floor.edge_count(),
    );
    println!("Fingerprint: {:016x}", floor.fingerprint());
    Ok(())
}
