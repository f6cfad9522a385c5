use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dungeon_core::rng::seeded;
use dungeon_core::{
    Attribute, CombatAction, CombatMove, GameCatalog, PlayerId, SessionController,
    SessionSnapshot, SystemClock, TracingSink,
};
use tools::file_store::JsonFileStore;
use tools::render::render_floor;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Player whose session is opened
    #[arg(short, long, default_value = "local")]
    player: String,
    /// Directory holding session files (defaults to the platform data dir)
    #[arg(long)]
    dir: Option<PathBuf>,
    /// TOML catalog replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Seed for generation and combat rolls (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current session
    Show,
    Reveal { cell: usize },
    Move { cell: usize },
    Use { cell: usize },
    Attack { mv: MoveArg },
    Potion,
    Allocate { attribute: AttributeArg },
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveArg {
    Strike,
    Guard,
    Feint,
}

impl From<MoveArg> for CombatMove {
    fn from(arg: MoveArg) -> Self {
        match arg {
            MoveArg::Strike => CombatMove::Strike,
            MoveArg::Guard => CombatMove::Guard,
            MoveArg::Feint => CombatMove::Feint,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AttributeArg {
    Str,
    Dex,
    Int,
    Sta,
}

impl From<AttributeArg> for Attribute {
    fn from(arg: AttributeArg) -> Self {
        match arg {
            AttributeArg::Str => Attribute::Strength,
            AttributeArg::Dex => Attribute::Dexterity,
            AttributeArg::Int => Attribute::Intellect,
            AttributeArg::Sta => Attribute::Stamina,
        }
    }
}

fn load_catalog(path: Option<&PathBuf>) -> Result<GameCatalog> {
    let Some(path) = path else {
        return Ok(GameCatalog::build_default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    GameCatalog::from_toml_str(&source)
        .with_context(|| format!("Invalid catalog: {}", path.display()))
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    let player = &snapshot.player;
    println!(
        "Floor {} (cycle {}) | cell {} | HP {}/{} | EN {}/{} | ATK {} DEF {}",
        snapshot.floor,
        snapshot.cycle,
        player.cell,
        player.health,
        player.max_health,
        player.energy,
        player.max_energy,
        player.attack,
        player.defense,
    );
    println!(
        "Level {} ({} exp, {} unspent) | keys {} potions {} scrolls {}",
        player.level,
        player.exp,
        player.unspent_points,
        player.keys,
        player.potions,
        player.scrolls,
    );
    if let Some(combat) = &snapshot.combat {
        println!(
            "In combat with {} ({} hp) on cell {}, turn {}",
            combat.enemy_id, combat.enemy_health, combat.cell, combat.turn
        );
    }
}

fn main() -> Result<()> {
    tools::init_tracing();
    let args = Args::parse();

    let root = match args.dir {
        Some(dir) => dir,
        None => JsonFileStore::get_default_root().context("No data directory for session files")?,
    };
    let catalog = load_catalog(args.catalog.as_ref())?;
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_nanos() as u64)
    });

    let mut session = SessionController::new(
        PlayerId::new(args.player),
        JsonFileStore::new(root),
        catalog,
        SystemClock,
        TracingSink,
        seeded(seed),
    );
    let opened = session.init().context("Failed to open session")?;

    let snapshot = match args.command {
        Command::Show => opened,
        Command::Reveal { cell } => session.reveal(cell)?,
        Command::Move { cell } => session.move_to(cell)?,
        Command::Use { cell } => session.use_cell(cell)?,
        Command::Attack { mv } => session.combat_action(CombatAction::Attack { mv: mv.into() })?,
        Command::Potion => session.combat_action(CombatAction::UsePotion)?,
        Command::Allocate { attribute } => session.allocate(attribute.into())?,
    };

    if let Some(document) = session.document() {
        print!("{}", render_floor(&document.data, |id| document.is_known(id)));
    }
    print_snapshot(&snapshot);
    session.dispose().context("Failed to save session")?;
    Ok(())
}
