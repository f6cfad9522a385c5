use anyhow::{Result, bail};
use clap::Parser;
use dungeon_core::rng::seeded;
use dungeon_core::{
    CombatAction, CombatMove, FixedClock, GameCatalog, MemoryStore, PlayerId, RecordingSink,
    SessionController, SessionError, SessionEvent,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Actions attempted per simulated day
    #[arg(short, long, default_value_t = 500)]
    actions: u32,
    /// Number of daily cycles to play through
    #[arg(short, long, default_value_t = 3)]
    days: u32,
}

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn main() -> Result<()> {
    tools::init_tracing();
    let args = Args::parse();

    println!("Starting autoplay on seed {} for {} days...", args.seed, args.days);
    let catalog = GameCatalog::build_default();
    let clock = FixedClock::new(0);
    let mut session = SessionController::new(
        PlayerId::new("autoplay"),
        MemoryStore::new(),
        &catalog,
        &clock,
        RecordingSink::default(),
        seeded(args.seed),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed ^ 0x5eed);
    let mut rejected = 0_u32;

    for day in 0..args.days {
        clock.set(u64::from(day) * DAY_MS + 1);
        session.init()?;

        for _ in 0..args.actions {
            let Some(document) = session.document().cloned() else {
                bail!("session closed unexpectedly");
            };
            let result = if document.in_combat() {
                let mv = choose(&mut rng, &CombatMove::ALL);
                session.combat_action(CombatAction::Attack { mv })
            } else {
                let frontier: Vec<usize> = document
                    .data
                    .neighbors(document.state.user.cell)
                    .iter()
                    .copied()
                    .filter(|&cell| !document.is_known(cell))
                    .collect();
                let known: Vec<usize> = document.known_cells().collect();
                if frontier.is_empty() || rng.next_u64() % 3 == 0 {
                    // Bias toward resolving whatever is underfoot before backtracking
                    let here = document.state.user.cell;
                    let occupied = document.data.cells[here].occupant.is_some();
                    if occupied {
                        session.use_cell(here)
                    } else {
                        session.move_to(choose(&mut rng, &known))
                    }
                } else {
                    session.reveal(choose(&mut rng, &frontier))
                }
            };

            match result {
                Ok(_) => {}
                Err(err @ (SessionError::Store(_) | SessionError::Catalog(_))) => {
                    return Err(err.into());
                }
                Err(_) => {
                    rejected += 1;
                    if session.document() != Some(&document) {
                        bail!("Invariant failed: rejected action mutated the session");
                    }
                }
            }

            // Assert invariants
            let Some(after) = session.document() else {
                bail!("session closed unexpectedly");
            };
            let user = &after.state.user;
            assert!(
                user.health <= user.max_health(&catalog.stats),
                "Invariant failed: HP > Max HP"
            );
            assert!(
                user.energy <= user.max_energy(&catalog.stats),
                "Invariant failed: EN > Max EN"
            );
            assert!(after.is_known(user.cell), "Invariant failed: player on hidden cell");
            assert!(
                after.state.def_hidden <= catalog.max_jam_counter()
                    && after.state.def_revealed <= catalog.max_jam_counter(),
                "Invariant failed: jam counter past table"
            );
            if user.energy == 0 && !after.in_combat() {
                break;
            }
        }

        if let Some(document) = session.document() {
            println!(
                "Day {}: floor {}, level {}, {} cells revealed, {} energy left",
                day,
                document.state.floor,
                document.state.user.level,
                document.state.revealed.len(),
                document.state.user.energy,
            );
        }
        session.dispose()?;
    }

    let fights = session
        .sink()
        .all_events()
        .filter(|event| matches!(event, SessionEvent::CombatEnded { .. }))
        .count();
    println!("Autoplay completed: {fights} fights, {rejected} rejected actions.");
    Ok(())
}
