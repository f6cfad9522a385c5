use dungeon_core::catalog::{FloorConfig, MoveSet};
use dungeon_core::combat::mitigated_damage;
use dungeon_core::events::CombatResult;
use dungeon_core::mapgen::EnemyRoster;
use dungeon_core::rng::seeded;
use dungeon_core::session::SessionState;
use dungeon_core::{
    CombatAction, CombatMove, EnemyId, FixedClock, GameCatalog, MapGenerator, MemoryStore,
    Occupant, PlayerId, PlayerState, RecordingSink, SessionController, SessionDocument,
    SessionEvent,
};

/// A slime that only ever feints, so a strike wins every exchange.
fn predictable_catalog() -> GameCatalog {
    let mut catalog = GameCatalog::build_default();
    let slime = catalog.enemies.get_mut(&EnemyId::new("slime")).expect("slime template");
    slime.move_sets = vec![MoveSet {
        id: 1,
        weight: 1,
        min_health: 0.0,
        max_health: 1.0,
        moves: vec![CombatMove::Feint],
    }];
    catalog
}

fn corner_start_document(catalog: &GameCatalog) -> (SessionDocument, usize) {
    let config = FloorConfig {
        width: 6,
        height: 9,
        passage_base_chance: 0.05,
        passage_chance_step: 0.02,
        enemies: Vec::new(),
        loot: Vec::new(),
    };
    let roster = EnemyRoster::from_templates(&catalog.enemies);
    let mut floor = (0..1_000)
        .map(|seed| MapGenerator::new(&config, &roster).generate(&mut seeded(seed)))
        .find(|floor| floor.start == 0)
        .expect("a seed starting at (0, 0)");
    let neighbor = floor.neighbors(0)[0];
    floor.cells[neighbor].occupant =
        Some(Occupant::Enemy { enemy_id: EnemyId::new("slime"), health: 10 });

    let document = SessionDocument {
        state: SessionState {
            floor: 1,
            cycle: 0,
            map_revealed: false,
            revealed: Vec::new(),
            def_hidden: 0,
            def_revealed: 0,
            combat: None,
            user: PlayerState::fresh(&catalog.stats, 0, 0),
        },
        data: floor,
    };
    (document, neighbor)
}

#[test]
fn player_attack_six_defeats_ten_health_slime_in_two_turns() {
    let catalog = predictable_catalog();
    let (document, slime_cell) = corner_start_document(&catalog);
    let player = PlayerId::new("scenario");
    let mut store = MemoryStore::new();
    store.insert(player.clone(), document);

    let clock = FixedClock::new(1_000);
    let sink = RecordingSink::default();
    let mut session = SessionController::new(player, store, &catalog, &clock, sink, seeded(0));
    let snapshot = session.init().expect("init");
    assert_eq!(snapshot.player.attack, 6);
    assert_eq!(snapshot.player.defense, 0);
    assert_eq!(mitigated_damage(6, 0), 6);

    session.reveal(slime_cell).expect("reveal slime");
    let engaged = session.use_cell(slime_cell).expect("engage slime");
    assert_eq!(engaged.combat.as_ref().map(|c| c.enemy_health), Some(10));

    let strike = CombatAction::Attack { mv: CombatMove::Strike };
    let first = session.combat_action(strike).expect("turn one");
    assert_eq!(first.combat.as_ref().map(|c| c.enemy_health), Some(4));
    assert_eq!(first.player.health, first.player.max_health);

    let second = session.combat_action(strike).expect("turn two");
    assert!(second.combat.is_none());
    let batch = session.sink().last_batch();
    assert!(batch.contains(&SessionEvent::EnemyHealth {
        enemy_id: EnemyId::new("slime"),
        health: 0,
        max_health: 10,
    }));
    assert!(batch.contains(&SessionEvent::CombatEnded {
        enemy_id: EnemyId::new("slime"),
        result: CombatResult::PlayerWon,
    }));
    assert!(batch.contains(&SessionEvent::ExperienceGained { amount: 10, exp: 10 }));
    // The slime was the floor's only enemy.
    assert_eq!(second.floor, 2);
}
