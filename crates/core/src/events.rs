//! Outward notifications produced by one controller call.
//!
//! Controller logic pushes into an [`EventBatch`]; the controller hands the whole
//! batch to the [`EventSink`] exactly once when the call succeeds.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::types::{AltarId, Attribute, CellId, CombatMove, EnemyId, LootDrop, TrapId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatResult {
    PlayerWon,
    EnemyWon,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    FloorGenerated { floor: u32, cycle: u64, cells: usize },
    CellRevealed { cell: CellId },
    MapRevealed,
    PlayerMoved { cell: CellId },
    EnergyChanged { energy: u32, max_energy: u32 },
    PlayerHealth { health: u32, max_health: u32 },
    CombatStarted { cell: CellId, enemy_id: EnemyId, enemy_health: u32 },
    EnemyMove { turn: u32, player_move: CombatMove, enemy_move: CombatMove },
    EnemyHealth { enemy_id: EnemyId, health: u32, max_health: u32 },
    CombatEnded { enemy_id: EnemyId, result: CombatResult },
    TrapJammed { cell: CellId, trap_id: TrapId },
    TrapArmed { cell: CellId, trap_id: TrapId, jam_chance: f64 },
    TrapDefused { trap_id: TrapId, used_key: bool, energy_lost: u32 },
    AltarApplied { altar_id: AltarId },
    LootCollected { drop: LootDrop },
    ExperienceGained { amount: u32, exp: u32 },
    LevelUp { level: u32 },
    AttributeAllocated { attribute: Attribute, value: u32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventBatch {
    events: Vec<SessionEvent>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn take(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }
}

/// Transport-side receiver of one flushed batch per controller call.
pub trait EventSink {
    fn flush(&mut self, events: Vec<SessionEvent>);
}

/// Keeps every flushed batch, mostly for tests and offline tooling.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub batches: Vec<Vec<SessionEvent>>,
}

impl RecordingSink {
    pub fn last_batch(&self) -> &[SessionEvent] {
        self.batches.last().map_or(&[], Vec::as_slice)
    }

    pub fn all_events(&self) -> impl Iterator<Item = &SessionEvent> {
        self.batches.iter().flatten()
    }
}

impl EventSink for RecordingSink {
    fn flush(&mut self, events: Vec<SessionEvent>) {
        self.batches.push(events);
    }
}

/// Logs each batch through `tracing` and drops it.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn flush(&mut self, events: Vec<SessionEvent>) {
        for event in &events {
            tracing::debug!(?event, "session event");
        }
        tracing::trace!(count = events.len(), "flushed event batch");
    }
}

impl<E: EventSink + ?Sized> EventSink for &mut E {
    fn flush(&mut self, events: Vec<SessionEvent>) {
        (**self).flush(events);
    }
}
