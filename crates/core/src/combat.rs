//! Turn resolution for a single player-versus-enemy encounter.
//!
//! The enemy follows weighted move-sets gated by its relative health. A move-set
//! is rolled when none is active, played to its last move, then dropped so the
//! next turn rolls again.

use serde::{Deserialize, Serialize};

use crate::catalog::{EnemyTemplate, MoveSet};
use crate::events::SessionEvent;
use crate::resources::Resources;
use crate::rng::RandomSource;
use crate::types::{CellId, CombatMove, EnemyId};

/// Move-set id meaning "roll a fresh move-set on the next turn".
pub const NO_MOVE_SET: u32 = 0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSession {
    pub turn: u32,
    pub cell: CellId,
    pub enemy_id: EnemyId,
    pub enemy_health: u32,
    pub move_set_id: u32,
    pub move_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    EnemyWon,
    PlayerWon,
    Continuing,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::Continuing
    }
}

/// Damage after defense mitigation, never below one point.
pub fn mitigated_damage(attack: u32, defense: u32) -> u32 {
    let reduction = 0.01 * f64::from(defense);
    let raw = f64::from(attack) * (1.0 - reduction / (1.0 + reduction));
    (raw.floor() as u32).max(1)
}

pub struct Encounter<'a> {
    template: &'a EnemyTemplate,
    session: &'a mut CombatSession,
}

impl<'a> Encounter<'a> {
    pub fn start(cell: CellId, enemy_id: EnemyId, enemy_health: u32) -> CombatSession {
        CombatSession {
            turn: 0,
            cell,
            enemy_id,
            enemy_health,
            move_set_id: NO_MOVE_SET,
            move_index: 0,
        }
    }

    pub fn new(template: &'a EnemyTemplate, session: &'a mut CombatSession) -> Self {
        Self { template, session }
    }

    pub fn relative_health(&self) -> f64 {
        if self.template.health == 0 {
            return 0.0;
        }
        f64::from(self.session.enemy_health) / f64::from(self.template.health)
    }

    /// Plays one exchange. Only one side can take damage per call.
    pub fn resolve_outcome(
        &mut self,
        player_move: CombatMove,
        resources: &mut Resources<'_>,
        rng: &mut impl RandomSource,
    ) -> Outcome {
        let enemy_move = self.next_enemy_move(rng);
        self.session.turn += 1;
        resources.push_event(SessionEvent::EnemyMove {
            turn: self.session.turn,
            player_move,
            enemy_move,
        });

        if player_move.beats(enemy_move) {
            let damage = mitigated_damage(resources.attack(), self.template.defense);
            self.session.enemy_health = self.session.enemy_health.saturating_sub(damage);
            resources.push_event(SessionEvent::EnemyHealth {
                enemy_id: self.session.enemy_id.clone(),
                health: self.session.enemy_health,
                max_health: self.template.health,
            });
        } else if enemy_move.beats(player_move) {
            let damage = mitigated_damage(self.template.attack, resources.defense());
            resources.apply_damage(damage);
        }

        if resources.health() == 0 {
            Outcome::EnemyWon
        } else if self.session.enemy_health == 0 {
            Outcome::PlayerWon
        } else {
            Outcome::Continuing
        }
    }

    fn next_enemy_move(&mut self, rng: &mut impl RandomSource) -> CombatMove {
        let template = self.template;
        let set = match template.move_set(self.session.move_set_id) {
            Some(set) if self.session.move_set_id != NO_MOVE_SET => set,
            _ => {
                let set = self.roll_move_set(rng);
                self.session.move_set_id = set.map_or(NO_MOVE_SET, |s| s.id);
                self.session.move_index = 0;
                match set {
                    Some(set) => set,
                    None => return CombatMove::Strike,
                }
            }
        };

        let index = self.session.move_index.min(set.moves.len().saturating_sub(1));
        let enemy_move = set.moves.get(index).copied().unwrap_or(CombatMove::Strike);
        if index + 1 >= set.moves.len() {
            self.session.move_set_id = NO_MOVE_SET;
            self.session.move_index = 0;
        } else {
            self.session.move_index = index + 1;
        }
        enemy_move
    }

    /// Weighted pick among the move-sets whose band holds the current relative
    /// health, falling back to every move-set when none does.
    fn roll_move_set(&self, rng: &mut impl RandomSource) -> Option<&'a MoveSet> {
        let relative = self.relative_health();
        let template: &'a EnemyTemplate = self.template;
        let mut candidates: Vec<&'a MoveSet> =
            template.move_sets.iter().filter(|set| set.accepts(relative)).collect();
        if candidates.is_empty() {
            tracing::debug!(relative, "no move-set band matches, rolling over all move-sets");
            candidates = template.move_sets.iter().collect();
        }
        let weights: Vec<u32> = candidates.iter().map(|set| set.weight).collect();
        let index = rng.pick_weighted(&weights).unwrap_or_else(|| rng.below(candidates.len()));
        candidates.get(index).copied()
    }
}
