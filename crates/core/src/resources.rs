//! Player resource and stat model.
//!
//! Maximum health/energy, attack and defense are never stored: they are derived
//! from the allocated attributes on every access. Current values are stored and
//! clamped into `[0, max]` by every mutation. Mutations never fail; callers
//! check affordability first.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    AltarEffect, AltarTemplate, LevelTable, ModeSettings, RegenRule, StatFormulas, TrapTemplate,
};
use crate::events::{EventBatch, SessionEvent};
use crate::types::{AltarId, Attribute, CellId, LootDrop, LootKind, TrapId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "str")]
    pub strength: u32,
    #[serde(rename = "dex")]
    pub dexterity: u32,
    #[serde(rename = "int")]
    pub intellect: u32,
    #[serde(rename = "sta")]
    pub stamina: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self { strength: 2, dexterity: 0, intellect: 0, stamina: 1 }
    }
}

impl Attributes {
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intellect => self.intellect,
            Attribute::Stamina => self.stamina,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> &mut u32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Intellect => &mut self.intellect,
            Attribute::Stamina => &mut self.stamina,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub cell: CellId,
    pub health: u32,
    pub energy: u32,
    pub level: u32,
    pub exp: u32,
    #[serde(default)]
    pub unspent_points: u32,
    pub stats: Attributes,
    #[serde(default)]
    pub keys: u32,
    #[serde(default)]
    pub potions: u32,
    #[serde(default)]
    pub scrolls: u32,
    pub last_hp_regen: u64,
    pub last_energy_regen: u64,
}

impl PlayerState {
    /// A level-one player standing on `start` with full health and energy.
    pub fn fresh(formulas: &StatFormulas, start: CellId, now_unix_ms: u64) -> Self {
        let mut player = Self {
            cell: start,
            health: 0,
            energy: 0,
            level: 1,
            exp: 0,
            unspent_points: 0,
            stats: Attributes::default(),
            keys: 0,
            potions: 0,
            scrolls: 0,
            last_hp_regen: now_unix_ms,
            last_energy_regen: now_unix_ms,
        };
        player.health = player.max_health(formulas);
        player.energy = player.max_energy(formulas);
        player
    }

    pub fn max_health(&self, formulas: &StatFormulas) -> u32 {
        formulas.base_health
            + formulas.health_per_stamina * self.stats.stamina
            + formulas.health_per_level * self.level.saturating_sub(1)
    }

    pub fn max_energy(&self, formulas: &StatFormulas) -> u32 {
        formulas.base_energy + formulas.energy_per_intellect * self.stats.intellect
    }

    pub fn attack(&self, formulas: &StatFormulas) -> u32 {
        formulas.base_attack + formulas.attack_per_strength * self.stats.strength
    }

    pub fn defense(&self, formulas: &StatFormulas) -> u32 {
        formulas.base_defense + formulas.defense_per_dexterity * self.stats.dexterity
    }
}

/// Mutable view over one player's resources that reports every change.
pub struct Resources<'a> {
    player: &'a mut PlayerState,
    formulas: &'a StatFormulas,
    events: &'a mut EventBatch,
}

impl<'a> Resources<'a> {
    pub fn new(
        player: &'a mut PlayerState,
        formulas: &'a StatFormulas,
        events: &'a mut EventBatch,
    ) -> Self {
        Self { player, formulas, events }
    }

    pub fn player(&self) -> &PlayerState {
        self.player
    }

    pub fn health(&self) -> u32 {
        self.player.health
    }

    pub fn energy(&self) -> u32 {
        self.player.energy
    }

    pub fn max_health(&self) -> u32 {
        self.player.max_health(self.formulas)
    }

    pub fn max_energy(&self) -> u32 {
        self.player.max_energy(self.formulas)
    }

    pub fn attack(&self) -> u32 {
        self.player.attack(self.formulas)
    }

    pub fn defense(&self) -> u32 {
        self.player.defense(self.formulas)
    }

    pub fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn modify_energy(&mut self, delta: i64) {
        let max = i64::from(self.max_energy());
        let next = (i64::from(self.player.energy) + delta).clamp(0, max);
        self.player.energy = next as u32;
        self.emit_energy();
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.player.health = self.player.health.saturating_sub(amount).min(self.max_health());
        self.emit_health();
    }

    pub fn heal(&mut self, amount: u32) {
        self.player.health = self.player.health.saturating_add(amount).min(self.max_health());
        self.emit_health();
    }

    pub fn restore_full(&mut self) {
        self.player.health = self.max_health();
        self.player.energy = self.max_energy();
        self.emit_health();
        self.emit_energy();
    }

    pub fn move_to(&mut self, cell: CellId) {
        self.player.cell = cell;
        self.events.push(SessionEvent::PlayerMoved { cell });
    }

    /// Spends a key when one is held, otherwise the trap's damage is taken out of energy.
    pub fn defuse_trap(&mut self, trap_id: &TrapId, trap: &TrapTemplate) {
        let used_key = self.player.keys > 0;
        let energy_before = self.player.energy;
        if used_key {
            self.player.keys -= 1;
        } else {
            self.modify_energy(-i64::from(trap.damage));
        }
        self.events.push(SessionEvent::TrapDefused {
            trap_id: trap_id.clone(),
            used_key,
            energy_lost: energy_before - self.player.energy,
        });
    }

    pub fn apply_altar(&mut self, altar_id: &AltarId, altar: &AltarTemplate, levels: &LevelTable) {
        match altar.effect {
            AltarEffect::RestoreHealth { amount } => self.heal(amount),
            AltarEffect::RestoreEnergy { amount } => self.modify_energy(i64::from(amount)),
            AltarEffect::RestoreAll => self.restore_full(),
            AltarEffect::GrantExperience { amount } => self.grant_experience(amount, levels),
        }
        self.events.push(SessionEvent::AltarApplied { altar_id: altar_id.clone() });
    }

    pub fn grant_experience(&mut self, amount: u32, levels: &LevelTable) {
        if amount == 0 {
            return;
        }
        self.player.exp = self.player.exp.saturating_add(amount);
        self.events.push(SessionEvent::ExperienceGained { amount, exp: self.player.exp });
        if levels.exp_per_level == 0 {
            return;
        }
        while self.player.exp >= levels.exp_per_level {
            self.player.exp -= levels.exp_per_level;
            self.player.level += 1;
            self.player.unspent_points += levels.points_per_level;
            self.events.push(SessionEvent::LevelUp { level: self.player.level });
        }
    }

    /// Spends one unspent point; a no-op when none is available.
    pub fn allocate(&mut self, attribute: Attribute) {
        if self.player.unspent_points == 0 {
            return;
        }
        self.player.unspent_points -= 1;
        let value = self.player.stats.get_mut(attribute);
        *value += 1;
        let value = *value;
        self.events.push(SessionEvent::AttributeAllocated { attribute, value });
    }

    pub fn collect(&mut self, drop: LootDrop, levels: &LevelTable) {
        match drop.kind {
            LootKind::Key => self.player.keys += drop.amount,
            LootKind::Potion => self.player.potions += drop.amount,
            LootKind::Scroll => self.player.scrolls += drop.amount,
            LootKind::Experience => self.grant_experience(drop.amount, levels),
        }
        self.events.push(SessionEvent::LootCollected { drop });
    }

    /// Restores health and energy for every full regeneration interval elapsed since the last tick.
    pub fn regenerate(&mut self, now_unix_ms: u64, mode: &ModeSettings) {
        let max_health = self.max_health();
        let health = regen_value(
            self.player.health,
            max_health,
            &mut self.player.last_hp_regen,
            now_unix_ms,
            mode.health_regen,
        );
        if health != self.player.health {
            self.player.health = health;
            self.emit_health();
        }

        let max_energy = self.max_energy();
        let energy = regen_value(
            self.player.energy,
            max_energy,
            &mut self.player.last_energy_regen,
            now_unix_ms,
            mode.energy_regen,
        );
        if energy != self.player.energy {
            self.player.energy = energy;
            self.emit_energy();
        }
    }

    fn emit_energy(&mut self) {
        self.events.push(SessionEvent::EnergyChanged {
            energy: self.player.energy,
            max_energy: self.max_energy(),
        });
    }

    fn emit_health(&mut self) {
        self.events.push(SessionEvent::PlayerHealth {
            health: self.player.health,
            max_health: self.max_health(),
        });
    }
}

fn regen_value(current: u32, max: u32, last: &mut u64, now: u64, rule: RegenRule) -> u32 {
    if current >= max || rule.interval_ms == 0 || rule.amount == 0 {
        *last = now.max(*last);
        return current;
    }
    if now <= *last {
        return current;
    }
    let ticks = (now - *last) / rule.interval_ms;
    if ticks == 0 {
        return current;
    }
    let gained = ticks.saturating_mul(u64::from(rule.amount));
    let next = (u64::from(current) + gained).min(u64::from(max)) as u32;
    if next >= max {
        *last = now;
    } else {
        *last += ticks * rule.interval_ms;
    }
    next
}
