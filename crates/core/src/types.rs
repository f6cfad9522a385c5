use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a cell inside [`crate::mapgen::FloorData::cells`].
pub type CellId = usize;

macro_rules! template_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub String);

            impl $name {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(id: &str) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

template_id!(EnemyId, AltarId, TrapId, PlayerId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatMove {
    Strike,
    Guard,
    Feint,
}

impl CombatMove {
    pub const ALL: [CombatMove; 3] = [CombatMove::Strike, CombatMove::Guard, CombatMove::Feint];

    /// Strike breaks a feint, a feint slips past a guard, a guard absorbs a strike.
    pub fn beats(self, other: CombatMove) -> bool {
        matches!(
            (self, other),
            (CombatMove::Strike, CombatMove::Feint)
                | (CombatMove::Feint, CombatMove::Guard)
                | (CombatMove::Guard, CombatMove::Strike)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Dexterity,
    Intellect,
    Stamina,
}

/// Consumables a loot tile can hand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootKind {
    Key,
    Potion,
    Scroll,
    Experience,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LootDrop {
    pub kind: LootKind,
    pub amount: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_move_beats_exactly_one_other_move() {
        for mv in CombatMove::ALL {
            let wins = CombatMove::ALL.iter().filter(|&&other| mv.beats(other)).count();
            let losses = CombatMove::ALL.iter().filter(|&&other| other.beats(mv)).count();
            assert_eq!(wins, 1, "{mv:?} should beat exactly one move");
            assert_eq!(losses, 1, "{mv:?} should lose to exactly one move");
            assert!(!mv.beats(mv));
        }
    }

    #[test]
    fn template_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&EnemyId::new("slime")).unwrap();
        assert_eq!(json, "\"slime\"");
    }
}
