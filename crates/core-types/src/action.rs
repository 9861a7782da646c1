//! Player actions and the reasons the simulation core can reject one.

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::ids::{AbilityId, UnitId};

/// An action a player (or, for NPC-controlled units, the AI policy) submits
/// against the acting unit's turn. Validated and applied by
/// `core_engine::action_pipeline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move {
        unit_id: UnitId,
        path: Vec<Position>,
    },
    Attack {
        unit_id: UnitId,
        target_id: UnitId,
    },
    UseAbility {
        unit_id: UnitId,
        ability_id: AbilityId,
        target_id: Option<UnitId>,
        target_position: Option<Position>,
    },
    EndTurn {
        unit_id: UnitId,
    },
}

impl Action {
    /// The unit this action is submitted on behalf of, for turn-ownership
    /// checks before any other validation runs.
    pub fn unit_id(&self) -> UnitId {
        match self {
            Action::Move { unit_id, .. } => *unit_id,
            Action::Attack { unit_id, .. } => *unit_id,
            Action::UseAbility { unit_id, .. } => *unit_id,
            Action::EndTurn { unit_id } => *unit_id,
        }
    }
}

/// Why `validate_action` rejected an action. Finite and stable: clients match
/// on these strings, so variants are never removed or renamed once shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRejection {
    NotInProgress,
    NotYourTurn,
    NotYourUnit,
    UnitNotFound,
    TargetNotFound,
    TargetDead,
    OutOfRange,
    NoLineOfSight,
    AlreadyActed,
    InsufficientMoves,
    InvalidPath,
    BlockedTile,
    UnknownAbility,
}
