//! Static data tables for the session runtime: ability catalog and
//! character-class starting stats. No simulation logic — that lives in
//! `core_engine`.

pub mod abilities;
pub mod classes;

pub use abilities::{Ability, AbilityRegistry, TargetKind};
pub use classes::starting_stats;
