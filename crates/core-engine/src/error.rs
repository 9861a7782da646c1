//! The simulation core's own boundary error — distinct from `ActionRejection`,
//! which models routine per-action validation failures the coordinator
//! expects and handles every turn. A `SimError` means setup couldn't produce
//! a legal starting state at all.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("map ({width}x{height}) has only {available} open tiles but {required} units need spawn points")]
    NotEnoughSpawnPoints {
        width: u32,
        height: u32,
        required: usize,
        available: usize,
    },
}
