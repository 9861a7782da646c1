//! Turns a finished session's final state into a durable archive plus the
//! xp award for each player in the roster.

use core_types::{CombatPhase, UnitType};
use session_store::{RewardLine, SessionArchive, SessionRecord};

/// Every roster player earns the same award — this ruleset splits by combat
/// outcome, not by individual contribution.
pub fn build_archive(record: &SessionRecord, ended_at_ms: i64) -> SessionArchive {
    let victory = record.state.combat.phase == CombatPhase::Victory;
    let monsters_slain = record
        .state
        .units
        .iter()
        .filter(|u| u.unit_type == UnitType::Monster && !u.is_alive())
        .count() as u32;
    let xp = core_engine::rewards::compute_xp(monsters_slain, record.config.difficulty);
    let gold = core_engine::rewards::compute_gold(monsters_slain, record.config.difficulty);

    let rewards = record
        .players
        .iter()
        .map(|p| RewardLine {
            user_id: p.user_id,
            xp_awarded: if victory { xp } else { xp / 2 },
            gold_awarded: if victory { gold } else { gold / 2 },
        })
        .collect();

    SessionArchive {
        session_id: record.id,
        ended_at_ms,
        victory,
        rewards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_engine::setup::{generate_game_state, PlayerSeat};
    use core_types::{CharacterClass, SessionConfig, SessionStatus, UserId};
    use session_store::SessionPlayer;

    fn record_with(victory: bool) -> SessionRecord {
        let config = SessionConfig::default();
        let owner = UserId::new();
        let seats = vec![PlayerSeat {
            user_id: owner,
            class: CharacterClass::Warrior,
            name: "hero".into(),
        }];
        let mut state = generate_game_state(&config, 11, &seats).unwrap();
        if victory {
            for unit in state.units.iter_mut().filter(|u| u.unit_type == UnitType::Monster) {
                unit.stats.hp = 0;
            }
            state.combat.phase = CombatPhase::Victory;
        } else {
            state.combat.phase = CombatPhase::Defeat;
        }

        SessionRecord {
            id: core_types::SessionId::new(),
            join_code: "ARCHIV".into(),
            status: SessionStatus::Ended,
            state,
            config,
            state_version: 1,
            players: vec![session_store_player(owner)],
            dm_user_id: owner,
            created_at_ms: 0,
        }
    }

    fn session_store_player(user_id: UserId) -> SessionPlayer {
        SessionPlayer {
            user_id,
            character_id: None,
            unit_id: None,
            conn_status: core_types::PlayerConnStatus::Connected,
            is_dm: true,
            ready: true,
        }
    }

    #[test]
    fn victory_awards_full_xp_to_every_player() {
        let record = record_with(true);
        let archive = build_archive(&record, 1000);
        assert!(archive.victory);
        assert_eq!(archive.rewards.len(), 1);
        assert!(archive.rewards[0].xp_awarded > 0);
    }

    #[test]
    fn defeat_awards_half_xp() {
        let victory = record_with(true);
        let defeat = record_with(false);
        let victory_archive = build_archive(&victory, 1000);
        let defeat_archive = build_archive(&defeat, 1000);
        assert_eq!(defeat_archive.rewards[0].xp_awarded, 0);
        assert!(victory_archive.rewards[0].xp_awarded > defeat_archive.rewards[0].xp_awarded);
    }
}
