//! Disconnect/reconnect bookkeeping for a session's roster.
//!
//! A dropped socket doesn't immediately remove a player: it starts a grace
//! window (longer for the DM, since losing the DM stalls everyone) during
//! which a reconnect is a no-op resume. If the window lapses the player is
//! dropped from the roster for good.

use std::time::Duration;

use core_types::{PlayerConnStatus, SessionConfig, SessionStatus, UserId};
use session_store::SessionRecord;

pub fn grace_period_for(is_dm: bool, config: &SessionConfig) -> Duration {
    let secs = if is_dm {
        config.dm_reconnect_grace_secs
    } else {
        config.reconnect_grace_secs
    };
    Duration::from_secs(secs as u64)
}

/// Marks `user_id` disconnected. Returns `true` if this was the DM, in
/// which case the caller should pause the session (no turn timer ticking,
/// no actions accepted) until they return or the grace window lapses.
pub fn on_disconnect(record: &mut SessionRecord, user_id: UserId) -> bool {
    let is_dm = record.dm_user_id == user_id;
    for player in record.players.iter_mut() {
        if player.user_id == user_id {
            player.conn_status = PlayerConnStatus::Disconnected;
        }
    }
    if is_dm && record.status == SessionStatus::Playing {
        record.status = SessionStatus::Paused;
    }
    is_dm
}

/// Marks `user_id` connected again, unpausing the session if they were the
/// paused-on DM. Returns `true` if a reconnect was actually applied (the
/// user was still on the roster, not already dropped by an expired grace
/// window).
pub fn on_reconnect(record: &mut SessionRecord, user_id: UserId) -> bool {
    let Some(player) = record.players.iter_mut().find(|p| p.user_id == user_id) else {
        return false;
    };
    player.conn_status = PlayerConnStatus::Connected;
    if record.dm_user_id == user_id && record.status == SessionStatus::Paused {
        record.status = SessionStatus::Playing;
    }
    true
}

/// Grace window lapsed with no reconnect: drop the player from the roster
/// unless they reconnected in the meantime. Returns `true` if the player
/// was removed.
pub fn on_grace_expired(record: &mut SessionRecord, user_id: UserId) -> bool {
    let still_disconnected = record
        .players
        .iter()
        .any(|p| p.user_id == user_id && p.conn_status == PlayerConnStatus::Disconnected);
    if !still_disconnected {
        return false;
    }
    record.players.retain(|p| p.user_id != user_id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_engine::setup::{generate_game_state, PlayerSeat};
    use core_types::CharacterClass;
    use session_store::SessionPlayer;

    fn seeded_record(dm: UserId, other: UserId) -> SessionRecord {
        let config = SessionConfig::default();
        let seats = vec![
            PlayerSeat { user_id: dm, class: CharacterClass::Warrior, name: "dm".into() },
            PlayerSeat { user_id: other, class: CharacterClass::Mage, name: "mage".into() },
        ];
        SessionRecord {
            id: core_types::SessionId::new(),
            join_code: "DCTEST".into(),
            status: SessionStatus::Playing,
            state: generate_game_state(&config, 4, &seats).unwrap(),
            config,
            state_version: 0,
            players: vec![
                SessionPlayer { user_id: dm, character_id: None, unit_id: None, conn_status: PlayerConnStatus::Connected, is_dm: true, ready: true },
                SessionPlayer { user_id: other, character_id: None, unit_id: None, conn_status: PlayerConnStatus::Connected, is_dm: false, ready: true },
            ],
            dm_user_id: dm,
            created_at_ms: 0,
        }
    }

    #[test]
    fn dm_disconnect_pauses_a_playing_session() {
        let dm = UserId::new();
        let other = UserId::new();
        let mut record = seeded_record(dm, other);
        let was_dm = on_disconnect(&mut record, dm);
        assert!(was_dm);
        assert_eq!(record.status, SessionStatus::Paused);
    }

    #[test]
    fn player_disconnect_does_not_pause() {
        let dm = UserId::new();
        let other = UserId::new();
        let mut record = seeded_record(dm, other);
        let was_dm = on_disconnect(&mut record, other);
        assert!(!was_dm);
        assert_eq!(record.status, SessionStatus::Playing);
    }

    #[test]
    fn reconnect_before_grace_expiry_resumes_a_paused_session() {
        let dm = UserId::new();
        let other = UserId::new();
        let mut record = seeded_record(dm, other);
        on_disconnect(&mut record, dm);
        let applied = on_reconnect(&mut record, dm);
        assert!(applied);
        assert_eq!(record.status, SessionStatus::Playing);
    }

    #[test]
    fn grace_expiry_without_reconnect_drops_the_player() {
        let dm = UserId::new();
        let other = UserId::new();
        let mut record = seeded_record(dm, other);
        on_disconnect(&mut record, other);
        let removed = on_grace_expired(&mut record, other);
        assert!(removed);
        assert!(!record.players.iter().any(|p| p.user_id == other));
    }

    #[test]
    fn grace_expiry_after_reconnect_is_a_no_op() {
        let dm = UserId::new();
        let other = UserId::new();
        let mut record = seeded_record(dm, other);
        on_disconnect(&mut record, other);
        on_reconnect(&mut record, other);
        let removed = on_grace_expired(&mut record, other);
        assert!(!removed);
        assert!(record.players.iter().any(|p| p.user_id == other));
    }

    #[test]
    fn dm_grace_period_differs_from_player_grace_period() {
        let mut config = SessionConfig::default();
        config.reconnect_grace_secs = 30;
        config.dm_reconnect_grace_secs = 120;
        assert_ne!(grace_period_for(true, &config), grace_period_for(false, &config));
    }
}
