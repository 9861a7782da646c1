//! Lobby-phase operations: creating a session, joining by code, readying
//! up, and the DM starting the game.

use core_types::SimRng;

/// Visually unambiguous alphabet — no `0`/`O`, `1`/`I`, etc. — since join
/// codes are read aloud or typed by hand.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const JOIN_CODE_LEN: usize = 6;
const MAX_JOIN_CODE_ATTEMPTS: usize = 10;

pub fn generate_join_code(rng: &mut SimRng) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| {
            let idx = rng.range(0, JOIN_CODE_ALPHABET.len() as i64 - 1) as usize;
            JOIN_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Generates a join code not already claimed by an existing session,
/// retrying on collision. Returns `None` if every attempt collided — with a
/// keyspace of `32^6` that only happens under a pathological `exists` or a
/// test forcing it.
pub fn unique_join_code(rng: &mut SimRng, exists: impl Fn(&str) -> bool) -> Option<String> {
    for _ in 0..MAX_JOIN_CODE_ATTEMPTS {
        let code = generate_join_code(rng);
        if !exists(&code) {
            return Some(code);
        }
    }
    None
}
