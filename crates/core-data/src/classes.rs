//! Starting stats per character class, used when a player's character joins
//! a session for the first time and needs a unit minted on the map.

use core_types::{CharacterClass, Stats};

/// Base combat stats for a freshly created unit of the given class. Sessions
/// don't currently scale these by character level — see open questions in
/// the design notes.
pub fn starting_stats(class: CharacterClass) -> Stats {
    match class {
        CharacterClass::Warrior => Stats {
            hp: 40,
            max_hp: 40,
            attack: 8,
            defense: 4,
            attack_range: 1,
            move_range: 3,
            initiative: 4,
        },
        CharacterClass::Ranger => Stats {
            hp: 28,
            max_hp: 28,
            attack: 6,
            defense: 2,
            attack_range: 4,
            move_range: 4,
            initiative: 7,
        },
        CharacterClass::Mage => Stats {
            hp: 22,
            max_hp: 22,
            attack: 4,
            defense: 1,
            attack_range: 3,
            move_range: 3,
            initiative: 6,
        },
        CharacterClass::Rogue => Stats {
            hp: 26,
            max_hp: 26,
            attack: 7,
            defense: 2,
            attack_range: 1,
            move_range: 5,
            initiative: 9,
        },
    }
}
