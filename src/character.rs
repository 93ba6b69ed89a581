use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-entered concept fields. One live value per session, owned by the UI.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FormState {
    pub archetype: String,
    pub personality_trait: String,
    pub traits: String,
    pub attire: String,
    pub art_style: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Stats {
    pub speed: i64,
    pub strength: i64,
    pub intellect: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        };
        f.write_str(s)
    }
}

/// Full character profile returned by the lore stage. Deserialized strictly:
/// a missing required field rejects the whole value.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CharacterData {
    pub name: String,
    pub class: String,
    pub faction: String,
    pub weapons: Vec<String>,
    pub rarity: Rarity,
    pub personality: String,
    pub backstory: String,
    pub stats: Stats,
    pub voice_line_prompt: String,
}

/// Angle id -> encoded image bytes. A missing key means that angle's
/// generation failed or has not completed; never an error value.
pub type CharacterImages = HashMap<String, Vec<u8>>;

/// A fixed camera perspective for portrait generation.
#[derive(Debug, Clone, Copy)]
pub struct Angle {
    pub id: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
}

pub static ANGLES: [Angle; 4] = [
    Angle {
        id: "front",
        label: "Front",
        prompt: "Front view, facing forward, symmetrical pose",
    },
    Angle {
        id: "three_quarter",
        label: "¾ View",
        prompt: "Three-quarter view, slightly turned",
    },
    Angle {
        id: "side",
        label: "Side",
        prompt: "Side profile view, facing left",
    },
    Angle {
        id: "back",
        label: "Back",
        prompt: "Back view, showing the character from behind",
    },
];

pub const ARCHETYPES: [&str; 10] = [
    "Shadow Assassin",
    "Cyberpunk Samurai",
    "Cosmic Sorcerer",
    "Steampunk Inventor",
    "Post-Apocalyptic Nomad",
    "Forest Guardian",
    "Celestial Knight",
    "Time-Traveling Detective",
    "Bio-Mechanical Android",
    "Deep Sea Paladin",
];

pub const ART_STYLES: [&str; 9] = [
    "Fantasy anime (like Genshin Impact)",
    "Photo-realistic, cinematic lighting",
    "Dark fantasy, gothic (like Dark Souls)",
    "Cyberpunk neon-noir",
    "Classic 16-bit pixel art",
    "Modern cartoon (like The Dragon Prince)",
    "Impressionistic watercolor concept art",
    "Cel-shaded comic book style",
    "Steampunk intricate concept art",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_roundtrip() {
        let r: Rarity = serde_json::from_str("\"Legendary\"").unwrap();
        assert_eq!(r, Rarity::Legendary);
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"Legendary\"");
    }

    #[test]
    fn test_rarity_rejects_unknown_value() {
        let r: Result<Rarity, _> = serde_json::from_str("\"Mythic\"");
        assert!(r.is_err());
    }

    #[test]
    fn test_character_data_rejects_missing_field() {
        // No "backstory" key.
        let json = r#"{
            "name": "Vex",
            "class": "Assassin",
            "faction": "The Veil",
            "weapons": ["Twin daggers"],
            "rarity": "Rare",
            "personality": "Cold, precise",
            "stats": { "speed": 90, "strength": 40, "intellect": 70 },
            "voice_line_prompt": "The shadows are my allies."
        }"#;
        let result: Result<CharacterData, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_angle_ids_are_the_fixed_closed_set() {
        let ids: Vec<&str> = ANGLES.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["front", "three_quarter", "side", "back"]);
    }
}
