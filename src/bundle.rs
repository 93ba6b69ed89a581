use crate::character::{CharacterData, CharacterImages, ANGLES};
use serde::Serialize;

/// The exported metadata document: the full character profile plus the
/// expected filename for every generated asset. Field names and filename
/// patterns are a compatibility contract; do not rename.
#[derive(Debug, Serialize)]
pub struct ExportBundle {
    #[serde(flatten)]
    pub character: CharacterData,
    pub image_set: Vec<String>,
    pub voice_line_file: String,
}

/// Builds the bundle for the current run. Pure: lists filenames in fixed
/// angle order for the angles that actually produced an image, and never
/// touches the image or audio bytes themselves.
pub fn build_bundle(character: &CharacterData, images: &CharacterImages) -> ExportBundle {
    let stem = filename_stem(&character.name);

    let image_set = ANGLES
        .iter()
        .filter(|angle| images.contains_key(angle.id))
        .map(|angle| format!("{}_{}.png", stem, angle.id))
        .collect();

    ExportBundle {
        character: character.clone(),
        image_set,
        voice_line_file: format!("{}_voice.mp3", stem),
    }
}

fn filename_stem(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Rarity, Stats};
    use std::collections::HashMap;

    fn shadow_fox() -> CharacterData {
        CharacterData {
            name: "Shadow Fox".to_string(),
            class: "Assassin".to_string(),
            faction: "The Umbral Court".to_string(),
            weapons: vec!["Twin daggers".to_string(), "Throwing knives".to_string()],
            rarity: Rarity::Epic,
            personality: "Cold, precise, loyal".to_string(),
            backstory: "Raised in the undercity.".to_string(),
            stats: Stats {
                speed: 95,
                strength: 42,
                intellect: 77,
            },
            voice_line_prompt: "The shadows are my allies.".to_string(),
        }
    }

    #[test]
    fn test_bundle_filenames_for_partial_gallery() {
        let mut images: CharacterImages = HashMap::new();
        images.insert("front".to_string(), vec![1]);
        images.insert("side".to_string(), vec![2]);

        let bundle = build_bundle(&shadow_fox(), &images);
        assert_eq!(
            bundle.image_set,
            vec!["Shadow_Fox_front.png", "Shadow_Fox_side.png"]
        );
        assert_eq!(bundle.voice_line_file, "Shadow_Fox_voice.mp3");
    }

    #[test]
    fn test_image_set_keeps_fixed_angle_order() {
        let mut images: CharacterImages = HashMap::new();
        // Insertion order deliberately scrambled.
        for id in ["back", "front", "three_quarter", "side"] {
            images.insert(id.to_string(), vec![]);
        }

        let bundle = build_bundle(&shadow_fox(), &images);
        assert_eq!(
            bundle.image_set,
            vec![
                "Shadow_Fox_front.png",
                "Shadow_Fox_three_quarter.png",
                "Shadow_Fox_side.png",
                "Shadow_Fox_back.png"
            ]
        );
    }

    #[test]
    fn test_empty_gallery_yields_empty_image_set() {
        let bundle = build_bundle(&shadow_fox(), &HashMap::new());
        assert!(bundle.image_set.is_empty());
        assert_eq!(bundle.voice_line_file, "Shadow_Fox_voice.mp3");
    }

    #[test]
    fn test_whitespace_runs_collapse_to_single_underscores() {
        let mut character = shadow_fox();
        character.name = "  Vex   of the\tVeil ".to_string();
        let bundle = build_bundle(&character, &HashMap::new());
        assert_eq!(bundle.voice_line_file, "Vex_of_the_Veil_voice.mp3");
    }

    #[test]
    fn test_bundle_json_shape_matches_contract() {
        let mut images: CharacterImages = HashMap::new();
        images.insert("front".to_string(), vec![1]);

        let bundle = build_bundle(&shadow_fox(), &images);
        let value = serde_json::to_value(&bundle).unwrap();

        // Character fields are flattened to the top level.
        assert_eq!(value["name"], "Shadow Fox");
        assert_eq!(value["class"], "Assassin");
        assert_eq!(value["rarity"], "Epic");
        assert_eq!(value["stats"]["intellect"], 77);
        assert_eq!(value["voice_line_prompt"], "The shadows are my allies.");
        assert_eq!(value["image_set"][0], "Shadow_Fox_front.png");
        assert_eq!(value["voice_line_file"], "Shadow_Fox_voice.mp3");
    }
}
