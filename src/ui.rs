use crate::bundle::build_bundle;
use crate::character::{FormState, ANGLES, ARCHETYPES, ART_STYLES};
use crate::config::Config;
use crate::forge::ForgeState;
use crate::gemini::{GenAiClient, InspirationField};
use anyhow::{Context, Result};
use inquire::{Confirm, Select, Text};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

const CUSTOM_OPTION: &str = "Other (type your own)";
const INSPIRE_HELP: &str = "type ? for an AI suggestion";

/// Walks the user through the character form. Entering `?` in a free-text
/// field asks the model for a suggestion and offers it as the new initial
/// value.
pub async fn collect_form(client: &dyn GenAiClient) -> Result<FormState> {
    let mut form = FormState::default();

    let randomize = Confirm::new("Start from an AI-generated concept?")
        .with_default(false)
        .prompt()?;

    if randomize {
        match client.generate_random_concept().await {
            Ok(concept) => {
                form.archetype = concept.archetype;
                form.personality_trait = concept.personality_trait;
                form.traits = concept.traits;
                form.attire = concept.attire;
            }
            Err(e) => warn!("random concept unavailable, starting blank: {}", e),
        }
    }

    form.archetype = if form.archetype.is_empty() {
        let mut options: Vec<&str> = ARCHETYPES.to_vec();
        options.push(CUSTOM_OPTION);
        let choice = Select::new("Archetype:", options).prompt()?;
        if choice == CUSTOM_OPTION {
            Text::new("Custom archetype:").prompt()?
        } else {
            choice.to_string()
        }
    } else {
        Text::new("Archetype:")
            .with_initial_value(&form.archetype)
            .prompt()?
    };

    form.personality_trait = prompt_field(
        client,
        &form,
        InspirationField::PersonalityTrait,
        "Personality:",
        form.personality_trait.clone(),
    )
    .await?;
    form.traits = prompt_field(
        client,
        &form,
        InspirationField::Traits,
        "Key visual traits:",
        form.traits.clone(),
    )
    .await?;
    form.attire = prompt_field(
        client,
        &form,
        InspirationField::Attire,
        "Attire:",
        form.attire.clone(),
    )
    .await?;

    form.art_style = Select::new("Art style:", ART_STYLES.to_vec())
        .prompt()?
        .to_string();

    Ok(form)
}

async fn prompt_field(
    client: &dyn GenAiClient,
    form: &FormState,
    field: InspirationField,
    label: &str,
    mut initial: String,
) -> Result<String> {
    loop {
        let input = Text::new(label)
            .with_initial_value(&initial)
            .with_help_message(INSPIRE_HELP)
            .prompt()?;

        if input.trim() != "?" {
            return Ok(input);
        }

        match client.generate_inspiration(field, form).await {
            Ok(suggestion) => initial = suggestion,
            Err(e) => {
                warn!("inspiration unavailable: {}", e);
                initial.clear();
            }
        }
    }
}

/// Renders the character sheet for the current run as plain text.
pub fn render_sheet(state: &ForgeState) -> String {
    if let Some(error) = &state.error {
        return format!("Generation failed: {}\n", error);
    }

    let Some(character) = &state.character else {
        return "No character generated yet.\n".to_string();
    };

    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", character.name));
    out.push_str(&format!(
        "{} {} of {}\n",
        character.rarity, character.class, character.faction
    ));
    out.push_str(&format!("Weapons: {}\n", character.weapons.join(", ")));
    out.push_str(&format!(
        "Stats: speed {} / strength {} / intellect {}\n",
        character.stats.speed, character.stats.strength, character.stats.intellect
    ));
    out.push_str(&format!("Personality: {}\n", character.personality));
    out.push_str(&format!("Backstory: {}\n", character.backstory));
    if !character.voice_line_prompt.is_empty() {
        out.push_str(&format!("Voice line: \"{}\"\n", character.voice_line_prompt));
    }

    out.push_str("Portraits: ");
    let rendered: Vec<&str> = ANGLES
        .iter()
        .filter(|a| state.images.contains_key(a.id))
        .map(|a| a.label)
        .collect();
    if rendered.is_empty() {
        out.push_str("none\n");
    } else {
        out.push_str(&format!("{} of {}\n", rendered.len(), ANGLES.len()));
    }
    out.push_str(&format!(
        "Voice audio: {}\n",
        if state.voice_audio.is_some() {
            "ready"
        } else {
            "absent"
        }
    ));

    out
}

/// Writes metadata.json into the output folder, plus the raw portrait and
/// voice bytes under the filenames the bundle lists, so the folder contents
/// match the document exactly.
pub fn export_bundle(config: &Config, state: &ForgeState) -> Result<PathBuf> {
    let character = state
        .character
        .as_ref()
        .context("nothing to export: no character generated")?;

    let bundle = build_bundle(character, &state.images);
    let out_dir = Path::new(&config.output_folder);
    fs::create_dir_all(out_dir)?;

    let metadata_path = out_dir.join("metadata.json");
    fs::write(&metadata_path, serde_json::to_string_pretty(&bundle)?)
        .with_context(|| format!("Failed to write {}", metadata_path.display()))?;

    for (angle, filename) in ANGLES
        .iter()
        .filter(|a| state.images.contains_key(a.id))
        .zip(bundle.image_set.iter())
    {
        fs::write(out_dir.join(filename), &state.images[angle.id])?;
    }

    if let Some(audio) = &state.voice_audio {
        fs::write(out_dir.join(&bundle.voice_line_file), audio)?;
    }

    Ok(metadata_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterData, Rarity, Stats};
    use crate::config::GeminiConfig;

    fn populated_state() -> ForgeState {
        let mut state = ForgeState::default();
        state.character = Some(CharacterData {
            name: "Shadow Fox".to_string(),
            class: "Assassin".to_string(),
            faction: "The Umbral Court".to_string(),
            weapons: vec!["Twin daggers".to_string()],
            rarity: Rarity::Epic,
            personality: "Cold, precise".to_string(),
            backstory: "Raised in the undercity.".to_string(),
            stats: Stats {
                speed: 95,
                strength: 42,
                intellect: 77,
            },
            voice_line_prompt: "The shadows are my allies.".to_string(),
        });
        state.images.insert("front".to_string(), vec![1, 2, 3]);
        state.images.insert("side".to_string(), vec![4, 5]);
        state.voice_audio = Some(vec![9, 9]);
        state
    }

    #[test]
    fn test_render_sheet_lists_core_fields() {
        let sheet = render_sheet(&populated_state());
        assert!(sheet.contains("Shadow Fox"));
        assert!(sheet.contains("Epic Assassin of The Umbral Court"));
        assert!(sheet.contains("2 of 4"));
        assert!(sheet.contains("Voice audio: ready"));
    }

    #[test]
    fn test_render_sheet_shows_error() {
        let mut state = ForgeState::default();
        state.error = Some("the model returned an invalid response".to_string());
        let sheet = render_sheet(&state);
        assert!(sheet.contains("Generation failed"));
    }

    #[test]
    fn test_export_writes_metadata_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_folder: dir.path().to_string_lossy().to_string(),
            gemini: GeminiConfig::default(),
        };

        let path = export_bundle(&config, &populated_state()).unwrap();
        assert!(path.ends_with("metadata.json"));

        let metadata: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(metadata["image_set"][0], "Shadow_Fox_front.png");
        assert_eq!(metadata["voice_line_file"], "Shadow_Fox_voice.mp3");

        assert_eq!(
            fs::read(dir.path().join("Shadow_Fox_front.png")).unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(
            fs::read(dir.path().join("Shadow_Fox_side.png")).unwrap(),
            vec![4, 5]
        );
        assert_eq!(
            fs::read(dir.path().join("Shadow_Fox_voice.mp3")).unwrap(),
            vec![9, 9]
        );
    }

    #[test]
    fn test_export_without_character_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_folder: dir.path().to_string_lossy().to_string(),
            gemini: GeminiConfig::default(),
        };
        assert!(export_bundle(&config, &ForgeState::default()).is_err());
    }
}
