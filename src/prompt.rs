use crate::character::{Angle, FormState};

/// Builds the base description every generation stage shares. Pure string
/// interpolation; user text is carried through verbatim.
pub fn compose_base_prompt(form: &FormState) -> String {
    format!(
        "A full-body character concept of a {}. \
        Personality: {}. \
        Key traits: {}. \
        Attire: {}. \
        Art style: {}, high detail, dramatic lighting.",
        form.archetype, form.personality_trait, form.traits, form.attire, form.art_style
    )
}

pub fn compose_image_prompt(base_prompt: &str, angle: &Angle) -> String {
    format!("{}. {}.", base_prompt, angle.prompt)
}
