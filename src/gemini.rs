use crate::character::{CharacterData, FormState};
use crate::config::Config;
use crate::error::GatewayError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The three generative capabilities the forge depends on, plus the two
/// prompt-assist helpers. Request/response only: no streaming, no caching,
/// and no idempotency guarantee.
#[async_trait]
pub trait GenAiClient: Send + Sync + Debug {
    /// Structured lore generation against the character schema.
    async fn generate_character(&self, base_prompt: &str) -> Result<CharacterData, GatewayError>;

    /// One portrait image for the given prompt, as encoded JPEG bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GatewayError>;

    /// Spoken rendition of the given voice line, as encoded audio bytes.
    async fn generate_speech(&self, text: &str) -> Result<Vec<u8>, GatewayError>;

    /// A fresh character concept for pre-filling the form.
    async fn generate_random_concept(&self) -> Result<RandomConcept, GatewayError>;

    /// A single short suggestion for one form field, given the rest of the form.
    async fn generate_inspiration(
        &self,
        field: InspirationField,
        form: &FormState,
    ) -> Result<String, GatewayError>;
}

pub fn create_client(config: &Config) -> Result<Box<dyn GenAiClient>, GatewayError> {
    if config.gemini.api_key.is_empty() {
        return Err(GatewayError::Configuration(
            "no Gemini API key: set gemini.api_key in config.yml or the GEMINI_API_KEY env var"
                .to_string(),
        ));
    }
    Ok(Box::new(GeminiClient::new(config)))
}

/// Concept fields the model can fill in for a "surprise me" form.
#[derive(Debug, Deserialize, Clone)]
pub struct RandomConcept {
    pub archetype: String,
    pub personality_trait: String,
    pub traits: String,
    pub attire: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspirationField {
    PersonalityTrait,
    Traits,
    Attire,
}

impl InspirationField {
    pub fn key(&self) -> &'static str {
        match self {
            InspirationField::PersonalityTrait => "personality_trait",
            InspirationField::Traits => "traits",
            InspirationField::Attire => "attire",
        }
    }
}

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    text_model: String,
    prompt_model: String,
    image_model: String,
    tts_model: String,
    voice: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.gemini.api_key.clone(),
            text_model: config.gemini.text_model.clone(),
            prompt_model: config.gemini.prompt_model.clone(),
            image_model: config.gemini.image_model.clone(),
            tts_model: config.gemini.tts_model.clone(),
            voice: config.gemini.voice.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GeminiResponse, GatewayError> {
        let url = format!("{}/{}:generateContent?key={}", API_BASE, model, self.api_key);

        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(GatewayError::GenerationFailure(format!(
                "Gemini API returned {}: {}",
                status, body
            )));
        }

        let mut result: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("unparseable API body: {}. Body: {}", e, body))
        })?;

        if let Some(err) = result.error.take() {
            return Err(GatewayError::GenerationFailure(err.message));
        }

        Ok(result)
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate_character(&self, base_prompt: &str) -> Result<CharacterData, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(format!(
                "Based on the following prompt, generate a complete character profile \
                in JSON format. Prompt: \"{}\"",
                base_prompt
            ))],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(character_schema()),
                ..Default::default()
            }),
        };

        let response = self.generate_content(&self.text_model, &request).await?;
        parse_character_payload(&extract_text(&response)?)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GatewayError> {
        let url = format!(
            "{}/{}:predict?key={}",
            API_BASE, self.image_model, self.api_key
        );

        let request = PredictRequest {
            instances: vec![ImageInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters {
                sample_count: 1,
                aspect_ratio: "3:4".to_string(),
                output_mime_type: "image/jpeg".to_string(),
            },
        };

        let resp = self.client.post(&url).json(&request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(GatewayError::GenerationFailure(format!(
                "Imagen API returned {}: {}",
                status, body
            )));
        }

        let result: PredictResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("unparseable API body: {}. Body: {}", e, body))
        })?;

        extract_image_bytes(&result)
    }

    async fn generate_speech(&self, text: &str) -> Result<Vec<u8>, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(format!(
                "Say with a dramatic and serious tone: {}",
                text
            ))],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt(&self.voice)),
                ..Default::default()
            }),
        };

        let response = self.generate_content(&self.tts_model, &request).await?;
        extract_audio_bytes(&response)
    }

    async fn generate_random_concept(&self) -> Result<RandomConcept, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(
                "Generate a creative and unique character concept. Provide an archetype, \
                a core personality trait, key visual traits, and attire as a JSON object. \
                Be imaginative and avoid clichés."
                    .to_string(),
            )],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(random_concept_schema()),
                ..Default::default()
            }),
        };

        let response = self.generate_content(&self.prompt_model, &request).await?;
        parse_concept_payload(&extract_text(&response)?)
    }

    async fn generate_inspiration(
        &self,
        field: InspirationField,
        form: &FormState,
    ) -> Result<String, GatewayError> {
        let prompt = format!(
            "Based on this character concept, give me one creative idea for their \"{}\".\n\
            Concept:\n\
            - Archetype: {}\n\
            - Personality: {}\n\
            - Traits: {}\n\
            - Attire: {}\n\n\
            Your suggestion should be short and punchy (5-15 words). \
            Just return the suggestion text, nothing else.",
            field.key(),
            form.archetype,
            form.personality_trait,
            form.traits,
            form.attire
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: None,
        };

        let response = self.generate_content(&self.prompt_model, &request).await?;
        Ok(extract_text(&response)?.trim().to_string())
    }
}

// --- generateContent wire types ---

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(rename = "responseModalities", skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(rename = "speechConfig", skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
struct SpeechConfig {
    #[serde(rename = "voiceConfig")]
    voice_config: VoiceConfig,
}

impl SpeechConfig {
    fn prebuilt(voice_name: &str) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice_name.to_string(),
                },
            },
        }
    }
}

#[derive(Serialize)]
struct VoiceConfig {
    #[serde(rename = "prebuiltVoiceConfig")]
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
struct PrebuiltVoiceConfig {
    #[serde(rename = "voiceName")]
    voice_name: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

// --- Imagen wire types ---

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<ImageInstance>,
    parameters: ImageParameters,
}

#[derive(Serialize)]
struct ImageInstance {
    prompt: String,
}

#[derive(Serialize)]
struct ImageParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
    #[serde(rename = "outputMimeType")]
    output_mime_type: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

// --- Response schemas ---

fn character_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "A cool and fitting name for the character." },
            "class": { "type": "STRING", "description": "The character's class or role (e.g., Assassin, Mage, Warrior)." },
            "faction": { "type": "STRING", "description": "The faction or group the character belongs to." },
            "weapons": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "An array of 2-3 weapons the character uses."
            },
            "rarity": {
                "type": "STRING",
                "enum": ["Common", "Uncommon", "Rare", "Epic", "Legendary"],
                "description": "The character's rarity level."
            },
            "personality": { "type": "STRING", "description": "A brief description of the character's personality." },
            "backstory": { "type": "STRING", "description": "A short, compelling origin story (2-3 sentences)." },
            "stats": {
                "type": "OBJECT",
                "properties": {
                    "speed": { "type": "INTEGER", "description": "A value from 1 to 100 representing speed/agility." },
                    "strength": { "type": "INTEGER", "description": "A value from 1 to 100 representing physical strength." },
                    "intellect": { "type": "INTEGER", "description": "A value from 1 to 100 representing intelligence/wisdom." }
                },
                "required": ["speed", "strength", "intellect"]
            },
            "voice_line_prompt": { "type": "STRING", "description": "A short, impactful voice line or catchphrase for the character to say." }
        },
        "required": ["name", "class", "faction", "weapons", "rarity", "personality", "backstory", "stats", "voice_line_prompt"]
    })
}

fn random_concept_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "archetype": { "type": "STRING", "description": "A creative and unique character archetype or class." },
            "personality_trait": { "type": "STRING", "description": "A single, defining personality trait." },
            "traits": { "type": "STRING", "description": "Key visual traits, describing physical appearance." },
            "attire": { "type": "STRING", "description": "A description of the character's clothing and gear." }
        },
        "required": ["archetype", "personality_trait", "traits", "attire"]
    })
}

// --- Payload extraction ---

fn extract_text(response: &GeminiResponse) -> Result<String, GatewayError> {
    if let Some(candidates) = &response.candidates {
        if let Some(first) = candidates.first() {
            if let Some(content) = &first.content {
                if let Some(text) = content.parts.iter().find_map(|p| p.text.as_deref()) {
                    return Ok(text.to_string());
                }
            }
            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(GatewayError::InvalidResponse(format!(
                "response has no text content. Finish reason: {}",
                reason
            )));
        }
    }
    Err(GatewayError::InvalidResponse(
        "response has no candidates".to_string(),
    ))
}

fn extract_audio_bytes(response: &GeminiResponse) -> Result<Vec<u8>, GatewayError> {
    let inline = response
        .candidates
        .as_deref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.iter().find_map(|p| p.inline_data.as_ref()));

    match inline {
        Some(data) => BASE64
            .decode(&data.data)
            .map_err(|e| GatewayError::InvalidResponse(format!("undecodable audio data: {}", e))),
        None => Err(GatewayError::GenerationFailure(
            "no audio payload in response".to_string(),
        )),
    }
}

fn extract_image_bytes(response: &PredictResponse) -> Result<Vec<u8>, GatewayError> {
    let encoded = response
        .predictions
        .first()
        .and_then(|p| p.bytes_base64_encoded.as_deref());

    match encoded {
        Some(data) => BASE64
            .decode(data)
            .map_err(|e| GatewayError::InvalidResponse(format!("undecodable image data: {}", e))),
        None => Err(GatewayError::GenerationFailure(
            "no image returned".to_string(),
        )),
    }
}

fn parse_character_payload(text: &str) -> Result<CharacterData, GatewayError> {
    let clean = strip_code_blocks(text);
    serde_json::from_str(&clean).map_err(|e| {
        GatewayError::InvalidResponse(format!("character profile is incomplete: {}", e))
    })
}

fn parse_concept_payload(text: &str) -> Result<RandomConcept, GatewayError> {
    let clean = strip_code_blocks(text);
    serde_json::from_str(&clean)
        .map_err(|e| GatewayError::InvalidResponse(format!("concept is incomplete: {}", e)))
}

/// Models sometimes wrap JSON output in markdown fences despite the JSON
/// response mime type.
pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}
