use crate::character::{CharacterData, CharacterImages, FormState, ANGLES};
use crate::error::GatewayError;
use crate::gemini::GenAiClient;
use crate::prompt::{compose_base_prompt, compose_image_prompt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

/// Everything the UI renders for one generation run. Cleared at the start of
/// the next run.
#[derive(Default)]
pub struct ForgeState {
    pub character: Option<CharacterData>,
    pub images: CharacterImages,
    pub voice_audio: Option<Vec<u8>>,
    pub error: Option<String>,
    /// Free-form progress label, updated before each network call.
    pub stage: Option<String>,
}

pub const STAGE_DONE: &str = "Character forged!";

/// Drives one character generation at a time: lore, then a fan-out of
/// per-angle portraits, then the voice line. Holding the session by `&mut`
/// for the whole run means a second run can never overlap the first.
pub struct ForgeSession {
    client: Box<dyn GenAiClient>,
    state: ForgeState,
    run_counter: u64,
}

impl ForgeSession {
    pub fn new(client: Box<dyn GenAiClient>) -> Self {
        Self {
            client,
            state: ForgeState::default(),
            run_counter: 0,
        }
    }

    pub fn state(&self) -> &ForgeState {
        &self.state
    }

    pub fn client(&self) -> &dyn GenAiClient {
        self.client.as_ref()
    }

    /// Runs the full generation sequence for `form`. Lore and voice failures
    /// abort the run and land in `state.error`; per-angle image failures only
    /// leave gaps in the gallery.
    pub async fn generate(&mut self, form: &FormState) {
        self.run_counter += 1;
        info!("run #{}: starting generation", self.run_counter);
        self.state = ForgeState::default();

        match self.run(form).await {
            Ok(()) => {
                info!("run #{}: complete", self.run_counter);
                self.state.stage = Some(STAGE_DONE.to_string());
            }
            Err(e) => {
                warn!("run #{}: aborted: {}", self.run_counter, e);
                self.state.error = Some(e.to_string());
                self.state.stage = None;
            }
        }
    }

    async fn run(&mut self, form: &FormState) -> Result<(), GatewayError> {
        let base_prompt = compose_base_prompt(form);

        // Stage 1: lore and stats. A failure here aborts before any image or
        // audio work is attempted.
        self.set_stage("Forging personality and lore...");
        let character = self.client.generate_character(&base_prompt).await?;
        info!(
            "run #{}: forged {} ({} {})",
            self.run_counter, character.name, character.rarity, character.class
        );
        self.state.character = Some(character.clone());

        // Stage 2: one portrait per angle, all requests in flight together.
        // Each outcome is observed on its own; failed angles just stay absent.
        let pb = ProgressBar::new(ANGLES.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} views")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let client = self.client.as_ref();
        let mut requests = Vec::with_capacity(ANGLES.len());
        for angle in ANGLES.iter() {
            let label = format!("Rendering {} view...", angle.label.to_lowercase());
            info!("run #{}: {}", self.run_counter, label);
            self.state.stage = Some(label);

            let prompt = compose_image_prompt(&base_prompt, angle);
            let pb = pb.clone();
            requests.push(async move {
                let outcome = client.generate_image(&prompt).await;
                pb.inc(1);
                (angle.id, outcome)
            });
        }

        let settled = futures_util::future::join_all(requests).await;
        pb.finish_and_clear();

        for (angle_id, outcome) in settled {
            match outcome {
                Ok(bytes) => {
                    self.state.images.insert(angle_id.to_string(), bytes);
                }
                Err(e) => warn!(
                    "run #{}: {} view failed, leaving it out: {}",
                    self.run_counter, angle_id, e
                ),
            }
        }

        // Stage 3: voice line, only when the lore stage produced one. Unlike
        // the image stage, a failure here aborts the run.
        if !character.voice_line_prompt.is_empty() {
            self.set_stage("Synthesizing voice...");
            let audio = self
                .client
                .generate_speech(&character.voice_line_prompt)
                .await?;
            self.state.voice_audio = Some(audio);
        }

        Ok(())
    }

    fn set_stage(&mut self, label: &str) {
        info!("run #{}: {}", self.run_counter, label);
        self.state.stage = Some(label.to_string());
    }
}
