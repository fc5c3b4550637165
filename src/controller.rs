//! Exercise state machine.
//!
//! Front ends translate user actions into [`Command`]s and get back a list of
//! [`Effect`]s to render or perform. The controller never blocks: the one
//! remote call is returned as [`Effect::RequestChat`] and its outcome comes
//! back as [`Command::ChatCompleted`].

use std::sync::Arc;

use rand::rngs::StdRng;

use crate::{
    config::AppConfig,
    dataset::{Dataset, Stats, generate_random_data},
    i18n::{Language, Notice, message},
    intervals::{Coverage, Interval, build_intervals, check_coverage, parse_number},
    storage::{ExerciseResult, Storage},
    traits::Clock,
    tutor::{
        ApiKey, ChatEntry, ChatSession, Credential, ExerciseContext, HelpType, RequestId,
        TutorError, UserInputs, build_prompt,
    },
    validation::{MarkOutcome, UserMarks, validate_mark},
};

const EXERCISE_TYPE: &str = "Creació d'intervals";
const CURRENT_STEP: &str = "intervals";

#[derive(Debug, Clone)]
pub enum Command {
    GenerateNewData,
    LoadSavedData,
    UpdateIntervals { start: String, amplitude: String },
    ValidateMark { index: usize, raw: String },
    SaveAndAdvance,
    SaveCredential(String),
    ClearCredential,
    SendChat(String),
    /// Ask for a "why" question about the concept behind the current step.
    AskConceptual(String),
    ChatCompleted {
        id: RequestId,
        result: Result<String, TutorError>,
    },
    ChangeLanguage(Language),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify { kind: NoticeKind, notice: Notice },
    /// Advisory only; the exercise can still be completed.
    CoverageWarning { last_upper: f64, max: f64 },
    MarkChecked { index: usize, outcome: MarkOutcome },
    ContinueEnabled(bool),
    Chat(ChatEntry),
    /// Start a tutor call and report back with [`Command::ChatCompleted`].
    RequestChat {
        id: RequestId,
        prompt: String,
        key: ApiKey,
    },
    Advance { exercise_id: String },
}

impl Effect {
    fn success(notice: Notice) -> Self {
        Effect::Notify {
            kind: NoticeKind::Success,
            notice,
        }
    }

    fn error(notice: Notice) -> Self {
        Effect::Notify {
            kind: NoticeKind::Error,
            notice,
        }
    }

    fn info(notice: Notice) -> Self {
        Effect::Notify {
            kind: NoticeKind::Info,
            notice,
        }
    }
}

/// Everything the student sees for the current exercise.
#[derive(Debug, Clone, Default)]
pub struct ExerciseState {
    pub dataset: Dataset,
    pub stats: Stats,
    pub start_input: String,
    pub amplitude_input: String,
    pub intervals: Vec<Interval>,
    pub marks: UserMarks,
    pub continue_enabled: bool,
}

impl ExerciseState {
    fn with_dataset(dataset: Dataset) -> Self {
        Self {
            stats: dataset.stats(),
            dataset,
            ..Self::default()
        }
    }

    fn clear_intervals(&mut self) {
        self.intervals.clear();
        self.marks.clear();
    }
}

pub struct ExerciseController {
    config: Arc<AppConfig>,
    storage: Storage,
    clock: Arc<dyn Clock>,
    rng: StdRng,

    state: ExerciseState,
    credential: Credential,
    language: Language,
    chat: ChatSession,
}

impl ExerciseController {
    /// Restore or create the working dataset and load saved preferences.
    pub fn new(
        config: Arc<AppConfig>,
        storage: Storage,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> (Self, Vec<Effect>) {
        let chat = ChatSession::new(config.tutor.history_limit);
        let mut controller = Self {
            config,
            storage,
            clock,
            rng,
            state: ExerciseState::default(),
            credential: Credential::Unconfigured,
            language: Language::default(),
            chat,
        };

        let mut effects = Vec::new();
        controller.credential = controller.storage.load_credential().unwrap_or_else(|e| {
            tracing::warn!("Could not read stored credential: {}", e);
            Credential::Unconfigured
        });
        controller.install_configured_key();
        controller.language = controller
            .storage
            .load_language()
            .unwrap_or_else(|e| {
                tracing::warn!("Could not read language preference: {}", e);
                None
            })
            .unwrap_or_default();

        match controller.restore_dataset() {
            Some(dataset) => {
                tracing::info!("Restored dataset of {} values", dataset.len());
                controller.state = ExerciseState::with_dataset(dataset);
                effects.push(Effect::info(Notice::DataRestored));
            }
            None => effects.extend(controller.generate_new_data()),
        }

        if controller.credential.is_configured() {
            effects.push(Effect::info(Notice::TutorOnline));
        }

        (controller, effects)
    }

    /// A valid key from configuration replaces whatever the local store has.
    fn install_configured_key(&mut self) {
        let Some(raw) = self.config.tutor.api_key.as_deref() else {
            return;
        };
        match ApiKey::parse(raw) {
            Ok(key) => {
                if let Err(e) = self.storage.save_credential(&key) {
                    tracing::warn!("Could not store configured API key: {}", e);
                }
                self.credential = Credential::Configured(key);
            }
            Err(e) => tracing::warn!("Ignoring configured API key: {}", e),
        }
    }

    fn restore_dataset(&self) -> Option<Dataset> {
        self.storage
            .load_recent_dataset()
            .unwrap_or_else(|e| {
                tracing::warn!("Could not read saved dataset: {}", e);
                None
            })
            .filter(|dataset| !dataset.is_empty())
    }

    pub fn update(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::GenerateNewData => self.generate_new_data(),
            Command::LoadSavedData => match self.restore_dataset() {
                Some(dataset) => {
                    tracing::info!("Loaded saved dataset of {} values", dataset.len());
                    self.replace_dataset(dataset);
                    let mut effects = vec![Effect::success(Notice::DataRestored)];
                    effects.extend(self.refresh_gate());
                    effects
                }
                None => vec![Effect::info(Notice::NoRecentData)],
            },
            Command::UpdateIntervals { start, amplitude } => {
                self.update_intervals(start, amplitude)
            }
            Command::ValidateMark { index, raw } => self.validate_mark(index, &raw),
            Command::SaveAndAdvance => self.save_and_advance(),
            Command::SaveCredential(raw) => match ApiKey::parse(&raw) {
                Ok(key) => {
                    if let Err(e) = self.storage.save_credential(&key) {
                        tracing::warn!("API key kept in memory only: {}", e);
                    }
                    self.credential = Credential::Configured(key);
                    vec![Effect::success(Notice::CredentialSaved)]
                }
                Err(e) => {
                    tracing::debug!("Rejected API key: {}", e);
                    vec![Effect::error(Notice::CredentialInvalid)]
                }
            },
            Command::ClearCredential => {
                if let Err(e) = self.storage.clear_credential() {
                    tracing::warn!("Could not remove stored API key: {}", e);
                }
                self.credential = Credential::Unconfigured;
                vec![Effect::info(Notice::CredentialCleared)]
            }
            Command::SendChat(text) => self.send_chat(&text, HelpType::Contextual),
            Command::AskConceptual(text) => self.send_chat(&text, HelpType::Conceptual),
            Command::ChatCompleted { id, result } => {
                if let Err(e) = &result {
                    tracing::warn!("Tutor request {} failed: {}", id, e);
                }
                let now = self.clock.now_millis();
                self.chat
                    .complete(id, result, now)
                    .map(Effect::Chat)
                    .into_iter()
                    .collect()
            }
            Command::ChangeLanguage(language) => {
                if let Err(e) = self.storage.save_language(language) {
                    tracing::warn!("Could not store language preference: {}", e);
                }
                self.language = language;
                vec![Effect::success(Notice::LanguageChanged)]
            }
        }
    }

    fn generate_new_data(&mut self) -> Vec<Effect> {
        let dataset = generate_random_data(&self.config.dataset, &mut self.rng);
        tracing::info!("Generated dataset of {} values", dataset.len());

        if let Err(e) = self.storage.save_dataset(&dataset) {
            tracing::warn!("Dataset kept in memory only: {}", e);
        }
        self.replace_dataset(dataset);

        let mut effects = vec![Effect::success(Notice::NewDataGenerated)];
        effects.extend(self.refresh_gate());
        effects
    }

    /// New data invalidates the form, the intervals and the tutor's memory.
    fn replace_dataset(&mut self, dataset: Dataset) {
        self.state = ExerciseState {
            continue_enabled: self.state.continue_enabled,
            ..ExerciseState::with_dataset(dataset)
        };
        self.chat.reset_history();
    }

    fn update_intervals(&mut self, start: String, amplitude: String) -> Vec<Effect> {
        self.state.clear_intervals();

        if let (Some(start), Some(amplitude)) = (parse_number(&start), parse_number(&amplitude)) {
            self.state.intervals =
                build_intervals(start, amplitude, self.config.exercise.interval_count);
        }
        self.state.start_input = start;
        self.state.amplitude_input = amplitude;
        tracing::debug!("Built {} intervals", self.state.intervals.len());

        let mut effects = Vec::new();
        if let Coverage::NotCovered { last_upper, max } =
            check_coverage(&self.state.intervals, &self.state.stats)
        {
            effects.push(Effect::CoverageWarning { last_upper, max });
        }
        effects.extend(self.refresh_gate());
        effects
    }

    fn validate_mark(&mut self, index: usize, raw: &str) -> Vec<Effect> {
        let Some(interval) = self.state.intervals.get(index) else {
            tracing::debug!("Mark for missing interval {}", index);
            return Vec::new();
        };

        let outcome = validate_mark(raw, interval, self.config.exercise.tolerance);
        self.state.marks.record(index, outcome);

        let mut effects = vec![Effect::MarkChecked { index, outcome }];
        effects.extend(self.refresh_gate());
        effects
    }

    /// Recompute the continue gate and report transitions.
    fn refresh_gate(&mut self) -> Vec<Effect> {
        let all_correct = self.state.marks.all_correct(&self.state.intervals);
        if all_correct == self.state.continue_enabled {
            return Vec::new();
        }

        self.state.continue_enabled = all_correct;
        let mut effects = vec![Effect::ContinueEnabled(all_correct)];
        if all_correct {
            effects.push(Effect::success(Notice::AllCorrect));
        }
        effects
    }

    fn save_and_advance(&mut self) -> Vec<Effect> {
        if !self.state.marks.all_correct(&self.state.intervals) {
            return vec![Effect::error(Notice::MarksIncomplete)];
        }

        let result = ExerciseResult {
            completed: true,
            dataset: self.state.dataset.clone(),
            intervals: self.state.intervals.clone(),
            user_marks: self.state.marks.clone(),
            timestamp: self.clock.now_millis(),
        };
        let exercise_id = &self.config.exercise.id;
        if let Err(e) = self.storage.save_results(exercise_id, result) {
            tracing::warn!("Could not save results for {}: {}", exercise_id, e);
        } else {
            tracing::info!("Saved results for {}", exercise_id);
        }

        vec![
            Effect::success(Notice::ExerciseSaved),
            Effect::Advance {
                exercise_id: self.config.exercise.next_exercise.clone(),
            },
        ]
    }

    fn send_chat(&mut self, text: &str, help_type: HelpType) -> Vec<Effect> {
        let question = text.trim();
        if question.is_empty() {
            return Vec::new();
        }

        let Some(key) = self.credential.key().cloned() else {
            let text = message(Notice::CredentialMissing, self.language);
            return vec![Effect::Chat(self.chat.system_message(text))];
        };

        let prompt = build_prompt(
            self.config.tutor.level,
            help_type,
            self.language,
            Some(&self.exercise_context()),
            question,
        );
        let id = self.chat.begin(question);
        tracing::debug!("Tutor request {} queued", id);

        let mut effects: Vec<Effect> = self
            .chat
            .transcript()
            .iter()
            .rev()
            .take(2)
            .rev()
            .cloned()
            .map(Effect::Chat)
            .collect();
        effects.push(Effect::RequestChat { id, prompt, key });
        effects
    }

    /// Snapshot of the exercise for the tutor prompt.
    pub fn exercise_context(&self) -> ExerciseContext {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        ExerciseContext {
            exercise_type: EXERCISE_TYPE.to_string(),
            data: self.state.dataset.values().to_vec(),
            stats: self.state.stats,
            current_step: CURRENT_STEP.to_string(),
            user_inputs: UserInputs {
                start: non_empty(&self.state.start_input),
                amplitude: non_empty(&self.state.amplitude_input),
                marks: self.state.marks.clone(),
                intervals_generated: !self.state.intervals.is_empty(),
            },
        }
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }
}
