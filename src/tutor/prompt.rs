//! Prompt assembly for the tutor.

use serde::{Deserialize, Serialize};

use crate::{dataset::Stats, i18n::Language, validation::UserMarks};

/// Student level; changes how the tutor phrases its hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Basic,
    #[default]
    Medium,
    Advanced,
}

impl Level {
    fn instructions(&self) -> &'static str {
        match self {
            Level::Basic => {
                "Fes servir un llenguatge molt senzill i exemples visuals. Avança pas a pas."
            }
            Level::Medium => {
                "Fes servir un llenguatge clar amb alguns termes tècnics. Combina explicació i reflexió."
            }
            Level::Advanced => {
                "Pots fer servir terminologia tècnica. Centra't en conceptes i relacions."
            }
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Level::Basic => "BASIC",
            Level::Medium => "MEDIUM",
            Level::Advanced => "ADVANCED",
        }
    }
}

/// What kind of help the student asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpType {
    /// Nudge on the current step without giving the answer away.
    #[default]
    Contextual,
    /// A "why" question about the concept behind the step.
    Conceptual,
}

/// Snapshot of the exercise the tutor is asked about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseContext {
    pub exercise_type: String,
    pub data: Vec<f64>,
    pub stats: Stats,
    pub current_step: String,
    pub user_inputs: UserInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputs {
    pub start: Option<String>,
    pub amplitude: Option<String>,
    pub marks: UserMarks,
    pub intervals_generated: bool,
}

pub fn build_system_prompt(level: Level, help_type: HelpType, language: Language) -> String {
    let base = format!(
        "Ets l'Oracle de la Matriu, un tutor socràtic d'estadística per a alumnes d'ESO.\n\
         NIVELL DE L'ALUMNE: {}\n\
         INSTRUCCIONS DE NIVELL: {}\n\
         \n\
         NORMES:\n\
         - No donis mai la resposta directament.\n\
         - Fes preguntes guia perquè l'alumne pensi.\n\
         - Sigues breu (com a màxim 3 frases).\n\
         - Estètica: Cyberpunk/Matrix.\n\
         - Respon en {}.",
        level.as_str(),
        level.instructions(),
        language.native_name(),
    );

    match help_type {
        HelpType::Contextual => {
            base + "\nAjuda l'alumne amb el pas actual sense revelar la solució."
        }
        HelpType::Conceptual => {
            base + "\nPlanteja una pregunta conceptual sobre el perquè del que s'està fent."
        }
    }
}

pub fn build_context_message(context: Option<&ExerciseContext>) -> String {
    let Some(context) = context else {
        return "No hi ha context disponible.".to_string();
    };

    let data = context
        .data
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let inputs = serde_json::to_string(&context.user_inputs).unwrap_or_else(|_| "{}".to_string());

    format!(
        "EXERCICI: {}\nDADES: {}\nSTATS: Min={}, Max={}\nPAS ACTUAL: {}\nRESPOSTES: {}",
        context.exercise_type,
        data,
        context.stats.min,
        context.stats.max,
        context.current_step,
        inputs
    )
}

/// Full prompt: system rules, exercise context, then the question.
pub fn build_prompt(
    level: Level,
    help_type: HelpType,
    language: Language,
    context: Option<&ExerciseContext>,
    question: &str,
) -> String {
    format!(
        "{}\n\n{}\n\nPREGUNTA: {}",
        build_system_prompt(level, help_type, language),
        build_context_message(context),
        question
    )
}
