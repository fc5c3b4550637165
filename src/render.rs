//! Plain-text rendering for the terminal front end.

use std::fmt::Write;

use crate::{
    controller::{Effect, ExerciseState, NoticeKind},
    dataset::format_number,
    i18n::{Language, coverage_warning, labels, message},
    tutor::{ChatEntry, ChatSession, Sender},
    validation::MarkOutcome,
};

pub fn render_state(state: &ExerciseState, language: Language) -> String {
    let labels = labels(language);
    let mut out = String::new();

    let _ = writeln!(out, "{}: {}", labels.data, state.dataset.display());
    let _ = writeln!(
        out,
        "Min: {}  Max: {}  N: {}",
        format_number(state.stats.min, 2),
        format_number(state.stats.max, 2),
        state.stats.count
    );
    let _ = writeln!(
        out,
        "{}: {}  {}: {}",
        labels.start,
        or_dash(&state.start_input),
        labels.amplitude,
        or_dash(&state.amplitude_input)
    );

    for interval in &state.intervals {
        let mark = match state.marks.get(interval.index) {
            Some(m) if m.correct => format!("{} ✓", m.value),
            Some(m) => format!("{} ✗", m.value),
            None => "--".to_string(),
        };
        let _ = writeln!(
            out,
            "  {} {}: {:<16} {}: {}",
            labels.interval,
            interval.index + 1,
            interval.notation,
            labels.mark,
            mark
        );
    }

    if !state.intervals.is_empty() {
        let _ = writeln!(
            out,
            "  {}/{} ✓",
            state.marks.correct_count(),
            state.intervals.len()
        );
    }

    let gate = if state.continue_enabled {
        labels.continue_ready
    } else {
        labels.continue_locked
    };
    let _ = write!(out, "{}", gate);
    out
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "--" } else { s }
}

/// Text for an effect, or `None` for effects that are performed rather
/// than shown.
pub fn render_effect(effect: &Effect, language: Language) -> Option<String> {
    match effect {
        Effect::Notify { kind, notice } => {
            let tag = match kind {
                NoticeKind::Success => "[OK]",
                NoticeKind::Error => "[!!]",
                NoticeKind::Info => "[..]",
            };
            Some(format!("{} {}", tag, message(*notice, language)))
        }
        Effect::CoverageWarning { last_upper, max } => Some(format!(
            "[!!] {}",
            coverage_warning(language, *last_upper, *max)
        )),
        Effect::MarkChecked { index, outcome } => Some(match outcome {
            MarkOutcome::Unset => format!("  #{} --", index + 1),
            MarkOutcome::Correct(v) => format!("  #{} {} ✓", index + 1, v),
            MarkOutcome::Incorrect(v) => format!("  #{} {} ✗", index + 1, v),
        }),
        Effect::ContinueEnabled(enabled) => {
            let labels = labels(language);
            Some(
                if *enabled {
                    labels.continue_ready
                } else {
                    labels.continue_locked
                }
                .to_string(),
            )
        }
        Effect::Chat(entry) => Some(render_chat_entry(entry, language)),
        Effect::RequestChat { .. } => None,
        Effect::Advance { exercise_id } => Some(format!(
            ">> {}: {}",
            labels(language).next_exercise,
            exercise_id
        )),
    }
}

pub fn render_chat_entry(entry: &ChatEntry, language: Language) -> String {
    let who = match entry.sender {
        Sender::User => "TU",
        Sender::Tutor => "ORACLE",
        Sender::System => "SYS",
    };
    if entry.pending {
        format!("{}> {}", who, labels(language).processing)
    } else {
        format!("{}> {}", who, entry.text)
    }
}

pub fn render_transcript(chat: &ChatSession, language: Language) -> String {
    chat.transcript()
        .iter()
        .map(|entry| render_chat_entry(entry, language))
        .collect::<Vec<_>>()
        .join("\n")
}
