//! Line commands for the terminal front end.

use thiserror::Error;

use crate::{controller::Command, i18n::Language};

pub const HELP: &str = "\
Commands:
  new                         generate a new dataset
  load                        restore the saved dataset if it is recent
  intervals <start> <amp>     build the class intervals
  mark <n> <value>            enter the class mark of interval n (from 1)
  continue                    save results and move to the next exercise
  key <api-key>               store the tutor API key
  forget-key                  remove the stored API key
  ask <question>              ask the Oracle
  why <question>              ask the Oracle for a comprehension question
  lang <ca|es|en>             change language
  show                        print the exercise
  history                     print the tutor conversation
  help                        this text
  quit                        exit";

/// One parsed input line.
#[derive(Debug, Clone)]
pub enum Input {
    Command(Command),
    Show,
    History,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("interval numbers start at 1, got '{0}'")]
    BadIndex(String),
    #[error(transparent)]
    Language(#[from] crate::i18n::UnknownLanguage),
}

pub fn parse_input(line: &str) -> Result<Input, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "show" => return Ok(Input::Show),
        "history" => return Ok(Input::History),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),

        "new" => Command::GenerateNewData,
        "load" => Command::LoadSavedData,
        "intervals" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next(), args.next()) {
                (Some(start), Some(amplitude), None) => Command::UpdateIntervals {
                    start: start.to_string(),
                    amplitude: amplitude.to_string(),
                },
                _ => return Err(CommandError::Usage("intervals <start> <amp>")),
            }
        }
        "mark" => {
            let (index, value) = match rest.split_once(char::is_whitespace) {
                Some((index, value)) => (index, value.trim()),
                None if !rest.is_empty() => (rest, ""),
                None => return Err(CommandError::Usage("mark <n> <value>")),
            };
            let index = index
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| CommandError::BadIndex(index.to_string()))?;
            Command::ValidateMark {
                index,
                raw: value.to_string(),
            }
        }
        "continue" => Command::SaveAndAdvance,
        "key" if !rest.is_empty() => Command::SaveCredential(rest.to_string()),
        "key" => return Err(CommandError::Usage("key <api-key>")),
        "forget-key" => Command::ClearCredential,
        "ask" if !rest.is_empty() => Command::SendChat(rest.to_string()),
        "ask" => return Err(CommandError::Usage("ask <question>")),
        "why" if !rest.is_empty() => Command::AskConceptual(rest.to_string()),
        "why" => return Err(CommandError::Usage("why <question>")),
        "lang" => Command::ChangeLanguage(rest.parse::<Language>()?),
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Input::Command(command))
}
