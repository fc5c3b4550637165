//! La Matriu Library
//!
//! Core of the class-interval exercise: dataset generation, interval
//! construction, mark validation, session persistence and the tutor client.

pub mod config;
pub mod controller;
pub mod dataset;
pub mod i18n;
pub mod intervals;
pub mod render;
pub mod repl;
pub mod storage;
pub mod traits;
pub mod tutor;
pub mod validation;

// Re-export commonly used types
pub use config::AppConfig;
pub use controller::{Command, Effect, ExerciseController, ExerciseState, NoticeKind};
pub use dataset::{Dataset, Stats, calculate_basic_stats, generate_random_data};
pub use i18n::{Language, Notice};
pub use intervals::{Coverage, Interval, build_intervals, check_coverage, parse_number};
pub use storage::{ExerciseResult, FileStore, KvStore, MemoryStore, Storage, StorageError};
pub use traits::{Clock, MockClock, SystemClock};
pub use tutor::{ApiKey, ChatSession, Credential, GeminiClient, RequestId, TutorError};
pub use validation::{MarkOutcome, UserMark, UserMarks, numbers_equal, validate_mark};
