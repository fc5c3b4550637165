//! The Oracle: an LLM tutor reached over the generative-language HTTP API.

mod chat;
mod client;
mod credential;
mod prompt;

pub use chat::{ChatEntry, ChatSession, RequestId, Sender, Turn};
pub use client::{GeminiClient, GenerateRequest, GenerateResponse, TutorError};
pub use credential::{API_KEY_PLACEHOLDER, ApiKey, Credential, CredentialError};
pub use prompt::{
    ExerciseContext, HelpType, Level, UserInputs, build_context_message, build_prompt,
    build_system_prompt,
};
