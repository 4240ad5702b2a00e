//! Wire payloads for the tutor backend's `/chat`, `/exercise` and `/quiz` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chat,
    Exercise,
    Quiz,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Chat => "chat",
            Endpoint::Exercise => "exercise",
            Endpoint::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Body of `POST /chat`. `user` carries the session identifier.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub user: String,
}

/// Body of `POST /exercise` and `POST /quiz`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionRequest {
    pub user: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub progress: Option<Progress>,
}

/// Server-reported progress snapshot. Numbers are kept as received; see
/// `summary_line` for how they render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub score: Number,
    pub completed_exercises: Number,
}

impl Progress {
    pub fn summary_line(&self) -> String {
        format!(
            "Score: {}, Completed Exercises: {}",
            render_number(&self.score),
            render_number(&self.completed_exercises)
        )
    }
}

/// Integers as sent; floats in shortest form, so `5.0` shows as `5`.
fn render_number(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() => value.to_string(),
        _ => number.to_string(),
    }
}

/// A fetched exercise. Every field besides `question` is retained in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExercisePayload {
    pub question: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fetched quiz. Every field besides `question` and `options` is retained in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizPayload {
    pub question: String,
    pub options: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizPayload {
    pub fn options_line(&self) -> String {
        self.options.join(", ")
    }
}
