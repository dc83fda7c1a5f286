use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum GameCategory {
    #[default]
    History,
    Geography,
}

impl GameCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            GameCategory::History => "History",
            GameCategory::Geography => "Geography",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "History" => Some(GameCategory::History),
            "Geography" => Some(GameCategory::Geography),
            _ => None,
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    #[default]
    HighSchool,
    College,
    Professional,
}

impl DifficultyLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "HIGH_SCHOOL" => Some(DifficultyLevel::HighSchool),
            "COLLEGE" => Some(DifficultyLevel::College),
            "PROFESSIONAL" => Some(DifficultyLevel::Professional),
            _ => None,
        }
    }
}

/// One generated trivia item. `id` is assigned client-side after
/// generation; the model never produces it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    #[serde(default)]
    pub id: String,

    pub subject: String,

    pub accepted_answers: Vec<String>,

    pub clues: Vec<String>,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// Outcome of one played round, the input to post-game coaching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_index: u32,
    pub subject: String,
    pub clues_total: u32,
    pub clues_used: u32,
    pub incorrect_attempts: u32,
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyAdvice {
    pub overall_feedback: String,
    pub weak_areas: Vec<String>,
    pub study_resources: Vec<StudyResource>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudyResource {
    pub title: String,
    pub url: String,
    pub description: String,
}
