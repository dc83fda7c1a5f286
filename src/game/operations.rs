use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use super::types::{DifficultyLevel, GameCategory, QuestionResult, QuizItem, StudyAdvice};
use crate::config::PowerLevel;
use crate::error::InferenceError;
use crate::inference::{InferenceRequest, InferenceService};

/// Uploaded study material beyond this many characters is not sent to
/// the model.
const SCOPE_CONTENT_LIMIT: usize = 50_000;

fn quiz_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "quizzes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "subject": {
                            "type": "string",
                            "description": "The main answer (e.g., 'Napoleon Bonaparte', 'Amazon River')."
                        },
                        "acceptedAnswers": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "List of valid alternative names or spellings (e.g., ['Napoleon', 'Bonaparte'])."
                        },
                        "clues": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "5 to 8 facts about the subject, ordered from most obscure/difficult to most obvious."
                        },
                        "category": {
                            "type": "string",
                            "description": "The category of the question (History or Geography)."
                        },
                        "difficulty": {
                            "type": "string",
                            "description": "Estimated difficulty level."
                        }
                    },
                    "required": ["subject", "acceptedAnswers", "clues", "category"]
                }
            }
        },
        "required": ["quizzes"]
    })
}

fn advice_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "overallFeedback": {
                "type": "string",
                "description": "A brief, encouraging summary (2-3 sentences) identifying the specific historical/geographical eras or regions the user struggled with."
            },
            "weakAreas": {
                "type": "array",
                "items": {"type": "string"},
                "description": "A list of 3-5 specific short keywords or topics to study (e.g., 'Napoleonic Wars', 'Rivers of South America')."
            },
            "studyResources": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "description": "Title of the article or topic."},
                        "url": {"type": "string", "description": "A valid URL (prefer Wikipedia) to read about this topic."},
                        "description": {"type": "string", "description": "Very short reason why this is relevant based on their mistakes."}
                    },
                    "required": ["title", "url", "description"]
                },
                "description": "List of 3-5 specific reading links."
            }
        },
        "required": ["overallFeedback", "weakAreas", "studyResources"]
    })
}

fn audience_description(category: GameCategory, difficulty: DifficultyLevel) -> &'static str {
    match (category, difficulty) {
        (_, DifficultyLevel::HighSchool) => "High School Student",
        (GameCategory::Geography, DifficultyLevel::College) => "College Geography Major",
        (GameCategory::Geography, DifficultyLevel::Professional) => "Professional Geographer",
        (GameCategory::History, DifficultyLevel::College) => "College History Major",
        (GameCategory::History, DifficultyLevel::Professional) => "Professional Historian",
    }
}

/// Distills uploaded study material into a comma-separated scope string.
/// Falls back to a literal placeholder so an unreachable provider never
/// blocks game setup.
pub async fn extract_scope_from_content(
    service: &InferenceService,
    content: &str,
    category: GameCategory,
) -> String {
    let truncated: String = content.chars().take(SCOPE_CONTENT_LIMIT).collect();
    let prompt = format!(
        r#"Analyze the following text from study materials uploaded by a user for a {category} quiz.

TEXT CONTENT (truncated if too long):
"{truncated}"

Task:
Extract a concise, comma-separated list of the key specific topics, eras, regions, or themes present in this text that can serve as a "Scope" for generating a quiz.
Ignore metadata, prefaces, or irrelevant text.
The output should be a string of keywords (e.g., "American Revolution, French Monarchy, 19th Century Industrialization").
Limit the summary to max 50 words."#
    );

    match service.generate_text(InferenceRequest::prompt(prompt)).await {
        Ok(scope) => scope,
        Err(err) => {
            error!(error = %err, "Failed to extract scope from uploaded content");
            "Custom File Content".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuizBatch {
    quizzes: Vec<QuizItem>,
}

/// Generates quiz items for one game. Failures surface to the caller;
/// rendering them is the UI's concern.
pub async fn generate_quiz(
    service: &InferenceService,
    category: GameCategory,
    count: u32,
    scope: &str,
    difficulty: DifficultyLevel,
) -> Result<Vec<QuizItem>, InferenceError> {
    let scope = scope.trim();
    let scope_text = if scope.is_empty() || scope == "*" {
        "general knowledge"
    } else {
        scope
    };
    let audience = audience_description(category, difficulty);
    let difficulty_guidance = match difficulty {
        DifficultyLevel::HighSchool => {
            "Focus on standard curriculum topics, famous figures, major wars, and major capitals/landmarks."
        }
        DifficultyLevel::College => {
            "Focus on undergraduate level depth, specific battles, treaties, lesser-known monarchs, cultural geography, or regional politics."
        }
        DifficultyLevel::Professional => {
            "Focus on niche academic topics, specific historiography, minor but impactful historical figures, or specific geographical features, but ensuring they are not completely obscure to a professional."
        }
    };

    let prompt = format!(
        r#"Generate {count} challenging quiz items for a {category} Bee competition.
Target Audience Difficulty Level: "{audience}".
Scope/Keywords: "{scope_text}".

CRITICAL SUBJECT SELECTION RULE:
- The Subject MUST be known by at least 50% of the intended audience ({audience}).
- {difficulty_guidance}

For each item:
1. Identify a specific subject (person, place, event, battle, treaty, landform, city, etc.).
2. Provide 5 to 8 clues.

CRITICAL INSTRUCTIONS FOR CLUE GENERATION:
- **Phrasing**: NEVER use pronouns like "It", "He", "She", or "They" to refer to the subject. ALWAYS use the specific type of the subject in the text, such as "This river...", "This monarch...", "This mountain range...", "This treaty...", "This city...".
- **Difficulty Progression**: The clues MUST be strictly ordered from MOST DIFFICULT (obscure) to EASIEST (well-known).
  - Clue 1: An obscure fact (e.g., specific dates, minor figures involved, specific dimensions) that allows a true expert to answer immediately.
  - Middle Clues: Add context, location, or related events.
  - Final Clues: Major distinguishing features or famous associations.

3. Provide a list of 'acceptedAnswers' to handle variations (e.g., last names, common abbreviations)."#
    );

    let request = InferenceRequest::prompt(prompt)
        .with_system(
            "You are an expert question writer for National History Bee and National Geography Bee competitions. You value accuracy, precision, and gradual revelation of information.",
        )
        .with_schema(quiz_schema());

    let batch: QuizBatch = match service.generate_json(request).await {
        Ok(batch) => batch,
        Err(err) => {
            error!(error = %err, "Failed to generate quiz");
            return Err(err);
        }
    };

    let stamp = Utc::now().timestamp_millis();
    Ok(batch
        .quizzes
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            item.id = format!("quiz-{stamp}-{index}");
            item
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CorrectReply {
    #[serde(default)]
    correct: bool,
}

/// Verifies a free-text answer. An exact case-insensitive match against
/// the subject or any accepted answer short-circuits before any network
/// call; otherwise the light model judges, and any failure counts as
/// incorrect rather than silently crediting the player.
pub async fn check_answer(
    service: &InferenceService,
    user_answer: &str,
    subject: &str,
    accepted_answers: &[String],
    category: &str,
) -> bool {
    let normalized_input = user_answer.trim().to_lowercase();
    let exact = std::iter::once(subject)
        .chain(accepted_answers.iter().map(String::as_str))
        .any(|valid| valid.trim().to_lowercase() == normalized_input);
    if exact {
        return true;
    }

    let prompt = format!(
        r#"Task: Validate if the User's Answer is a correct identification of the Subject.
Subject: "{subject}"
Category: {category}
Alternate Names: {}

User Answer: "{user_answer}"

Rules for Correctness:
- Accept widely used nicknames or short forms (e.g., "TR" for "Theodore Roosevelt").
- Accept phonetic spelling or local pronunciations.
- Accept minor misspellings.
- Accept translations if common.
- Reject if the answer represents a distinct, incorrect entity.

Output strictly JSON: {{ "correct": boolean }}"#,
        accepted_answers.join(", ")
    );

    let request = InferenceRequest::prompt(prompt).with_power(PowerLevel::Light);
    match service.generate_json::<CorrectReply>(request).await {
        Ok(reply) => reply.correct,
        Err(err) => {
            warn!(error = %err, "AI verification failed, defaulting to incorrect");
            false
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeakPointAnalysis<'a> {
    subject: &'a str,
    user_answer: &'a str,
    was_correct: bool,
    incorrect_guesses: u32,
    clues_needed: u32,
}

/// Post-game coaching from the round outcomes. A provider failure yields
/// a generic encouraging payload so game completion is never blocked.
pub async fn generate_study_advice(
    service: &InferenceService,
    results: &[QuestionResult],
) -> StudyAdvice {
    let weak_points: Vec<&QuestionResult> = results
        .iter()
        .filter(|r| !r.success || r.incorrect_attempts > 0 || r.clues_used > 3)
        .collect();

    let items_to_analyze: Vec<&QuestionResult> = if weak_points.is_empty() {
        let mut sorted: Vec<&QuestionResult> = results.iter().collect();
        sorted.sort_by(|a, b| b.clues_used.cmp(&a.clues_used));
        sorted.into_iter().take(3).collect()
    } else {
        weak_points
    };

    let analysis_data: Vec<WeakPointAnalysis<'_>> = items_to_analyze
        .iter()
        .map(|r| WeakPointAnalysis {
            subject: &r.subject,
            user_answer: r.user_answer.as_deref().unwrap_or("No Answer"),
            was_correct: r.success,
            incorrect_guesses: r.incorrect_attempts,
            clues_needed: r.clues_used,
        })
        .collect();

    let performance = serde_json::to_string_pretty(&analysis_data).unwrap_or_default();
    let prompt = format!(
        r#"Analyze the following quiz performance results for a Geography/History Bee student.

Performance Data:
{performance}

Task:
1. Identify the specific knowledge gaps (e.g., "Weakness in 19th Century French Politics" or "Unfamiliar with African River Systems").
2. Provide constructive feedback.
3. Suggest specific Wikipedia articles that would fill these gaps.

If the user performed perfectly, suggest advanced related topics to study next."#
    );

    let request = InferenceRequest::prompt(prompt)
        .with_system(
            "You are a helpful study coach for academic competitions. You provide specific, actionable reading lists with valid Wikipedia URLs.",
        )
        .with_schema(advice_schema());

    match service.generate_json::<StudyAdvice>(request).await {
        Ok(advice) => advice,
        Err(err) => {
            error!(error = %err, "Failed to generate study advice");
            StudyAdvice {
                overall_feedback:
                    "Great effort! Keep reviewing general topics to broaden your knowledge base."
                        .to_string(),
                weak_areas: vec!["General Knowledge".to_string()],
                study_resources: Vec::new(),
            }
        }
    }
}
