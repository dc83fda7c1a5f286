mod operations;
mod types;

pub use operations::{
    check_answer, extract_scope_from_content, generate_quiz, generate_study_advice,
};
pub use types::{
    DifficultyLevel, GameCategory, QuestionResult, QuizItem, StudyAdvice, StudyResource,
};
