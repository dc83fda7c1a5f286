pub mod config;
pub mod error;
pub mod game;
pub mod inference;

pub use error::{InferenceError, Stage};
pub use inference::{InferenceRequest, InferenceService};
