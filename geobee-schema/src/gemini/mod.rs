mod generate_content;
mod model_list;
mod response;

pub use generate_content::{Content, GeminiGenerateRequest, GenerationConfig, Part};
pub use model_list::{GeminiModel, GeminiModelList};
pub use response::{Candidate, GeminiResponseBody};
