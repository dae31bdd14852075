pub mod error;
pub mod openai;

pub use error::AiError;
pub use openai::{strict_schema, NamedSchema, OpenAi};
