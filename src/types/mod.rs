// Public modules
pub mod chat_completion;
pub mod chat_request;
pub mod message;
pub mod model;
pub mod model_info;

// Re-exports
pub use chat_completion::{ChatCompletion, Choice, ChoiceMessage, decode_completion};
pub use chat_request::{ChatMessage, ChatRequest, ContentPart};
pub use message::{Message, Role};
pub use model::{KnownModel, Model, ModelCatalog};
pub use model_info::{ModelInfo, ModelList, ModelPricing};
