pub mod config;
pub mod domain;
pub mod errors;
pub mod store;

pub use domain::conversation::{
    ConversationId, ConversationRecord, ConversationStatus, MessageRole, Turn,
};
pub use domain::payment::{PaymentExtraction, PaymentMethod};
pub use errors::{ApplicationError, InterfaceError};
pub use store::{ConversationFilter, ConversationStore, NewConversation, StoreError};
