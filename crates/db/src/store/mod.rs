pub mod memory;
pub mod sql;

pub use memory::InMemoryConversationStore;
pub use sql::SqlConversationStore;

/// Page size used when a listing filter does not name one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;
