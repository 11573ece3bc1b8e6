pub mod connection;
pub mod schema;
pub mod store;

pub use connection::{connect_with_settings, DbPool};
pub use store::{InMemoryConversationStore, SqlConversationStore};
