pub mod conversation;
pub mod payment;
