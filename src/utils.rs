pub mod error_messages;
pub mod password;
pub mod validation;
