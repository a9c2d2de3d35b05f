//! Type definitions for the validation system.

mod email_input;
mod text_fields;

pub use email_input::EmailInput;
pub use text_fields::{FullNameInput, ReportContent, ReportTitle};
