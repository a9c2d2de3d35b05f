//! Constants used throughout the validation system.

/// Minimum length for a report title
pub const TITLE_MIN_LENGTH: usize = 3;
/// Maximum length for a report title
pub const TITLE_MAX_LENGTH: usize = 200;
/// Minimum length for report content
pub const CONTENT_MIN_LENGTH: usize = 10;
/// Maximum length for report content
pub const CONTENT_MAX_LENGTH: usize = 5_000;
/// Minimum length for a full name
pub const NAME_MIN_LENGTH: usize = 2;
/// Maximum length for a full name
pub const NAME_MAX_LENGTH: usize = 100;
/// Minimum length for a password
pub const PASSWORD_MIN_LENGTH: usize = 6;
/// Maximum length for a password
pub const PASSWORD_MAX_LENGTH: usize = 72;
/// Maximum length for an email address
pub const EMAIL_MAX_LENGTH: usize = 254;
