//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod attempt_record;
mod input_guard;

pub use attempt_record::AttemptRecord;
pub use input_guard::{
    FieldRule, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, RuleViolation, SANITIZED_MAX_LENGTH,
    USERNAME_MAX_LENGTH, ValidationResult, sanitize_text, validate_password, validate_username,
};
