//! Sanitization and field validation for login form input.
//!
//! Follows the OWASP Input Validation cheat sheet: untrusted text is first
//! normalized by [`sanitize_text`], then checked against an allow-list rule
//! for the field it belongs to. Validation outcomes are values, not errors,
//! because malformed input is an expected, frequent occurrence.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Upper bound, in characters, of any sanitized text.
pub const SANITIZED_MAX_LENGTH: usize = 256;

/// Maximum username length in characters.
pub const USERNAME_MAX_LENGTH: usize = 64;

/// Minimum password length (NIST SP800-63B).
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length to allow passphrases while bounding hashing cost.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Punctuation accepted in usernames besides ASCII letters and digits.
const USERNAME_PUNCTUATION: &[char] = &['.', '_', '-', '@'];

/// Markup and quoting characters removed by [`sanitize_text`].
const STRIPPED_CHARACTERS: &[char] = &['<', '>', '"', '\'', '`'];

/// Invisible format characters (Unicode `Cf`) that can reorder or hide text:
/// soft hyphen, Arabic letter mark, Mongolian vowel separator, zero-width
/// and directional marks, bidi embeddings and isolates, word joiners and
/// invisible operators, the byte order mark and interlinear annotation marks.
const FORMAT_CHARACTER_RANGES: &[(char, char)] = &[
    ('\u{00AD}', '\u{00AD}'),
    ('\u{061C}', '\u{061C}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
];

/// Normalizes untrusted text so it is safe to display or log.
///
/// Removes angle brackets, quote characters, backticks, control characters
/// and invisible format characters such as bidi overrides, then trims surrounding whitespace and caps the result at
/// [`SANITIZED_MAX_LENGTH`] characters. Absent input yields an empty string.
#[must_use]
pub fn sanitize_text<'a>(raw: impl Into<Option<&'a str>>) -> String {
    let raw = raw.into().unwrap_or_default();
    let stripped: String = raw
        .chars()
        .filter(|character| !is_unsafe_character(*character))
        .collect();

    let bounded: String = stripped.trim().chars().take(SANITIZED_MAX_LENGTH).collect();
    bounded.trim_end().to_owned()
}

/// Validates an already-sanitized username.
///
/// Rules, checked in order: non-empty, at most [`USERNAME_MAX_LENGTH`]
/// characters, only ASCII letters, digits, `.`, `_`, `-` and `@`.
#[must_use]
pub fn validate_username<'a>(value: impl Into<Option<&'a str>>) -> ValidationResult {
    let value = value.into().unwrap_or_default();

    if value.trim().is_empty() {
        return ValidationResult::invalid(FieldRule::Username, RuleViolation::Empty);
    }

    if value.chars().count() > USERNAME_MAX_LENGTH {
        return ValidationResult::invalid(
            FieldRule::Username,
            RuleViolation::TooLong {
                max: USERNAME_MAX_LENGTH,
            },
        );
    }

    if let Some(character) = value.chars().find(|character| !is_username_character(*character)) {
        return ValidationResult::invalid(
            FieldRule::Username,
            RuleViolation::InvalidCharacter(character),
        );
    }

    ValidationResult::valid()
}

/// Validates a plaintext password.
///
/// Passwords are never sanitized: every character is significant. Rules,
/// checked in order: non-empty, at least [`PASSWORD_MIN_LENGTH`] characters,
/// at most [`PASSWORD_MAX_LENGTH`] characters, not a common breached password.
#[must_use]
pub fn validate_password<'a>(value: impl Into<Option<&'a str>>) -> ValidationResult {
    let value = value.into().unwrap_or_default();
    let char_count = value.chars().count();

    if char_count == 0 {
        return ValidationResult::invalid(FieldRule::Password, RuleViolation::Empty);
    }

    if char_count < PASSWORD_MIN_LENGTH {
        return ValidationResult::invalid(
            FieldRule::Password,
            RuleViolation::TooShort {
                min: PASSWORD_MIN_LENGTH,
            },
        );
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return ValidationResult::invalid(
            FieldRule::Password,
            RuleViolation::TooLong {
                max: PASSWORD_MAX_LENGTH,
            },
        );
    }

    if is_common_password(value) {
        return ValidationResult::invalid(FieldRule::Password, RuleViolation::TooCommon);
    }

    ValidationResult::valid()
}

fn is_unsafe_character(character: char) -> bool {
    character.is_control()
        || STRIPPED_CHARACTERS.contains(&character)
        || FORMAT_CHARACTER_RANGES
            .iter()
            .any(|(start, end)| (*start..=*end).contains(&character))
}

fn is_username_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || USERNAME_PUNCTUATION.contains(&character)
}

/// Checks whether a password appears in the embedded common passwords list.
fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|entry| *entry == lowered)
}

/// Top breached passwords that satisfy the length rule.
static COMMON_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "123456789",
    "1234567890",
    "qwertyuiop",
    "qwerty123",
    "password1",
    "password123",
    "iloveyou",
    "trustno1",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "superman",
    "starwars",
    "passw0rd",
    "whatever",
    "welcome1",
    "letmein1",
    "11111111",
    "00000000",
];

/// Named field contracts known to the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// Login name: bounded length, restricted character set.
    Username,
    /// Secret: bounded length, not a common password.
    Password,
}

impl FieldRule {
    /// Returns the field name used in messages and payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
        }
    }

    /// Validates a value against this field's rule.
    #[must_use]
    pub fn validate<'a>(self, value: impl Into<Option<&'a str>>) -> ValidationResult {
        match self {
            Self::Username => validate_username(value),
            Self::Password => validate_password(value),
        }
    }
}

impl Display for FieldRule {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The first rule a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    /// Value was empty or whitespace only.
    Empty,
    /// Value was shorter than the minimum length.
    TooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },
    /// Value exceeded the maximum length.
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Value contained a character outside the allow-list.
    InvalidCharacter(char),
    /// Value appears in the embedded breached-password list.
    TooCommon,
}

impl Display for RuleViolation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(formatter, "must not be empty"),
            Self::TooShort { min } => write!(formatter, "must be at least {min} characters"),
            Self::TooLong { max } => write!(formatter, "must not exceed {max} characters"),
            Self::InvalidCharacter(character) => {
                write!(formatter, "contains invalid character {character:?}")
            }
            Self::TooCommon => write!(
                formatter,
                "is too common and has appeared in data breaches"
            ),
        }
    }
}

/// Outcome of a single validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    is_valid: bool,
    message: Option<String>,
    field: Option<FieldRule>,
    violation: Option<RuleViolation>,
}

impl ValidationResult {
    /// Creates a passing result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
            field: None,
            violation: None,
        }
    }

    /// Creates a failing result for a field and the rule it broke.
    #[must_use]
    pub fn invalid(field: FieldRule, violation: RuleViolation) -> Self {
        Self {
            is_valid: false,
            message: Some(format!("{field} {violation}")),
            field: Some(field),
            violation: Some(violation),
        }
    }

    /// Returns whether the value satisfied its rule.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns the human-readable description of the violated rule.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the field that failed, if any.
    #[must_use]
    pub fn field(&self) -> Option<FieldRule> {
        self.field
    }

    /// Returns the violated rule, if any.
    #[must_use]
    pub fn violation(&self) -> Option<RuleViolation> {
        self.violation
    }
}
