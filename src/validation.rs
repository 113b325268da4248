/// Client-side required-field validation.
///
/// Every check here runs before any request is built, so a rejected
/// submission never reaches the network.
use crate::errors::ClientError;
use crate::models::{PredictionRequest, Subject};
use chrono::NaiveDate;
use std::str::FromStr;

pub const MISSING_NAMES: &str = "Please enter both names.";
pub const MISSING_METADATA: &str = "Please enter age and date of birth for both people.";
pub const MISSING_FIXED_NAME: &str = "Please enter your name.";
pub const MISSING_CANDIDATES: &str = "Please enter at least one candidate name.";
pub const MISSING_NOTE_TEXT: &str = "Note text cannot be empty.";

/// How a form treats the optional age / date-of-birth fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPolicy {
    /// Names are required; metadata is sent only when present.
    #[default]
    NamesOnly,
    /// Names, ages and dates of birth are all required.
    RequireMetadata,
    /// Missing metadata is filled from [`MetadataDefaults`] before sending.
    DefaultMetadata,
}

impl FromStr for FormPolicy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "names-only" | "names_only" => Ok(FormPolicy::NamesOnly),
            "require-metadata" | "require_metadata" => Ok(FormPolicy::RequireMetadata),
            "default-metadata" | "default_metadata" => Ok(FormPolicy::DefaultMetadata),
            other => Err(ClientError::InvalidConfiguration(format!(
                "unknown form policy '{}' (expected names-only, require-metadata or default-metadata)",
                other
            ))),
        }
    }
}

/// Placeholder ages and birth dates used by [`FormPolicy::DefaultMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataDefaults {
    pub primary_age: u32,
    pub primary_dob: NaiveDate,
    pub secondary_age: u32,
    pub secondary_dob: NaiveDate,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            primary_age: 25,
            primary_dob: NaiveDate::from_ymd_opt(1999, 1, 1).unwrap_or_default(),
            secondary_age: 23,
            secondary_dob: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default(),
        }
    }
}

/// Returns the trimmed value, or a validation error if nothing is left.
pub fn require_non_blank<'a>(value: &'a str, message: &str) -> Result<&'a str, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(message.to_string()));
    }
    Ok(trimmed)
}

fn has_metadata(subject: &Subject) -> bool {
    subject.age.is_some() && subject.date_of_birth.is_some()
}

/// Validates a subject pair under `policy` and returns the request to send.
///
/// Names are trimmed. Under [`FormPolicy::DefaultMetadata`] any missing age or
/// date of birth is replaced by the matching default.
pub fn prepare_pair(
    primary: &Subject,
    secondary: &Subject,
    policy: FormPolicy,
    defaults: &MetadataDefaults,
) -> Result<PredictionRequest, ClientError> {
    let primary_name = require_non_blank(&primary.name, MISSING_NAMES)?;
    let secondary_name = require_non_blank(&secondary.name, MISSING_NAMES)?;

    if policy == FormPolicy::RequireMetadata && !(has_metadata(primary) && has_metadata(secondary))
    {
        return Err(ClientError::Validation(MISSING_METADATA.to_string()));
    }

    let mut primary = Subject {
        name: primary_name.to_string(),
        ..primary.clone()
    };
    let mut secondary = Subject {
        name: secondary_name.to_string(),
        ..secondary.clone()
    };

    if policy == FormPolicy::DefaultMetadata {
        primary.age = primary.age.or(Some(defaults.primary_age));
        primary.date_of_birth = primary.date_of_birth.or(Some(defaults.primary_dob));
        secondary.age = secondary.age.or(Some(defaults.secondary_age));
        secondary.date_of_birth = secondary.date_of_birth.or(Some(defaults.secondary_dob));
    }

    Ok(PredictionRequest::new(primary, secondary))
}

/// Drops blank candidate names, trimming the rest. Order and duplicates are kept.
pub fn filter_candidates<S: AsRef<str>>(candidates: &[S]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
