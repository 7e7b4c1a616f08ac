use crate::model::{AttributeDefinition, DataType, ValueBody};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));
static PHONE_LOOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\-\s]{7,}$").expect("loose phone pattern"));
static PHONE_STRICT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("strict phone pattern"));

/// Which phone rule applies. The backend historically enforced both in
/// different places; the canonical choice is configuration, not a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonePolicy {
    /// `^\+?[0-9\-\s]{7,}$`: digits, dashes, spaces, at least seven chars.
    #[default]
    Loose,
    /// `^\+?[1-9]\d{1,14}$`, E.164-like.
    Strict,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationOptions {
    #[serde(default)]
    pub phone_policy: PhonePolicy,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("a value is required for mandatory attribute '{attribute}'")]
    MandatoryMissing { attribute: String },
    #[error("attribute '{attribute}' expects {expected:?}, got {actual:?}")]
    TypeMismatch {
        attribute: String,
        expected: DataType,
        actual: DataType,
    },
    #[error("'{value}' does not match the attribute pattern '{pattern}'")]
    PatternMismatch { value: String, pattern: String },
    #[error("validation rule '{pattern}' is not a valid regex")]
    BadValidationRule { pattern: String },
    #[error("number must be finite")]
    NotFinite,
    #[error("'{value}' is not one of the declared options")]
    UnknownOption { value: String },
    #[error("'{value}' is not a parseable date")]
    InvalidDate { value: String },
    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },
    #[error("'{value}' is not a valid phone number")]
    InvalidPhone { value: String },
    #[error("'{value}' is not a valid URL")]
    InvalidUrl { value: String },
    #[error("amount must be zero or positive")]
    NegativeAmount,
    #[error("currency must not be empty")]
    EmptyCurrency,
    #[error("unit must not be empty")]
    EmptyUnit,
    #[error("asset id must be a positive number")]
    InvalidAssetId,
}

/// Validate a value payload against its attribute definition before any
/// create/update submission. Returns the payload to store, which may be a
/// normalized copy (scheme-less URLs gain an `https://` prefix).
///
/// The backend remains the authority: uniqueness conflicts on
/// (attribute, locale, channel) are still possible after this passes.
pub fn validate(
    def: &AttributeDefinition,
    body: &ValueBody,
    options: &ValidationOptions,
) -> Result<ValueBody, ValidationError> {
    if body.data_type() != def.data_type {
        return Err(ValidationError::TypeMismatch {
            attribute: def.id.clone(),
            expected: def.data_type,
            actual: body.data_type(),
        });
    }

    // Amount sign is checked before the emptiness shortcut: a price or
    // measurement counts as empty when its currency/unit is blank, and a
    // negative amount must not slip through on that path.
    if let ValueBody::Price { amount, .. } | ValueBody::Measurement { amount, .. } = body {
        if *amount < 0.0 {
            return Err(ValidationError::NegativeAmount);
        }
    }

    if body.is_empty() {
        if def.is_mandatory {
            return Err(ValidationError::MandatoryMissing {
                attribute: def.id.clone(),
            });
        }
        // Empty optional values carry no content to check.
        return Ok(body.clone());
    }

    match body {
        ValueBody::Text { value } => {
            if let Some(pattern) = &def.validation_rule {
                let re = Regex::new(pattern).map_err(|_| ValidationError::BadValidationRule {
                    pattern: pattern.clone(),
                })?;
                if !re.is_match(value) {
                    return Err(ValidationError::PatternMismatch {
                        value: value.clone(),
                        pattern: pattern.clone(),
                    });
                }
            }
            Ok(body.clone())
        }
        ValueBody::Number { value } => {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite);
            }
            Ok(body.clone())
        }
        // Booleans are coerced to true/false by construction.
        ValueBody::Boolean { .. } => Ok(body.clone()),
        ValueBody::Select { value } => {
            if !def.has_option(value) {
                return Err(ValidationError::UnknownOption {
                    value: value.clone(),
                });
            }
            Ok(body.clone())
        }
        ValueBody::MultiSelect { values } => {
            for value in values {
                if !def.has_option(value) {
                    return Err(ValidationError::UnknownOption {
                        value: value.clone(),
                    });
                }
            }
            Ok(body.clone())
        }
        ValueBody::Date { value } => {
            if parse_date(value) {
                Ok(body.clone())
            } else {
                Err(ValidationError::InvalidDate {
                    value: value.clone(),
                })
            }
        }
        ValueBody::Email { value } => {
            if EMAIL_RE.is_match(value) {
                Ok(body.clone())
            } else {
                Err(ValidationError::InvalidEmail {
                    value: value.clone(),
                })
            }
        }
        ValueBody::Phone { value } => {
            let re = match options.phone_policy {
                PhonePolicy::Loose => &*PHONE_LOOSE_RE,
                PhonePolicy::Strict => &*PHONE_STRICT_RE,
            };
            if re.is_match(value) {
                Ok(body.clone())
            } else {
                Err(ValidationError::InvalidPhone {
                    value: value.clone(),
                })
            }
        }
        ValueBody::Url { value } => normalize_url(value)
            .map(|normalized| ValueBody::Url { value: normalized })
            .ok_or_else(|| ValidationError::InvalidUrl {
                value: value.clone(),
            }),
        ValueBody::Price { amount, .. } => {
            if *amount < 0.0 {
                return Err(ValidationError::NegativeAmount);
            }
            // Non-empty currency is guaranteed by the emptiness check above.
            Ok(body.clone())
        }
        ValueBody::Measurement { amount, .. } => {
            if *amount < 0.0 {
                return Err(ValidationError::NegativeAmount);
            }
            Ok(body.clone())
        }
        ValueBody::Media { asset_id } => {
            if *asset_id <= 0 {
                return Err(ValidationError::InvalidAssetId);
            }
            Ok(body.clone())
        }
        // Stored as sanitized/raw HTML; no structural validation beyond
        // "is a string".
        ValueBody::RichText { .. } => Ok(body.clone()),
    }
}

fn parse_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Parse as URL, auto-prefixing `https://` when the scheme is missing.
/// Returns the string to store.
fn normalize_url(value: &str) -> Option<String> {
    if reqwest::Url::parse(value).is_ok() {
        return Some(value.to_string());
    }
    if !value.contains("://") {
        let prefixed = format!("https://{}", value);
        if reqwest::Url::parse(&prefixed).is_ok() {
            return Some(prefixed);
        }
    }
    None
}
