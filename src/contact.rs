//! Submitted-contact ingestion.
//!
//! An upload is a JSON array of `{name, img, numbers:[{type, number}]}`
//! objects scraped from an external phone book. Contacts are immutable once
//! parsed and have no identity beyond their position in the sequence.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::phone::obfuscate_tail;

/// One phone number as submitted, with its free-text label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedNumber {
    /// Free-text label from the source phone book ("mobile", "Work", ...).
    #[serde(rename = "type")]
    pub label: String,
    /// The number exactly as submitted, punctuation included.
    pub number: String,
}

impl SubmittedNumber {
    /// The number with its final three digits masked for display.
    #[must_use]
    pub fn obfuscated(&self) -> String {
        obfuscate_tail(&self.number)
    }
}

/// One contact from an uploaded payload.
///
/// An empty name is legal; it only means the contact can never match a
/// remote entry by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedContact {
    pub name: String,
    #[serde(default)]
    pub numbers: Vec<SubmittedNumber>,
    #[serde(rename = "img", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Parses an uploaded JSON payload into a contact list.
///
/// The whole payload is validated up front; a malformed element fails the
/// entire upload rather than producing a partial list.
pub fn parse_contacts(json: &str) -> Result<Vec<SubmittedContact>, ValidationError> {
    if json.trim().is_empty() {
        return Err(ValidationError::EmptyPayload);
    }
    let contacts: Vec<SubmittedContact> = serde_json::from_str(json)?;
    Ok(contacts)
}

static HANDLE_RE: OnceLock<Regex> = OnceLock::new();

/// Identifier an upload is filed under.
///
/// Restricted to word characters so handles are safe to embed in keys and
/// URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Validates and wraps a handle string.
    pub fn new(handle: impl Into<String>) -> Result<Self, ValidationError> {
        let handle = handle.into();
        let re = HANDLE_RE.get_or_init(|| {
            Regex::new(r"^\w+$").expect("handle pattern is valid")
        });
        if re.is_match(&handle) {
            Ok(Self(handle))
        } else {
            Err(ValidationError::InvalidHandle { handle })
        }
    }

    /// The handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Handle {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let json = r#"[
            {"name": "Jane Doe",
             "img": "http://example.com/jane.jpg",
             "numbers": [{"type": "mobile", "number": "(206) 555-1212"}]},
            {"name": "John Roe", "numbers": []}
        ]"#;
        let contacts = parse_contacts(json).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name, "Jane Doe");
        assert_eq!(contacts[0].numbers[0].label, "mobile");
        assert_eq!(contacts[0].numbers[0].number, "(206) 555-1212");
        assert_eq!(
            contacts[0].image_url.as_deref(),
            Some("http://example.com/jane.jpg")
        );
        assert!(contacts[1].numbers.is_empty());
        assert!(contacts[1].image_url.is_none());
    }

    #[test]
    fn test_parse_numbers_default_empty() {
        let contacts = parse_contacts(r#"[{"name": "Solo"}]"#).unwrap();
        assert_eq!(contacts[0].name, "Solo");
        assert!(contacts[0].numbers.is_empty());
    }

    #[test]
    fn test_parse_empty_name_is_legal() {
        let contacts =
            parse_contacts(r#"[{"name": "", "numbers": [{"type": "", "number": "555-0199"}]}]"#)
                .unwrap();
        assert_eq!(contacts[0].name, "");
    }

    #[test]
    fn test_parse_missing_name_rejected() {
        let result = parse_contacts(r#"[{"numbers": []}]"#);
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::MalformedPayload(_)
        ));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = parse_contacts("[{not json");
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::MalformedPayload(_)
        ));
    }

    #[test]
    fn test_parse_empty_payload() {
        assert!(matches!(
            parse_contacts("   ").unwrap_err(),
            ValidationError::EmptyPayload
        ));
    }

    #[test]
    fn test_obfuscated_number() {
        let number = SubmittedNumber {
            label: "mobile".to_string(),
            number: "206-555-1212".to_string(),
        };
        assert_eq!(number.obfuscated(), "206-555-1xxx");
    }

    #[test]
    fn test_handle_valid() {
        let handle = Handle::new("brad_1").unwrap();
        assert_eq!(handle.as_str(), "brad_1");
        assert_eq!(handle.to_string(), "brad_1");
    }

    #[test]
    fn test_handle_rejects_punctuation() {
        assert!(matches!(
            Handle::new("bad handle").unwrap_err(),
            ValidationError::InvalidHandle { .. }
        ));
        assert!(Handle::new("semi;colon").is_err());
        assert!(Handle::new("").is_err());
    }

    #[test]
    fn test_handle_serde_round_trip() {
        let handle = Handle::new("jane").unwrap();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"jane\"");
        let back: Handle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }
}
