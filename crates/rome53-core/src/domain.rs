//! Fully-qualified domain names
//!
//! Route 53 always stores record names fully qualified and lower-case, so
//! every name the user hands us is brought into that form before it is
//! compared against anything the provider returns.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a domain name, excluding the root separator (RFC 1035)
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// A validated, fully-qualified, lower-case domain name
///
/// The inner string always ends with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainName(String);

impl DomainName {
    /// Normalize and validate a user-supplied name
    ///
    /// `"Example.com"` and `"example.com."` produce the same value.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_suffix('.').unwrap_or(trimmed);

        if bare.is_empty() {
            return Err(Error::invalid_input("Domain name cannot be empty"));
        }

        if bare.len() > MAX_NAME_LEN {
            return Err(Error::invalid_input(format!(
                "Domain name too long: {} chars (max {}). Got: {}",
                bare.len(),
                MAX_NAME_LEN,
                trimmed
            )));
        }

        for (index, label) in bare.split('.').enumerate() {
            validate_label(label, index == 0, trimmed)?;
        }

        Ok(Self(format!("{}.", bare.to_ascii_lowercase())))
    }

    /// The fully-qualified form, trailing `.` included
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_label(label: &str, leading: bool, name: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::invalid_input(format!(
            "Domain name has empty label: '{}'",
            name
        )));
    }

    if label.len() > MAX_LABEL_LEN {
        return Err(Error::invalid_input(format!(
            "Domain label too long: {} chars (max {}). Label: '{}'",
            label.len(),
            MAX_LABEL_LEN,
            label
        )));
    }

    // Wildcard records are allowed, but only as the whole leftmost label
    if label == "*" && leading {
        return Ok(());
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::invalid_input(format!(
            "Domain label contains invalid characters. Label: '{}'. \
            Valid: alphanumeric, hyphen and underscore only.",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(Error::invalid_input(format!(
            "Domain label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

impl FromStr for DomainName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
