//! Key identifier parsing.
//!
//! A key identifier addresses one key (optionally one version of it) at the
//! custody service:
//!
//! ```text
//! http(s)://<vault-name>.<service-domain>/keys/<key-name>[/<key-version>][/]
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;

/// Example of the accepted identifier shape, quoted in parse errors.
pub const ACCEPTED_SHAPE: &str = "https://keyvaultname.vault.example.net/keys/myKey/99d67321dd9841af859129cd5551a871";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([^/.\s]+)\.([^/\s]+)/keys/([^/.\s]+)(?:/([^/.\s]+))?/?$")
        .expect("identifier grammar is a valid pattern")
});

/// Resolved coordinates of a key version at the custody service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyReference {
    vault_location: String,
    key_name: String,
    key_version: String,
}

impl KeyReference {
    /// Parse a key identifier.
    ///
    /// The scheme of the returned vault location is always `https`. An
    /// identifier without a version yields an empty version, meaning the
    /// latest one.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedIdentifier`] if `identifier` does not
    /// have the shape `http(s)://<vault>.<domain>/keys/<name>[/<version>][/]`.
    pub fn parse(identifier: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedIdentifier {
            identifier: identifier.to_owned(),
        };
        let caps = IDENTIFIER.captures(identifier).ok_or_else(malformed)?;

        let (Some(vault), Some(domain), Some(name)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            return Err(malformed());
        };

        Ok(Self {
            vault_location: format!("https://{}.{}", vault.as_str(), domain.as_str()),
            key_name: name.as_str().to_owned(),
            key_version: caps
                .get(4)
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default(),
        })
    }

    /// Origin of the vault, e.g. `https://kv1.vault.example.net`.
    pub fn vault_location(&self) -> &str {
        &self.vault_location
    }

    /// Name of the key within the vault.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Key version; empty means the latest version.
    pub fn key_version(&self) -> &str {
        &self.key_version
    }
}

impl FromStr for KeyReference {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/keys/{}", self.vault_location, self.key_name)?;
        if !self.key_version.is_empty() {
            write!(f, "/{}", self.key_version)?;
        }
        Ok(())
    }
}
