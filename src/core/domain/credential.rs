//! Credential type.
//!
//! A username and secret pair that only ever exists in memory or inside an
//! encrypted envelope.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::core::validation;
use crate::error::{ContentError, Result};

/// A credential to protect.
///
/// The secret is wiped from memory on drop and never shown by `Debug`.
#[derive(Clone)]
pub struct Credential {
    username: String,
    secret: Zeroizing<String>,
}

/// Transport form. Fields are optional so a missing one can be reported
/// as such instead of as a generic parse error.
#[derive(Deserialize)]
struct Wire {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    secret: Option<String>,
}

impl Wire {
    fn into_credential(self) -> std::result::Result<Credential, ContentError> {
        let secret = Zeroizing::new(self.secret.ok_or(ContentError::MissingField("secret"))?);
        let username = self.username.ok_or(ContentError::MissingField("username"))?;
        Ok(Credential { username, secret })
    }
}

impl Credential {
    /// Create a validated credential.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the username or secret is empty.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let secret = Zeroizing::new(secret.into());
        validation::validate_credential(&username, &secret)?;
        Ok(Self { username, secret })
    }

    /// Account name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Plaintext secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Serialize to the transport form that gets encrypted.
    pub fn to_transport(&self) -> Result<Zeroizing<String>> {
        let json = serde_json::to_string(self)?;
        Ok(Zeroizing::new(json))
    }

    /// Deserialize the transport form.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::MissingField` if a field is absent and
    /// `ContentError::Malformed` if the content is not a JSON object.
    pub fn from_transport(content: &str, origin: &str) -> Result<Self> {
        let wire: Wire = serde_json::from_str(content).map_err(|e| ContentError::Malformed {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        Ok(wire.into_credential()?)
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username && self.secret.as_str() == other.secret.as_str()
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"********")
            .finish()
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Credential", 2)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("secret", self.secret.as_str())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Wire::deserialize(deserializer)?
            .into_credential()
            .map_err(serde::de::Error::custom)
    }
}
