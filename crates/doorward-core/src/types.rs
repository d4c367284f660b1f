use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Numeric door identifier (positive, site-assigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorId(i32);

impl DoorId {
    /// Create a new door ID with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDoor` if the ID is not greater than zero.
    pub fn new(id: i32) -> Result<Self> {
        if id <= 0 {
            return Err(Error::InvalidDoor {
                message: format!("Door ID must be greater than 0, got {id}"),
            });
        }
        Ok(DoorId(id))
    }

    /// Get the raw door ID.
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DoorId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: i32 = s.parse().map_err(|_| Error::InvalidDoor {
            message: format!("Invalid door ID: {s}"),
        })?;
        DoorId::new(id)
    }
}

/// Which side of the door a guard watches.
///
/// A door has at most two access points; convention names them "A" (outside)
/// and "B" (inside).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorSide {
    A,
    B,
}

impl fmt::Display for DoorSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorSide::A => write!(f, "A"),
            DoorSide::B => write!(f, "B"),
        }
    }
}

impl std::str::FromStr for DoorSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" | "a" => Ok(DoorSide::A),
            "B" | "b" => Ok(DoorSide::B),
            other => Err(Error::InvalidSide {
                value: other.to_string(),
            }),
        }
    }
}

/// The input modality a guard handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    /// NFC/RFID tag reader, continuously polled.
    Nfc,
    /// PIN terminal, line oriented.
    Pin,
}

impl GuardKind {
    /// Stable lowercase name used in logs and backend lookups.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardKind::Nfc => "nfc",
            GuardKind::Pin => "pin",
        }
    }
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An opaque credential identifier.
///
/// Either a hex-encoded tag UID or the digits typed at a PIN terminal. No
/// structure is imposed beyond equality; ownership is transient, scoped to
/// one authorization attempt.
///
/// # Security
/// Equality is constant-time to prevent timing attacks when credentials are
/// compared during authorization.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Credential(String);

impl Credential {
    /// Create a credential from its textual form.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::InvalidCredential {
                message: "Credential must not be empty".to_string(),
            });
        }
        Ok(Credential(value))
    }

    /// Create a credential from raw tag UID bytes, hex encoded lowercase.
    ///
    /// ```
    /// use doorward_core::Credential;
    ///
    /// let cred = Credential::from_uid_bytes(&[0x00, 0x01, 0xf6, 0x80]);
    /// assert_eq!(cred.as_str(), "0001f680");
    /// ```
    #[must_use]
    pub fn from_uid_bytes(uid: &[u8]) -> Self {
        Credential(uid.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Get the credential as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Credential::new(s)
    }
}

/// Constant-time comparison implementation for Credential.
impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for Credential {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case("7", 7)]
    #[case("214", 214)]
    fn test_door_id_valid(#[case] input: &str, #[case] expected: i32) {
        let id: DoorId = input.parse().unwrap();
        assert_eq!(id.as_i32(), expected);
        assert_eq!(id.to_string(), expected.to_string());
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("front")]
    fn test_door_id_invalid(#[case] input: &str) {
        let result: Result<DoorId> = input.parse();
        assert!(result.is_err());
    }

    #[rstest]
    #[case("A", DoorSide::A)]
    #[case("a", DoorSide::A)]
    #[case("B", DoorSide::B)]
    fn test_door_side_parse(#[case] input: &str, #[case] expected: DoorSide) {
        let side: DoorSide = input.parse().unwrap();
        assert_eq!(side, expected);
    }

    #[test]
    fn test_door_side_invalid() {
        assert!("C".parse::<DoorSide>().is_err());
        assert!("".parse::<DoorSide>().is_err());
    }

    #[test]
    fn test_guard_kind_names() {
        assert_eq!(GuardKind::Nfc.to_string(), "nfc");
        assert_eq!(GuardKind::Pin.to_string(), "pin");
    }

    #[test]
    fn test_credential_from_uid_bytes() {
        let cred = Credential::from_uid_bytes(&[0x00, 0x01, 0xf6, 0x80]);
        assert_eq!(cred.as_str(), "0001f680");
    }

    #[test]
    fn test_credential_equality() {
        let a = Credential::new("1234").unwrap();
        let b = Credential::new("1234").unwrap();
        let c = Credential::new("4321").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_credential_empty_rejected() {
        assert!(Credential::new("").is_err());
    }

    #[test]
    fn test_guard_kind_serialization() {
        let serialized = serde_json::to_string(&GuardKind::Nfc).unwrap();
        assert_eq!(serialized, "\"nfc\"");

        let deserialized: GuardKind = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, GuardKind::Nfc);
    }

    #[test]
    fn test_door_id_serialization_is_transparent() {
        let id = DoorId::new(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }
}
