use std::{convert::TryFrom, error, fmt, str::FromStr};

use serde::{de, ser};

/// Represents JSON-RPC protocol version.
///
/// The version is chosen by the caller and decides how requests are encoded
/// and how replies are validated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Version {
    /// Represents JSON-RPC 1.0 version.
    V1_0,
    /// Represents JSON-RPC 2.0 version.
    V2_0,
}

impl Default for Version {
    fn default() -> Self {
        Version::V2_0
    }
}

impl Version {
    /// Returns the version string as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1_0 => "1.0",
            Version::V2_0 => "2.0",
        }
    }

    /// JSON-RPC 1.0 has no batch form.
    pub fn supports_batch(&self) -> bool {
        matches!(self, Version::V2_0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized JSON-RPC protocol version.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnsupportedVersion(pub String);

impl fmt::Display for UnsupportedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported JSON-RPC protocol version: {:?}", self.0)
    }
}

impl error::Error for UnsupportedVersion {}

impl FromStr for Version {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(Version::V1_0),
            "2.0" => Ok(Version::V2_0),
            other => Err(UnsupportedVersion(other.to_owned())),
        }
    }
}

impl TryFrom<&str> for Version {
    type Error = UnsupportedVersion;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl ser::Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'a> de::Deserialize<'a> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Version, D::Error>
    where
        D: de::Deserializer<'a>,
    {
        deserializer.deserialize_str(VersionVisitor)
    }
}

struct VersionVisitor;
impl<'a> de::Visitor<'a> for VersionVisitor {
    type Value = Version;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(de::Error::custom)
    }
}
