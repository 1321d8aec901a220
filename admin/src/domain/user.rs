//! User record model as held by the client.
//!
//! Records are owned by the remote user service; the client keeps copies per
//! page and never a live reference. Wire names are camelCase and
//! `birthDate` travels as an ISO calendar date string.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identity assigned by the remote user service. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw service identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier used in request paths.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gender values accepted by the user service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Wire spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected gender spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender `{0}`")]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(UnknownGender(value.to_owned())),
        }
    }
}

/// One user as returned by the list, detail, and update endpoints.
///
/// ## Invariants
/// - `id` never changes for the lifetime of the record.
/// - `birth_date` carries no time component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub maiden_name: String,
    pub age: u32,
    pub gender: Gender,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, with = "wire_date::option")]
    pub birth_date: Option<NaiveDate>,
}

/// Conversion between [`NaiveDate`] and the wire's calendar-date strings.
pub mod wire_date {
    use chrono::NaiveDate;

    /// Output format for dates sent to the service.
    pub const FORMAT: &str = "%Y-%m-%d";

    /// Parse a wire or form date.
    ///
    /// Accepts `YYYY-MM-DD` (month and day may be unpadded, as the service
    /// itself emits them) and full ISO date-times, keeping only the date.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);
        NaiveDate::parse_from_str(date_part, FORMAT).ok()
    }

    /// Render a date in the wire format.
    pub fn format(date: NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    /// Serde adapter for `Option<NaiveDate>` fields.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer, de};

        pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(date) => serializer.serialize_str(&super::format(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => super::parse(text)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid calendar date `{text}`"))),
            }
        }
    }
}
