//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter reports failures
//! through [`UserDirectoryError`](crate::domain::ports::UserDirectoryError);
//! the loader and the edit session translate them into [`AdminError`] before
//! recording them in their state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ports::UserDirectoryError;
use super::user::UserId;

/// Editable fields of a user, named as they travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserField {
    FirstName,
    LastName,
    MaidenName,
    Age,
    Gender,
    Username,
    Password,
    BirthDate,
}

impl UserField {
    /// Fields in form order.
    pub const ALL: [Self; 8] = [
        Self::FirstName,
        Self::LastName,
        Self::MaidenName,
        Self::Age,
        Self::Gender,
        Self::Username,
        Self::Password,
        Self::BirthDate,
    ];

    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::MaidenName => "maidenName",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Username => "username",
            Self::Password => "password",
            Self::BirthDate => "birthDate",
        }
    }

    /// Human label shown next to the field.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::MaidenName => "Maiden name",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Username => "Username",
            Self::Password => "Password",
            Self::BirthDate => "Birth date",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation messages. Empty means valid.
///
/// A field keeps the first message recorded against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<UserField, String>);

impl FieldErrors {
    /// An empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless the field already failed.
    pub fn insert(&mut self, field: UserField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message recorded for `field`, if any.
    pub fn get(&self, field: UserField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether `field` failed validation.
    pub fn contains(&self, field: UserField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failed fields with their messages, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (UserField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Failures surfaced by the list loader, detail fetcher, and edit session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    /// The request did not complete or the service answered with a
    /// non-success status.
    #[error("network failure: {message}")]
    NetworkFailure { message: String },
    /// The requested user no longer exists.
    #[error("user {id} not found")]
    NotFound { id: UserId },
    /// The form was rejected before any request was made.
    #[error("validation failed: {errors}")]
    ValidationFailure { errors: FieldErrors },
    /// The service answered with a body that could not be decoded.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl AdminError {
    /// Convenience constructor for [`AdminError::NetworkFailure`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }
}

impl From<UserDirectoryError> for AdminError {
    fn from(value: UserDirectoryError) -> Self {
        match value {
            UserDirectoryError::NotFound { id } => Self::NotFound { id },
            UserDirectoryError::Decode { message } => Self::MalformedResponse { message },
            other => Self::network(other.to_string()),
        }
    }
}

impl From<FieldErrors> for AdminError {
    fn from(errors: FieldErrors) -> Self {
        Self::ValidationFailure { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.insert(UserField::Username, "Required");
        errors.insert(UserField::Username, "Username must contain first name");

        assert_eq!(errors.get(UserField::Username), Some("Required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn field_errors_display_in_form_order() {
        let mut errors = FieldErrors::new();
        errors.insert(UserField::Password, "Min 6 chars");
        errors.insert(UserField::FirstName, "Required");

        assert_eq!(errors.to_string(), "firstName: Required; password: Min 6 chars");
    }

    #[test]
    fn field_errors_serialise_by_wire_name() {
        let mut errors = FieldErrors::new();
        errors.insert(UserField::BirthDate, "Must be a valid date");

        let value = serde_json::to_value(&errors).expect("errors encode");
        assert_eq!(value, serde_json::json!({ "birthDate": "Must be a valid date" }));
    }

    #[rstest]
    #[case(
        UserDirectoryError::not_found(UserId::new(7)),
        AdminError::NotFound { id: UserId::new(7) }
    )]
    #[case(
        UserDirectoryError::decode("missing field `id`"),
        AdminError::MalformedResponse { message: "missing field `id`".to_owned() }
    )]
    #[case(
        UserDirectoryError::timeout("deadline elapsed"),
        AdminError::network("user service timeout: deadline elapsed")
    )]
    #[case(
        UserDirectoryError::status(503_u16, "unavailable"),
        AdminError::network("user service answered status 503: unavailable")
    )]
    fn maps_port_errors_onto_the_domain_taxonomy(
        #[case] source: UserDirectoryError,
        #[case] expected: AdminError,
    ) {
        assert_eq!(AdminError::from(source), expected);
    }
}
