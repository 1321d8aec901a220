//! Edit form schema: raw form input in, normalized update out.
//!
//! [`UserForm`] is the shape bound to form widgets: every field is text as
//! typed. [`validate`] turns it into a [`UserUpdate`] (age as a number,
//! gender as an enum, birth date as a calendar date) or returns the
//! [`FieldErrors`] to show next to each field. Validation is pure; it never
//! performs I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{FieldErrors, UserField};
use super::user::{Gender, UserRecord, wire_date};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

pub const REQUIRED: &str = "Required";
pub const MUST_BE_NUMBER: &str = "Must be a number";
pub const MUST_BE_POSITIVE: &str = "Must be positive";
pub const MUST_BE_GENDER: &str = "Must be male or female";
pub const PASSWORD_TOO_SHORT: &str = "Min 6 chars";
pub const MUST_BE_DATE: &str = "Must be a valid date";
pub const USERNAME_MUST_CONTAIN_FIRST_NAME: &str = "Username must contain first name";

/// Raw edit form values, exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub maiden_name: String,
    pub age: String,
    pub gender: String,
    pub username: String,
    pub password: String,
    pub birth_date: String,
}

impl UserForm {
    /// Blank form shown while a record's details are loading.
    pub fn blank() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            maiden_name: String::new(),
            age: String::new(),
            gender: Gender::Male.as_str().to_owned(),
            username: String::new(),
            password: String::new(),
            birth_date: String::new(),
        }
    }

    /// Current text of `field`.
    pub fn get(&self, field: UserField) -> &str {
        match field {
            UserField::FirstName => &self.first_name,
            UserField::LastName => &self.last_name,
            UserField::MaidenName => &self.maiden_name,
            UserField::Age => &self.age,
            UserField::Gender => &self.gender,
            UserField::Username => &self.username,
            UserField::Password => &self.password,
            UserField::BirthDate => &self.birth_date,
        }
    }

    /// Replace the text of `field`.
    pub fn set(&mut self, field: UserField, value: impl Into<String>) {
        let slot = match field {
            UserField::FirstName => &mut self.first_name,
            UserField::LastName => &mut self.last_name,
            UserField::MaidenName => &mut self.maiden_name,
            UserField::Age => &mut self.age,
            UserField::Gender => &mut self.gender,
            UserField::Username => &mut self.username,
            UserField::Password => &mut self.password,
            UserField::BirthDate => &mut self.birth_date,
        };
        *slot = value.into();
    }
}

impl Default for UserForm {
    fn default() -> Self {
        Self::blank()
    }
}

impl From<&UserRecord> for UserForm {
    fn from(record: &UserRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            maiden_name: record.maiden_name.clone(),
            age: record.age.to_string(),
            gender: record.gender.as_str().to_owned(),
            username: record.username.clone(),
            password: record.password.clone(),
            birth_date: record.birth_date.map(wire_date::format).unwrap_or_default(),
        }
    }
}

/// Validated, normalized edit ready to send to the user service.
///
/// Serializes to the PUT body: camelCase names, `birthDate` as `YYYY-MM-DD`,
/// absent optional fields omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub maiden_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub username: String,
    pub password: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_date::option"
    )]
    pub birth_date: Option<NaiveDate>,
}

impl UserUpdate {
    /// Overwrite `record` with this update; absent optional fields are kept.
    pub fn apply_to(&self, record: &mut UserRecord) {
        record.first_name.clone_from(&self.first_name);
        record.last_name.clone_from(&self.last_name);
        record.maiden_name.clone_from(&self.maiden_name);
        record.username.clone_from(&self.username);
        record.password.clone_from(&self.password);
        if let Some(age) = self.age {
            record.age = age;
        }
        if let Some(gender) = self.gender {
            record.gender = gender;
        }
        if let Some(birth_date) = self.birth_date {
            record.birth_date = Some(birth_date);
        }
    }
}

/// Validate raw form input.
///
/// # Errors
///
/// Returns every failed field with its message. Required text fields treat
/// whitespace-only input as empty. The cross-field username rule reports
/// against `username` and is only checked once every field rule has passed.
///
/// # Examples
///
/// ```
/// use user_admin::domain::{UserField, UserForm, validate};
///
/// let mut form = UserForm::blank();
/// form.first_name = "Ann".to_owned();
/// form.last_name = "Lee".to_owned();
/// form.username = "bob99".to_owned();
/// form.password = "secret1".to_owned();
///
/// let errors = validate(&form).expect_err("username lacks first name");
/// assert!(errors.contains(UserField::Username));
/// ```
pub fn validate(form: &UserForm) -> Result<UserUpdate, FieldErrors> {
    let mut errors = FieldErrors::new();

    require(&mut errors, UserField::FirstName, &form.first_name);
    require(&mut errors, UserField::LastName, &form.last_name);
    require(&mut errors, UserField::Username, &form.username);
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(UserField::Password, PASSWORD_TOO_SHORT);
    }

    let age = parse_age(&form.age).unwrap_or_else(|message| {
        errors.insert(UserField::Age, message);
        None
    });
    let gender = parse_gender(&form.gender).unwrap_or_else(|message| {
        errors.insert(UserField::Gender, message);
        None
    });
    let birth_date = parse_birth_date(&form.birth_date).unwrap_or_else(|message| {
        errors.insert(UserField::BirthDate, message);
        None
    });

    if !errors.is_empty() {
        return Err(errors);
    }

    let username = form.username.to_lowercase();
    if !username.contains(&form.first_name.to_lowercase()) {
        errors.insert(UserField::Username, USERNAME_MUST_CONTAIN_FIRST_NAME);
        return Err(errors);
    }

    Ok(UserUpdate {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        maiden_name: form.maiden_name.clone(),
        age,
        gender,
        username: form.username.clone(),
        password: form.password.clone(),
        birth_date,
    })
}

fn require(errors: &mut FieldErrors, field: UserField, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field, REQUIRED);
    }
}

fn parse_age(raw: &str) -> Result<Option<u32>, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed.parse::<i64>().map_err(|_| MUST_BE_NUMBER)?;
    if value < 0 {
        return Err(MUST_BE_POSITIVE);
    }
    u32::try_from(value).map(Some).map_err(|_| MUST_BE_NUMBER)
}

fn parse_gender(raw: &str) -> Result<Option<Gender>, &'static str> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<Gender>().map(Some).map_err(|_| MUST_BE_GENDER)
}

fn parse_birth_date(raw: &str) -> Result<Option<NaiveDate>, &'static str> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    wire_date::parse(raw).map(Some).ok_or(MUST_BE_DATE)
}
