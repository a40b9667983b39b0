//! User model, credentials and session

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::forms::{parse_toggle, FieldKind, FieldSpec, FormError, FormRecord};

/// Signup request: the new member's profile
#[derive(Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Unique, used as the login identifier
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Write-only
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,
    #[validate(length(min = 1, message = "Date of birth is required"))]
    pub date_of_birth: String,
    pub membership_status: bool,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("gender", &self.gender)
            .field("date_of_birth", &self.date_of_birth)
            .field("membership_status", &self.membership_status)
            .finish()
    }
}

static SIGNUP_FIELDS: [FieldSpec; 7] = [
    FieldSpec::required("name", "Name", FieldKind::Text),
    FieldSpec::required("email", "Email", FieldKind::Email),
    FieldSpec::required("password", "Password", FieldKind::Password),
    FieldSpec::required("phone_number", "Phone number", FieldKind::Tel),
    FieldSpec::required("gender", "Gender", FieldKind::Text),
    FieldSpec::required("date_of_birth", "Date of birth", FieldKind::Date),
    FieldSpec::optional("membership_status", "Membership status", FieldKind::Toggle),
];

impl FormRecord for SignupRequest {
    fn fields() -> &'static [FieldSpec] {
        &SIGNUP_FIELDS
    }

    fn value(&self, name: &str) -> Option<String> {
        let value = match name {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "password" => self.password.clone(),
            "phone_number" => self.phone_number.clone(),
            "gender" => self.gender.clone(),
            "date_of_birth" => self.date_of_birth.clone(),
            "membership_status" => self.membership_status.to_string(),
            _ => return None,
        };
        Some(value)
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        match name {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "phone_number" => self.phone_number = value.to_string(),
            "gender" => self.gender = value.to_string(),
            "date_of_birth" => self.date_of_birth = value.to_string(),
            "membership_status" => self.membership_status = parse_toggle(name, value)?,
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

/// Login credentials
#[derive(Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

static LOGIN_FIELDS: [FieldSpec; 2] = [
    FieldSpec::required("email", "Email", FieldKind::Email),
    FieldSpec::required("password", "Password", FieldKind::Password),
];

impl FormRecord for LoginRequest {
    fn fields() -> &'static [FieldSpec] {
        &LOGIN_FIELDS
    }

    fn value(&self, name: &str) -> Option<String> {
        match name {
            "email" => Some(self.email.clone()),
            "password" => Some(self.password.clone()),
            _ => None,
        }
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        match name {
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

/// Session returned by signup and login.
///
/// The token is the only credential the client holds. Any other fields the
/// server sends are kept so the stored session is the object received.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            email: None,
            extra: Map::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> Option<&str> {
        self.extra
            .get("name")
            .and_then(Value::as_str)
            .or(self.email.as_deref())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .field("extra", &self.extra)
            .finish()
    }
}
