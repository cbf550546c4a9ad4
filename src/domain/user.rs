use chrono::{DateTime, Utc};

use super::contact::{max_len, normalize_phone, require, validate_email};
use super::errors::DomainError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored user together with the password hash, used only for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Registration payload as received.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Registration that passed field validation. Uniqueness is checked later.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl TryFrom<Registration> for ValidRegistration {
    type Error = DomainError;

    fn try_from(r: Registration) -> Result<Self, Self::Error> {
        let name = require("name", r.name.as_deref())?.to_string();
        max_len("name", &name, 100)?;

        let email = require("email", r.email.as_deref())?.to_lowercase();
        validate_email("email", &email)?;

        let phone = normalize_phone(require("phone", r.phone.as_deref())?);
        max_len("phone", &phone, 20)?;

        // Passwords are taken verbatim; surrounding whitespace is significant.
        let password = match r.password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(DomainError::validation("password: This field is required.")),
        };
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "password: Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."
            )));
        }

        Ok(ValidRegistration {
            name,
            email,
            phone,
            password,
        })
    }
}

/// What the repository needs to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

/// Successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}
