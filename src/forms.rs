//! Form payloads and their validation rules.

use serde::Deserialize;
use thiserror::Error;

pub const USERNAME_MAX: usize = 150;
pub const NAME_MAX: usize = 200;
pub const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required.")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },
    #[error("Username may contain only letters, numbers, and @/./+/-/_ characters.")]
    InvalidUsername,
    #[error("A user with that username already exists.")]
    UsernameTaken,
    #[error("The two password fields didn't match.")]
    PasswordMismatch,
    #[error("This password is too short. It must contain at least 8 characters.")]
    PasswordTooShort,
    #[error("This password is entirely numeric.")]
    PasswordNumeric,
    #[error("Enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomForm {
    pub topic: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserForm {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageForm {
    pub body: Option<String>,
}

/// A registration that passed the field checks; the username is already lowercased.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidRoom {
    pub topic: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidUserDetails {
    pub username: String,
    pub email: String,
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn check_username(username: &str) -> Result<(), FormError> {
    if username.is_empty() {
        return Err(FormError::Required("Username"));
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(FormError::TooLong { field: "Username", max: USERNAME_MAX });
    }
    if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        return Err(FormError::InvalidUsername);
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), FormError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(FormError::InvalidEmail);
    };
    let domain_ok = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'));
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) || domain.contains('@') {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}

fn required_text(value: Option<&str>, field: &'static str, max: usize) -> Result<String, FormError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(FormError::Required(field));
    }
    if value.chars().count() > max {
        return Err(FormError::TooLong { field, max });
    }
    Ok(value.to_owned())
}

impl RegisterForm {
    /// Field-level checks; username uniqueness needs the database and is checked by the caller.
    pub fn validate(&self) -> Result<ValidRegistration, Vec<FormError>> {
        let mut errors = Vec::new();

        let username = normalize_username(self.username.as_deref().unwrap_or_default());
        if let Err(e) = check_username(&username) {
            errors.push(e);
        }

        let password1 = self.password1.clone().unwrap_or_default();
        let password2 = self.password2.clone().unwrap_or_default();
        if password1.is_empty() {
            errors.push(FormError::Required("Password"));
        } else if password1 != password2 {
            errors.push(FormError::PasswordMismatch);
        } else {
            if password1.chars().count() < PASSWORD_MIN {
                errors.push(FormError::PasswordTooShort);
            }
            if password1.chars().all(|c| c.is_ascii_digit()) {
                errors.push(FormError::PasswordNumeric);
            }
        }

        if errors.is_empty() {
            Ok(ValidRegistration { username, password: password1 })
        } else {
            Err(errors)
        }
    }
}

impl RoomForm {
    pub fn validate(&self) -> Result<ValidRoom, Vec<FormError>> {
        let topic = required_text(self.topic.as_deref(), "Topic", NAME_MAX);
        let name = required_text(self.name.as_deref(), "Name", NAME_MAX);
        let description = self.description.as_deref().map(str::trim).unwrap_or_default().to_owned();

        match (topic, name) {
            (Ok(topic), Ok(name)) => Ok(ValidRoom { topic, name, description }),
            (topic, name) => Err([topic.err(), name.err()].into_iter().flatten().collect()),
        }
    }
}

impl UserForm {
    pub fn validate(&self) -> Result<ValidUserDetails, Vec<FormError>> {
        let mut errors = Vec::new();

        let username = normalize_username(self.username.as_deref().unwrap_or_default());
        if let Err(e) = check_username(&username) {
            errors.push(e);
        }

        let email = self.email.as_deref().map(str::trim).unwrap_or_default().to_owned();
        if !email.is_empty() {
            if let Err(e) = check_email(&email) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(ValidUserDetails { username, email })
        } else {
            Err(errors)
        }
    }
}
