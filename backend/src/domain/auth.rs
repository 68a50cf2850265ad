//! Email/password account inputs.
//!
//! Handlers build these from raw request bodies before calling the account
//! ports, so services only ever see validated values.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{Email, UserName, UserValidationError};

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted at sign-up.
pub const PASSWORD_MAX: usize = 128;

/// Field-scoped validation failure for account payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// The name was rejected.
    Name(UserValidationError),
    /// The email was rejected.
    Email(UserValidationError),
    /// The password was empty.
    EmptyPassword,
    /// The password was outside the length bounds.
    PasswordLength {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
}

impl AccountValidationError {
    /// Request field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::EmptyPassword | Self::PasswordLength { .. } => "password",
        }
    }
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(err) | Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordLength { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Validated sign-up request.
///
/// # Examples
/// ```
/// use dashboard::domain::SignUpRequest;
///
/// let request = SignUpRequest::try_from_parts("Ada Lovelace", "Ada@Example.com", "hunter2hunter2")
///     .expect("valid sign-up");
/// assert_eq!(request.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    name: UserName,
    email: Email,
    password: Zeroizing<String>,
}

impl SignUpRequest {
    /// Validate raw sign-up inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AccountValidationError> {
        let name = UserName::new(name).map_err(AccountValidationError::Name)?;
        let email = Email::new(email).map_err(AccountValidationError::Email)?;
        let length = password.chars().count();
        if length == 0 {
            return Err(AccountValidationError::EmptyPassword);
        }
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(AccountValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Account holder name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Sign-in email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password, zeroed on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated sign-in credentials.
///
/// The password keeps caller-provided whitespace; only emptiness is checked
/// here so the length policy cannot leak which accounts exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Validate raw sign-in inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AccountValidationError> {
        let email = Email::new(email).map_err(AccountValidationError::Email)?;
        if password.is_empty() {
            return Err(AccountValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Sign-in email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password, zeroed on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
