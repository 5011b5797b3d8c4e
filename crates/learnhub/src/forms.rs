//! Local validation for the auth forms.
//!
//! Everything here runs before the session store is involved. A form that
//! fails validation never reaches the auth service.

use learnhub_gateway::RegisterRequest;

/// Shortest password the forms accept.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Why a form can't be submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords don't match")]
    PasswordMismatch,

    /// The reset page was opened without a `token` query parameter.
    #[error("The password reset link is invalid or expired")]
    MissingResetToken,
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

/// `local@domain.tld`, loosely: one `@`, something before it, and a dot
/// inside the part after it.
fn email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'));
    if local.is_empty()
        || domain.contains('@')
        || value.contains(char::is_whitespace)
        || !domain_ok
    {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    required(password, "Password")?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    required(confirmation, "Confirm password")?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.email, "Email")?;
        required(&self.password, "Password")
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Checks fields in the order they appear on the page.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.full_name, "Full name")?;
        required(&self.username, "Username")?;
        required(&self.email, "Email")?;
        email(&self.email)?;
        new_password(&self.password, &self.confirm_password)
    }

    /// The request body for the auth service. Trims the text fields; the
    /// password is sent as typed.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        email(&self.email)
    }
}

/// The reset page: the token comes from the link, the passwords from the
/// user.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => {}
            _ => return Err(ValidationError::MissingResetToken),
        }
        new_password(&self.password, &self.confirm_password)
    }
}
