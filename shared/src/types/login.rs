use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Login / signup wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginData {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupData {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful / failed login or signup response envelope.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthResponse {
    Success {
        user_id: String,
        username: String,
        message: String,
        redirect: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl LoginData {
    /// Any non-empty credentials are accepted.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(())
    }
}

impl SignupData {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Auth errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    MissingCredentials,
    PasswordMismatch,
    InvalidBody,
    InternalError,
}

impl AuthError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidBody => "INVALID_BODY",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingCredentials => "Please enter both username and password".to_string(),
            Self::PasswordMismatch => "Passwords do not match".to_string(),
            Self::InvalidBody => "Request body is not valid JSON".to_string(),
            Self::InternalError => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> AuthResponse {
        AuthResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }
}
