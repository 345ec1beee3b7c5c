use serde::{Deserialize, Serialize};

use crate::types::session::Plan;

/// One-time lifetime price, in SOL.
pub const LIFETIME_PRICE_SOL: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentData {
    #[serde(default)]
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentResponse {
    Success {
        plan: Plan,
        price_sol: u32,
        message: String,
        redirect: String,
    },
    Error {
        code: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentError {
    NotLoggedIn,
    InternalError,
}

impl PaymentError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "NOT_LOGGED_IN",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::NotLoggedIn => "Sign up or log in before purchasing".to_string(),
            Self::InternalError => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> PaymentResponse {
        PaymentResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }
}
