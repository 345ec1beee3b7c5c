use serde::{Deserialize, Serialize};

use crate::gate::Decision;

/// `{"status":"error","code":..,"message":..}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// The body an API caller gets instead of a redirect. `None` for `Allow`.
    pub fn for_decision(decision: Decision) -> Option<Self> {
        match decision {
            Decision::Allow => None,
            Decision::GotoHome => Some(Self::new("UNAUTHORIZED", "Authentication required")),
            Decision::GotoPayment => Some(Self::new(
                "PAYMENT_REQUIRED",
                "An active subscription is required",
            )),
        }
    }
}
