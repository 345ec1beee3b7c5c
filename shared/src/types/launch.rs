use serde::{Deserialize, Serialize};

pub const MAX_SYMBOL_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    Pending,
    Active,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchedToken {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
    pub initial_price: f64,
    pub current_price: Option<f64>,
    /// Unix timestamp, seconds.
    pub launch_date: i64,
    pub status: LaunchStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchData {
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
    pub initial_price: f64,
}

impl LaunchData {
    pub fn validate(&self) -> Result<(), LaunchError> {
        if self.name.trim().is_empty() {
            return Err(LaunchError::MissingField("name".into()));
        }
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(LaunchError::MissingField("symbol".into()));
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(LaunchError::InvalidSymbol);
        }
        if self.total_supply == 0 {
            return Err(LaunchError::InvalidSupply);
        }
        if !(self.initial_price.is_finite() && self.initial_price > 0.0) {
            return Err(LaunchError::InvalidPrice);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LaunchError {
    MissingField(String),
    InvalidSymbol,
    InvalidSupply,
    InvalidPrice,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LaunchResponse {
    Success { message: String, token: LaunchedToken },
    Error { code: String, message: String },
}

impl LaunchError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidSymbol => "INVALID_SYMBOL",
            Self::InvalidSupply => "INVALID_SUPPLY",
            Self::InvalidPrice => "INVALID_PRICE",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::InvalidSymbol => format!("Symbol must be at most {} characters", MAX_SYMBOL_LEN),
            Self::InvalidSupply => "Total supply must be greater than 0".to_string(),
            Self::InvalidPrice => "Initial price must be greater than 0".to_string(),
        }
    }

    pub fn to_response(&self) -> LaunchResponse {
        LaunchResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }
}
