use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bot kinds and status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BotType {
    Volume,
    Trade,
    Snipe,
    CopyTrade,
    CoinLaunch,
}

impl BotType {
    pub fn default_strategy(self) -> &'static str {
        match self {
            Self::Volume => "Volume Profile",
            Self::Trade => "Moving Average",
            Self::Snipe => "First Buy",
            Self::CopyTrade => "Follow Trades",
            Self::CoinLaunch => "Fair Launch",
        }
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Volume => "volume",
            Self::Trade => "trade",
            Self::Snipe => "snipe",
            Self::CopyTrade => "copy-trade",
            Self::CoinLaunch => "coin-launch",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    Active,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Low,
    #[default]
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Config: one variant per bot type, carrying only its own fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BotConfig {
    Volume {
        trading_pair: String,
        strategy: String,
        stop_loss: u8,
        take_profit: u8,
    },
    Trade {
        trading_pair: String,
        strategy: String,
        stop_loss: u8,
        take_profit: u8,
    },
    Snipe {
        target_token: String,
        trading_pair: String,
        strategy: String,
    },
    CopyTrade {
        wallet_address: String,
        strategy: String,
    },
    CoinLaunch {
        token_symbol: String,
    },
}

impl BotConfig {
    pub fn bot_type(&self) -> BotType {
        match self {
            Self::Volume { .. } => BotType::Volume,
            Self::Trade { .. } => BotType::Trade,
            Self::Snipe { .. } => BotType::Snipe,
            Self::CopyTrade { .. } => BotType::CopyTrade,
            Self::CoinLaunch { .. } => BotType::CoinLaunch,
        }
    }

    pub fn trading_pair(&self) -> Option<&str> {
        match self {
            Self::Volume { trading_pair, .. }
            | Self::Trade { trading_pair, .. }
            | Self::Snipe { trading_pair, .. } => Some(trading_pair),
            Self::CopyTrade { .. } | Self::CoinLaunch { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub name: String,
    pub status: BotStatus,
    pub profit: f64,
    /// Unix timestamp, seconds.
    pub created_at: i64,
    /// Unix timestamp, seconds.
    pub last_active: i64,
    pub risk: Risk,
    pub budget: f64,
    pub config: BotConfig,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Start,
    Pause,
    Stop,
}

impl FromStr for BotAction {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" | "play" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "stop" => Ok(Self::Stop),
            other => Err(BotError::UnknownAction(other.to_string())),
        }
    }
}

impl Bot {
    /// Apply a lifecycle action. Starting refreshes `last_active`.
    pub fn apply(&mut self, action: BotAction, now: i64) {
        self.status = match action {
            BotAction::Start => {
                self.last_active = now;
                BotStatus::Active
            }
            BotAction::Pause => BotStatus::Paused,
            BotAction::Stop => BotStatus::Stopped,
        };
    }

    pub fn is_active(&self) -> bool {
        self.status == BotStatus::Active
    }
}

// ---------------------------------------------------------------------------
// Create request
// ---------------------------------------------------------------------------

/// Form data for a new bot. Fields irrelevant to `bot_type` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBotData {
    pub name: String,
    #[serde(rename = "type")]
    pub bot_type: BotType,
    #[serde(default)]
    pub trading_pair: Option<String>,
    #[serde(default)]
    pub target_token: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub risk: Risk,
    #[serde(default = "default_budget")]
    pub budget: f64,
    #[serde(default = "default_stop_loss")]
    pub stop_loss: u8,
    #[serde(default = "default_take_profit")]
    pub take_profit: u8,
}

pub const MAX_STOP_LOSS: u8 = 20;
pub const MAX_TAKE_PROFIT: u8 = 50;

fn default_budget() -> f64 {
    1000.0
}

fn default_stop_loss() -> u8 {
    5
}

fn default_take_profit() -> u8 {
    15
}

fn required(value: &Option<String>, field: &str) -> Result<String, BotError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BotError::MissingField(field.to_string()))
}

impl CreateBotData {
    /// Validate the form and build the typed config for its bot type.
    pub fn into_config(self) -> Result<(String, Risk, f64, BotConfig), BotError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(BotError::MissingField("name".into()));
        }
        if !(self.budget.is_finite() && self.budget > 0.0) {
            return Err(BotError::InvalidBudget);
        }
        if self.stop_loss > MAX_STOP_LOSS || self.take_profit > MAX_TAKE_PROFIT {
            return Err(BotError::InvalidLimits);
        }

        let strategy = self
            .strategy
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.bot_type.default_strategy())
            .to_string();

        let config = match self.bot_type {
            BotType::Volume => BotConfig::Volume {
                trading_pair: required(&self.trading_pair, "trading_pair")?,
                strategy,
                stop_loss: self.stop_loss,
                take_profit: self.take_profit,
            },
            BotType::Trade => BotConfig::Trade {
                trading_pair: required(&self.trading_pair, "trading_pair")?,
                strategy,
                stop_loss: self.stop_loss,
                take_profit: self.take_profit,
            },
            BotType::Snipe => {
                let trading_pair = required(&self.trading_pair, "trading_pair")?;
                let target_token = match required(&self.target_token, "target_token") {
                    Ok(token) => token,
                    // "BONK/USDC" snipes BONK
                    Err(_) => trading_pair
                        .split('/')
                        .next()
                        .unwrap_or(&trading_pair)
                        .to_string(),
                };
                BotConfig::Snipe {
                    target_token,
                    trading_pair,
                    strategy,
                }
            }
            BotType::CopyTrade => BotConfig::CopyTrade {
                wallet_address: required(&self.wallet_address, "wallet_address")?,
                strategy,
            },
            BotType::CoinLaunch => BotConfig::CoinLaunch {
                token_symbol: required(&self.token_symbol, "token_symbol")?,
            },
        };

        Ok((name, self.risk, self.budget, config))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BotError {
    NotFound(String),
    MissingField(String),
    UnknownAction(String),
    InvalidBudget,
    InvalidLimits,
}

/// Bot endpoint response envelope.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BotResponse {
    Success { message: String, bot: Option<Bot> },
    Error { code: String, message: String },
}

impl BotError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "BOT_NOT_FOUND",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::UnknownAction(_) => "UNKNOWN_ACTION",
            Self::InvalidBudget => "INVALID_BUDGET",
            Self::InvalidLimits => "INVALID_LIMITS",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::NotFound(id) => format!("No bot with id {}", id),
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::UnknownAction(action) => format!("Unknown bot action: {}", action),
            Self::InvalidBudget => "Budget must be a positive amount".to_string(),
            Self::InvalidLimits => format!(
                "Stop loss must be at most {}% and take profit at most {}%",
                MAX_STOP_LOSS, MAX_TAKE_PROFIT
            ),
        }
    }

    pub fn to_response(&self) -> BotResponse {
        BotResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }
}
