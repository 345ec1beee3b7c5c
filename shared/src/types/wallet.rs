use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Regular,
    Developer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    pub label: String,
    /// SOL
    pub balance: f64,
    pub kind: WalletKind,
}

impl Wallet {
    /// `8xgM...KEMH`
    pub fn short_address(&self) -> String {
        let chars: Vec<char> = self.address.chars().collect();
        if chars.len() <= 8 {
            return self.address.clone();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWalletData {
    pub kind: WalletKind,
    /// Replace an existing developer wallet instead of refusing.
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalletError {
    NotFound(String),
    DevWalletExists,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WalletResponse {
    Success { message: String, wallet: Option<Wallet> },
    Error { code: String, message: String },
}

impl WalletError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "WALLET_NOT_FOUND",
            Self::DevWalletExists => "DEV_WALLET_EXISTS",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::NotFound(addr) => format!("No wallet with address {}", addr),
            Self::DevWalletExists => {
                "A developer wallet already exists; resend with replace=true to swap it"
                    .to_string()
            }
        }
    }

    pub fn to_response(&self) -> WalletResponse {
        WalletResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }
}
