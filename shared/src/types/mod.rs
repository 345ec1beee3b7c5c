pub mod bot;
pub mod json_error;
pub mod launch;
pub mod login;
pub mod payment;
pub mod server_config;
pub mod session;
pub mod stats;
pub mod wallet;

pub use self::bot::{
    Bot, BotAction, BotConfig, BotError, BotResponse, BotStatus, BotType, CreateBotData, Risk,
};
pub use self::json_error::ErrorResponse;
pub use self::launch::{LaunchData, LaunchError, LaunchResponse, LaunchStatus, LaunchedToken};
pub use self::login::{AuthError, AuthResponse, LoginData, SignupData};
pub use self::payment::{LIFETIME_PRICE_SOL, PaymentData, PaymentError, PaymentResponse};
pub use self::server_config::{AppConfig, ConfigError};
pub use self::session::{Identity, Plan, SessionRecord, SessionView, Subscription};
pub use self::stats::{DashboardStats, ProfitPoint, ProfitRange};
pub use self::wallet::{CreateWalletData, Wallet, WalletError, WalletKind, WalletResponse};
