use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared::types::{
    Bot, BotAction, BotConfig, BotError, BotStatus, CreateBotData, DashboardStats, LaunchData,
    LaunchStatus, LaunchedToken, ProfitPoint, ProfitRange, Risk, Wallet, WalletError, WalletKind,
};

const MAIN_WALLET_ADDRESS: &str = "8xgM2eWzx5iUCydarhH4Dxkk4gVFZq6oCLLZLBXnKEMH";
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Everything one identity owns.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    pub bots: Vec<Bot>,
    pub wallets: Vec<Wallet>,
    pub launches: Vec<LaunchedToken>,
}

impl Portfolio {
    /// The demo fleet every new account starts with.
    pub fn seeded(now: i64) -> Self {
        let bots = vec![
            Bot {
                id: "1".into(),
                name: "SOL/USDC Volume Bot".into(),
                status: BotStatus::Active,
                profit: 245.87,
                created_at: now - 7 * DAY,
                last_active: now,
                risk: Risk::Medium,
                budget: 1000.0,
                config: BotConfig::Volume {
                    trading_pair: "SOL/USDC".into(),
                    strategy: "Moving Average".into(),
                    stop_loss: 5,
                    take_profit: 15,
                },
            },
            Bot {
                id: "2".into(),
                name: "BONK Sniper".into(),
                status: BotStatus::Active,
                profit: 127.32,
                created_at: now - 5 * DAY,
                last_active: now - HOUR,
                risk: Risk::High,
                budget: 500.0,
                config: BotConfig::Snipe {
                    target_token: "BONK".into(),
                    trading_pair: "BONK/USDC".into(),
                    strategy: "Momentum".into(),
                },
            },
            Bot {
                id: "3".into(),
                name: "JUP/USDC Trader".into(),
                status: BotStatus::Paused,
                profit: -52.18,
                created_at: now - 3 * DAY,
                last_active: now - 12 * HOUR,
                risk: Risk::Low,
                budget: 800.0,
                config: BotConfig::Trade {
                    trading_pair: "JUP/USDC".into(),
                    strategy: "Range Trading".into(),
                    stop_loss: 3,
                    take_profit: 8,
                },
            },
            Bot {
                id: "4".into(),
                name: "DeGods Whale Tracker".into(),
                status: BotStatus::Stopped,
                profit: 412.65,
                created_at: now - 14 * DAY,
                last_active: now - 2 * DAY,
                risk: Risk::Medium,
                budget: 1500.0,
                config: BotConfig::CopyTrade {
                    wallet_address: "Dg1...".into(),
                    strategy: "Follow Trades".into(),
                },
            },
        ];

        let wallets = vec![Wallet {
            address: MAIN_WALLET_ADDRESS.into(),
            label: "Main Wallet".into(),
            balance: 1.25,
            kind: WalletKind::Regular,
        }];

        Self {
            bots,
            wallets,
            launches: Vec::new(),
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_bots(&self.bots)
    }

    // ── Bots ────────────────────────────────────────────────────────────────

    pub fn create_bot(&mut self, data: CreateBotData, now: i64) -> Result<Bot, BotError> {
        let (name, risk, budget, config) = data.into_config()?;
        let bot = Bot {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            status: BotStatus::Active,
            profit: 0.0,
            created_at: now,
            last_active: now,
            risk,
            budget,
            config,
        };
        info!(
            "Created {} bot '{}' ({}) on {}",
            bot.config.bot_type(),
            bot.name,
            bot.id,
            bot.config.trading_pair().unwrap_or("-")
        );
        self.bots.push(bot.clone());
        Ok(bot)
    }

    pub fn apply_action(&mut self, id: &str, action: BotAction, now: i64) -> Result<Bot, BotError> {
        let bot = self
            .bots
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BotError::NotFound(id.to_string()))?;
        bot.apply(action, now);
        debug!("Bot {} is now {:?}", id, bot.status);
        Ok(bot.clone())
    }

    pub fn delete_bot(&mut self, id: &str) -> Result<Bot, BotError> {
        let pos = self
            .bots
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BotError::NotFound(id.to_string()))?;
        Ok(self.bots.remove(pos))
    }

    // ── Wallets ─────────────────────────────────────────────────────────────

    pub fn has_dev_wallet(&self) -> bool {
        self.wallets.iter().any(|w| w.kind == WalletKind::Developer)
    }

    /// At most one developer wallet exists; `replace` swaps it out.
    pub fn create_wallet(&mut self, kind: WalletKind, replace: bool) -> Result<Wallet, WalletError> {
        let label = match kind {
            WalletKind::Regular => {
                let regular = self
                    .wallets
                    .iter()
                    .filter(|w| w.kind == WalletKind::Regular)
                    .count();
                format!("Wallet {}", regular + 1)
            }
            WalletKind::Developer => {
                if self.has_dev_wallet() {
                    if !replace {
                        return Err(WalletError::DevWalletExists);
                    }
                    self.wallets.retain(|w| w.kind != WalletKind::Developer);
                    info!("Replacing existing developer wallet");
                }
                "Dev Wallet".to_string()
            }
        };

        let wallet = Wallet {
            address: random_alnum(26),
            label,
            balance: 0.0,
            kind,
        };
        self.wallets.push(wallet.clone());
        Ok(wallet)
    }

    pub fn delete_wallet(&mut self, address: &str) -> Result<Wallet, WalletError> {
        let pos = self
            .wallets
            .iter()
            .position(|w| w.address == address)
            .ok_or_else(|| WalletError::NotFound(address.to_string()))?;
        Ok(self.wallets.remove(pos))
    }

    // ── Launches ────────────────────────────────────────────────────────────

    /// Caller validates `data` first.
    pub fn record_launch(&mut self, data: LaunchData, now: i64) -> LaunchedToken {
        let token = LaunchedToken {
            id: uuid::Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            symbol: data.symbol.trim().to_uppercase(),
            total_supply: data.total_supply,
            initial_price: data.initial_price,
            current_price: None,
            launch_date: now,
            status: LaunchStatus::Pending,
        };
        self.launches.push(token.clone());
        token
    }
}

/// Per-identity portfolios, created on first touch.
#[derive(Clone, Default)]
pub struct PortfolioBook {
    inner: Arc<RwLock<HashMap<String, Portfolio>>>,
}

impl PortfolioBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with<R>(&self, owner: &str, now: i64, f: impl FnOnce(&mut Portfolio) -> R) -> R {
        let mut map = self.inner.write().await;
        let portfolio = map.entry(owner.to_string()).or_insert_with(|| {
            debug!("Seeding portfolio for {}", owner);
            Portfolio::seeded(now)
        });
        f(portfolio)
    }

    /// Forget an identity's portfolio.
    pub async fn remove(&self, owner: &str) -> bool {
        let removed = self.inner.write().await.remove(owner).is_some();
        if removed {
            debug!("Dropped portfolio for {}", owner);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Ascending points ending at `now`.
pub fn profit_series(range: ProfitRange, now: i64) -> Vec<ProfitPoint> {
    let (count, step) = range.shape();
    let (low, high) = range.bounds();
    let mut rng = rand::thread_rng();

    (0..count)
        .map(|i| ProfitPoint {
            timestamp: now - (count - 1 - i) as i64 * step,
            value: rng.gen_range(low..high),
        })
        .collect()
}

pub fn random_alnum(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// `user-` followed by nine lowercase alphanumerics.
pub fn mint_user_id() -> String {
    format!("user-{}", random_alnum(9).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::BotType;

    const NOW: i64 = 1_700_000_000;

    fn form(json: &str) -> CreateBotData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn seed_matches_demo_fleet() {
        let p = Portfolio::seeded(NOW);
        assert_eq!(p.bots.len(), 4);
        assert_eq!(p.wallets.len(), 1);
        assert_eq!(p.wallets[0].label, "Main Wallet");

        let stats = p.stats();
        assert_eq!(stats.total_bots, 4);
        assert_eq!(stats.active_bots, 2);
        assert!((stats.total_profit - 733.66).abs() < 1e-6);
    }

    #[test]
    fn created_bot_starts_active_with_no_profit() {
        let mut p = Portfolio::seeded(NOW);
        let bot = p
            .create_bot(form(r#"{"name":"New","type":"trade","trading_pair":"SOL/USDC"}"#), NOW)
            .unwrap();
        assert_eq!(bot.status, BotStatus::Active);
        assert_eq!(bot.profit, 0.0);
        assert_eq!(bot.config.bot_type(), BotType::Trade);
        assert_eq!(bot.config.trading_pair(), Some("SOL/USDC"));
        assert_eq!(p.bots.len(), 5);
    }

    #[test]
    fn invalid_bot_is_not_added() {
        let mut p = Portfolio::seeded(NOW);
        let err = p
            .create_bot(form(r#"{"name":"Copy","type":"copy-trade"}"#), NOW)
            .unwrap_err();
        assert_eq!(err, BotError::MissingField("wallet_address".into()));
        assert_eq!(p.bots.len(), 4);
    }

    #[test]
    fn lifecycle_actions() {
        let mut p = Portfolio::seeded(NOW);
        let bot = p.apply_action("3", BotAction::Start, NOW + 5).unwrap();
        assert_eq!(bot.status, BotStatus::Active);
        assert_eq!(bot.last_active, NOW + 5);

        let bot = p.apply_action("3", BotAction::Pause, NOW + 6).unwrap();
        assert_eq!(bot.status, BotStatus::Paused);

        let bot = p.apply_action("1", BotAction::Stop, NOW).unwrap();
        assert_eq!(bot.status, BotStatus::Stopped);
    }

    #[test]
    fn unknown_bot_is_not_found() {
        let mut p = Portfolio::seeded(NOW);
        assert_eq!(
            p.apply_action("99", BotAction::Start, NOW).unwrap_err(),
            BotError::NotFound("99".into())
        );
        assert!(p.delete_bot("99").is_err());
    }

    #[test]
    fn delete_bot_removes_it() {
        let mut p = Portfolio::seeded(NOW);
        let removed = p.delete_bot("2").unwrap();
        assert_eq!(removed.name, "BONK Sniper");
        assert!(p.bots.iter().all(|b| b.id != "2"));
    }

    #[test]
    fn regular_wallets_are_numbered() {
        let mut p = Portfolio::seeded(NOW);
        let w = p.create_wallet(WalletKind::Regular, false).unwrap();
        assert_eq!(w.label, "Wallet 2");
        assert_eq!(w.address.len(), 26);
        assert_eq!(w.balance, 0.0);
    }

    #[test]
    fn only_one_dev_wallet_without_replace() {
        let mut p = Portfolio::seeded(NOW);
        let first = p.create_wallet(WalletKind::Developer, false).unwrap();
        assert_eq!(
            p.create_wallet(WalletKind::Developer, false).unwrap_err(),
            WalletError::DevWalletExists
        );

        let second = p.create_wallet(WalletKind::Developer, true).unwrap();
        let devs: Vec<_> = p
            .wallets
            .iter()
            .filter(|w| w.kind == WalletKind::Developer)
            .collect();
        assert_eq!(devs.len(), 1);
        assert_eq!(devs[0].address, second.address);
        assert_ne!(first.address, second.address);
    }

    #[test]
    fn delete_unknown_wallet() {
        let mut p = Portfolio::seeded(NOW);
        assert!(matches!(
            p.delete_wallet("nope"),
            Err(WalletError::NotFound(_))
        ));
        assert!(p.delete_wallet(MAIN_WALLET_ADDRESS).is_ok());
        assert!(p.wallets.is_empty());
    }

    #[test]
    fn launch_is_recorded_as_pending() {
        let mut p = Portfolio::default();
        let token = p.record_launch(
            LaunchData {
                name: " Moon ".into(),
                symbol: "moon".into(),
                total_supply: 1_000,
                initial_price: 0.5,
            },
            NOW,
        );
        assert_eq!(token.symbol, "MOON");
        assert_eq!(token.name, "Moon");
        assert_eq!(token.status, LaunchStatus::Pending);
        assert_eq!(p.launches.len(), 1);
    }

    #[test]
    fn profit_series_shape_and_bounds() {
        for range in [ProfitRange::Daily, ProfitRange::Weekly, ProfitRange::Monthly] {
            let (count, step) = range.shape();
            let (low, high) = range.bounds();
            let points = profit_series(range, NOW);

            assert_eq!(points.len(), count);
            assert_eq!(points.last().map(|p| p.timestamp), Some(NOW));
            assert!(points.windows(2).all(|w| w[1].timestamp - w[0].timestamp == step));
            assert!(points.iter().all(|p| p.value >= low && p.value < high));
        }
    }

    #[test]
    fn user_ids_look_right() {
        let id = mint_user_id();
        assert!(id.starts_with("user-"));
        assert_eq!(id.len(), 14);
    }

    #[tokio::test]
    async fn book_seeds_once_per_owner() {
        let book = PortfolioBook::new();
        book.with("a", NOW, |p| p.bots.clear()).await;
        let count = book.with("a", NOW, |p| p.bots.len()).await;
        assert_eq!(count, 0);

        let other = book.with("b", NOW, |p| p.bots.len()).await;
        assert_eq!(other, 4);
        assert_eq!(book.len().await, 2);
    }

    #[tokio::test]
    async fn removed_portfolio_is_reseeded_on_next_touch() {
        let book = PortfolioBook::new();
        book.with("a", NOW, |p| p.bots.clear()).await;

        assert!(book.remove("a").await);
        assert!(!book.remove("a").await);
        assert_eq!(book.len().await, 0);

        let count = book.with("a", NOW, |p| p.bots.len()).await;
        assert_eq!(count, 4);
    }
}
