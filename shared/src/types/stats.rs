use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::bot::Bot;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_bots: usize,
    pub active_bots: usize,
    pub total_profit: f64,
    pub daily_profit: f64,
    pub weekly_profit: f64,
}

impl DashboardStats {
    /// Daily and weekly figures are fixed fractions of the total.
    pub fn from_bots(bots: &[Bot]) -> Self {
        let total_profit: f64 = bots.iter().map(|b| b.profit).sum();
        Self {
            total_bots: bots.len(),
            active_bots: bots.iter().filter(|b| b.is_active()).count(),
            total_profit,
            daily_profit: total_profit * 0.1,
            weekly_profit: total_profit * 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitPoint {
    /// Unix timestamp, seconds.
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitRange {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ProfitRange {
    /// Number of points and seconds between them.
    pub fn shape(self) -> (usize, i64) {
        match self {
            Self::Daily => (24, 3_600),
            Self::Weekly => (7, 86_400),
            Self::Monthly => (30, 86_400),
        }
    }

    /// Half-open value range each point is drawn from.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Self::Daily => (-50.0, 150.0),
            Self::Weekly => (-100.0, 400.0),
            Self::Monthly => (-200.0, 800.0),
        }
    }
}

impl FromStr for ProfitRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown profit range: {}", other)),
        }
    }
}
