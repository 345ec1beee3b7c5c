use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Session record
// ---------------------------------------------------------------------------

/// The stored login/payment state of one visitor.
///
/// This is the single source of truth for both gate checks: there is no
/// separate "logged in" flag, only the presence of `identity`.
///
/// The record is kept in the session store as a JSON blob. Unknown fields are
/// ignored and missing fields default to absent, so older or partial blobs
/// still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(
        default,
        deserialize_with = "lenient_subscription",
        skip_serializing_if = "Option::is_none"
    )]
    pub subscription: Option<Subscription>,
}

/// Who the visitor claims to be. Mock login accepts any credentials, so this
/// is trusted at face value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IdentityRepr")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub ip_address: String,
    /// Unix timestamp, seconds.
    pub last_login: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub plan: Plan,
    /// Unix timestamp, seconds.
    #[serde(default)]
    pub start_date: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Lifetime,
    Monthly,
}

/// Identities written by older clients are a bare id string.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityRepr {
    Id(String),
    Full {
        #[serde(default)]
        id: String,
        #[serde(default)]
        username: String,
        #[serde(default)]
        ip_address: String,
        #[serde(default)]
        last_login: i64,
    },
}

impl From<IdentityRepr> for Identity {
    fn from(repr: IdentityRepr) -> Self {
        match repr {
            IdentityRepr::Id(id) => Self {
                username: id.clone(),
                id,
                ip_address: String::new(),
                last_login: 0,
            },
            IdentityRepr::Full {
                id,
                username,
                ip_address,
                last_login,
            } => Self {
                id,
                username,
                ip_address,
                last_login,
            },
        }
    }
}

/// A subscription that does not parse is treated as absent rather than
/// poisoning the whole record: the visitor stays logged in but unpaid.
fn lenient_subscription<'de, D>(deserializer: D) -> Result<Option<Subscription>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl SessionRecord {
    /// A freshly logged-in record: identity only, no subscription.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            subscription: None,
        }
    }

    /// Normalize a raw stored blob into a record.
    ///
    /// Absent, empty, or unparseable input yields the empty record. This never
    /// fails: a corrupt blob must lock the visitor out, not crash the gate.
    pub fn from_blob(blob: Option<&str>) -> Self {
        let Some(raw) = blob.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<SessionRecord>(raw) {
            Ok(record) => record,
            Err(e) => {
                debug!("Discarding malformed session blob: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Paid implies logged in: a subscription without an identity never counts.
    pub fn has_paid(&self) -> bool {
        self.is_logged_in() && self.subscription.as_ref().is_some_and(|s| s.active)
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }

    /// Attach an active subscription. Returns `false` (and leaves the record
    /// untouched) when there is no identity to attach it to.
    pub fn activate(&mut self, plan: Plan, now: i64) -> bool {
        if !self.is_logged_in() {
            return false;
        }
        self.subscription = Some(Subscription {
            active: true,
            plan,
            start_date: now,
        });
        true
    }
}

// ---------------------------------------------------------------------------
// Public view
// ---------------------------------------------------------------------------

/// What the nav chrome needs to know about the current visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub logged_in: bool,
    pub paid: bool,
    pub username: Option<String>,
}

impl From<&SessionRecord> for SessionView {
    fn from(record: &SessionRecord) -> Self {
        Self {
            logged_in: record.is_logged_in(),
            paid: record.has_paid(),
            username: record.username().map(str::to_string),
        }
    }
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user={}, paid={}",
            self.username().unwrap_or("<anonymous>"),
            self.has_paid()
        )
    }
}
