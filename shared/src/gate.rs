use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::types::session::SessionRecord;

/// Paths reachable without logging in or paying. These are always public,
/// whatever the configuration says: `/` is also the redirect target for
/// anonymous visitors, so gating it would loop.
pub const DEFAULT_PUBLIC_PATHS: [&str; 3] = ["/", "/signup", "/payments"];

pub const HOME_PATH: &str = "/";
pub const PAYMENT_PATH: &str = "/payments";

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    GotoHome,
    GotoPayment,
}

impl Decision {
    /// Where the router must navigate for this decision, if anywhere.
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::GotoHome => Some(HOME_PATH),
            Self::GotoPayment => Some(PAYMENT_PATH),
        }
    }

    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::GotoHome => write!(f, "goto home"),
            Self::GotoPayment => write!(f, "goto payment"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionGate
// ---------------------------------------------------------------------------

/// Decides, per navigation, whether a visitor may see a page.
///
/// The gate holds only the public path set. It never reads or writes the
/// session store and keeps no "already redirected" state: the router hands
/// it the record it loaded and performs whatever navigation the decision
/// implies, once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGate {
    public: BTreeSet<String>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl SessionGate {
    /// Build a gate with the default public paths plus `extra`.
    ///
    /// Extras are normalized the same way request paths are. They can only
    /// widen the public set; the defaults are never removed.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let public = DEFAULT_PUBLIC_PATHS
            .iter()
            .map(|p| p.to_string())
            .chain(extra.into_iter().map(|p| normalize_path(p.as_ref()).to_string()))
            .collect();
        Self { public }
    }

    pub fn public_paths(&self) -> impl Iterator<Item = &str> {
        self.public.iter().map(String::as_str)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.contains(normalize_path(path))
    }

    /// The decision table. First match wins:
    ///
    /// 1. public path → `Allow`
    /// 2. no identity → `GotoHome`
    /// 3. identity without an active subscription → `GotoPayment`
    /// 4. otherwise → `Allow`
    ///
    /// Any path not in the public set is protected, including paths no route
    /// knows about.
    pub fn decide(&self, path: &str, session: &SessionRecord) -> Decision {
        if self.is_public(path) {
            return Decision::Allow;
        }
        if !session.is_logged_in() {
            return Decision::GotoHome;
        }
        if !session.has_paid() {
            return Decision::GotoPayment;
        }
        Decision::Allow
    }

    /// Decide straight from the raw stored blob. Absent or malformed blobs
    /// decide exactly like an empty record.
    pub fn decide_blob(&self, path: &str, blob: Option<&str>) -> Decision {
        self.decide(path, &SessionRecord::from_blob(blob))
    }
}

/// Strip query string and fragment, and a trailing slash on anything but
/// the root. An empty path is the root.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let clean = &path[..end];

    if clean.is_empty() {
        return HOME_PATH;
    }

    match clean.trim_end_matches('/') {
        "" => HOME_PATH,
        trimmed => trimmed,
    }
}
