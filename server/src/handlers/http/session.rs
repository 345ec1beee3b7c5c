use hyper::Request;

use shared::types::{Identity, SessionRecord};

use crate::AppState;
use crate::handlers::http::utils::get_cookie;
use crate::store::load_record;

/// Whoever sent the request, as far as the session store knows.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub key: Option<String>,
    pub record: SessionRecord,
}

/// A visitor with an identity, handed to Identified and Gated handlers.
#[derive(Debug, Clone)]
pub struct Member {
    pub key: String,
    pub identity: Identity,
    pub record: SessionRecord,
}

impl Visitor {
    pub async fn from_request<B>(req: &Request<B>, state: &AppState) -> Self {
        let cookie_name = state.config.read().await.session.cookie_name.clone();
        let key = get_cookie(req.headers(), &cookie_name);
        let record = load_record(state.sessions.as_ref(), key.as_deref());
        Self { key, record }
    }

    pub fn into_member(self) -> Option<Member> {
        let identity = self.record.identity.clone()?;
        Some(Member {
            key: self.key?,
            identity,
            record: self.record,
        })
    }
}

impl Member {
    pub fn owner(&self) -> &str {
        &self.identity.id
    }
}
