use anyhow::Result;
use bytes::Bytes;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::{CreateWalletData, WalletError, WalletKind, WalletResponse};

use crate::AppState;
use crate::handlers::http::session::Member;
use crate::handlers::http::utils::{self, HttpResponse};
use crate::state::unix_now;

fn reject(error: WalletError) -> Result<HttpResponse> {
    let status = match error {
        WalletError::NotFound(_) => StatusCode::NOT_FOUND,
        WalletError::DevWalletExists => StatusCode::CONFLICT,
    };
    warn!("Wallet request rejected: {}", error.to_code());
    utils::deliver_serialized_json(&error.to_response(), status)
}

/// GET /api/wallets
pub async fn handle_list_wallets(
    _req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let wallets = state
        .portfolios
        .with(member.owner(), unix_now(), |p| p.wallets.clone())
        .await;
    utils::deliver_success_json(Some(wallets))
}

/// POST /api/wallets
pub async fn handle_create_wallet(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let data: CreateWalletData = match utils::parse_json(&req) {
        Ok(data) => data,
        Err(e) => {
            warn!("Create-wallet body rejected: {}", e);
            return utils::deliver_error_json(
                "INVALID_BODY",
                "Expected {\"kind\": \"regular\" | \"developer\"}",
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let created = state
        .portfolios
        .with(member.owner(), unix_now(), |p| {
            p.create_wallet(data.kind, data.replace)
        })
        .await;

    match created {
        Ok(wallet) => {
            info!("{} created wallet {}", member.owner(), wallet.short_address());
            let message = match wallet.kind {
                WalletKind::Regular => "Wallet created",
                WalletKind::Developer => "Developer wallet created",
            };
            utils::deliver_serialized_json(
                &WalletResponse::Success {
                    message: message.to_string(),
                    wallet: Some(wallet),
                },
                StatusCode::OK,
            )
        }
        Err(e) => reject(e),
    }
}

/// DELETE /api/wallets/:address
pub async fn handle_delete_wallet(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let Some(address) = utils::path_segment(&req, 2) else {
        return utils::deliver_error_json(
            "BAD_REQUEST",
            "Invalid wallet path",
            StatusCode::BAD_REQUEST,
        );
    };

    let removed = state
        .portfolios
        .with(member.owner(), unix_now(), |p| p.delete_wallet(&address))
        .await;

    match removed {
        Ok(wallet) => utils::deliver_serialized_json(
            &WalletResponse::Success {
                message: format!("{} deleted", wallet.label),
                wallet: Some(wallet),
            },
            StatusCode::OK,
        ),
        Err(e) => reject(e),
    }
}
