use anyhow::Result;
use bytes::Bytes;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::{Bot, BotAction, BotError, BotResponse, BotStatus, CreateBotData};

use crate::AppState;
use crate::handlers::http::session::Member;
use crate::handlers::http::utils::{self, HttpResponse};
use crate::state::unix_now;

fn reject(error: BotError) -> Result<HttpResponse> {
    let status = match error {
        BotError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    warn!("Bot request rejected: {}", error.to_code());
    utils::deliver_serialized_json(&error.to_response(), status)
}

fn success(message: String, bot: Bot) -> Result<HttpResponse> {
    utils::deliver_serialized_json(
        &BotResponse::Success {
            message,
            bot: Some(bot),
        },
        StatusCode::OK,
    )
}

/// GET /api/bots
pub async fn handle_list_bots(
    _req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let bots = state
        .portfolios
        .with(member.owner(), unix_now(), |p| p.bots.clone())
        .await;
    utils::deliver_success_json(Some(bots))
}

/// POST /api/bots
pub async fn handle_create_bot(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let data: CreateBotData = match utils::parse_json(&req) {
        Ok(data) => data,
        Err(e) => {
            warn!("Create-bot body rejected: {}", e);
            return utils::deliver_error_json(
                "INVALID_BODY",
                &format!("Invalid bot form: {}", e),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let now = unix_now();
    let created = state
        .portfolios
        .with(member.owner(), now, |p| p.create_bot(data, now))
        .await;

    match created {
        Ok(bot) => success(format!("{} has been created", bot.name), bot),
        Err(e) => reject(e),
    }
}

/// POST /api/bots/:id/:action
pub async fn handle_bot_action(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let (Some(id), Some(action)) = (utils::path_segment(&req, 2), utils::path_segment(&req, 3))
    else {
        return utils::deliver_error_json("BAD_REQUEST", "Invalid bot path", StatusCode::BAD_REQUEST);
    };

    let action: BotAction = match action.parse() {
        Ok(a) => a,
        Err(e) => return reject(e),
    };

    let now = unix_now();
    let updated = state
        .portfolios
        .with(member.owner(), now, |p| p.apply_action(&id, action, now))
        .await;

    match updated {
        Ok(bot) => {
            info!("{} applied {:?} to bot {}", member.owner(), action, id);
            let word = match bot.status {
                BotStatus::Active => "running",
                BotStatus::Paused => "paused",
                BotStatus::Stopped => "stopped",
            };
            success(format!("{} is {}", bot.name, word), bot)
        }
        Err(e) => reject(e),
    }
}

/// DELETE /api/bots/:id
pub async fn handle_delete_bot(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let Some(id) = utils::path_segment(&req, 2) else {
        return utils::deliver_error_json("BAD_REQUEST", "Invalid bot path", StatusCode::BAD_REQUEST);
    };

    let removed = state
        .portfolios
        .with(member.owner(), unix_now(), |p| p.delete_bot(&id))
        .await;

    match removed {
        Ok(bot) => success(format!("{} has been deleted", bot.name), bot),
        Err(e) => reject(e),
    }
}
