//! Accounts API endpoints.

use api_types::account::{
    AccountCreate, AccountKind as ApiKind, AccountListResponse, AccountUpdate, AccountView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_kind(kind: engine::AccountKind) -> ApiKind {
    match kind {
        engine::AccountKind::Cash => ApiKind::Cash,
        engine::AccountKind::Bank => ApiKind::Bank,
        engine::AccountKind::Person => ApiKind::Person,
        engine::AccountKind::Other => ApiKind::Other,
    }
}

fn kind_from_api(kind: ApiKind) -> engine::AccountKind {
    match kind {
        ApiKind::Cash => engine::AccountKind::Cash,
        ApiKind::Bank => engine::AccountKind::Bank,
        ApiKind::Person => engine::AccountKind::Person,
        ApiKind::Other => engine::AccountKind::Other,
    }
}

fn map_account(account: engine::Account, balance_minor: i64) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        kind: map_kind(account.kind),
        is_default: account.is_default,
        is_featured: account.is_featured,
        balance_minor,
        last_report_at: account.last_report_at.map(|at| at.fixed_offset()),
    }
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(user.id)
        .await?
        .into_iter()
        .map(|(account, balance)| map_account(account, balance))
        .collect();

    Ok(Json(AccountListResponse { accounts }))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountCreate>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .create_account(
            user.id,
            &payload.name,
            kind_from_api(payload.kind),
            payload.is_default.unwrap_or(false),
            payload.is_featured.unwrap_or(false),
        )
        .await?;

    // A brand new account has no transactions yet.
    Ok((StatusCode::CREATED, Json(map_account(account, 0))))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .update_account(engine::UpdateAccountCmd {
            user_id: user.id,
            account_id: id,
            name: payload.name,
            kind: payload.kind.map(kind_from_api),
            is_default: payload.is_default,
            is_featured: payload.is_featured,
        })
        .await?;

    let balance = state.engine.account_balance(user.id, id).await?;
    Ok(Json(map_account(account, balance)))
}

pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_report_sent(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .mark_report_sent(user.id, id, Utc::now())
        .await?;

    let balance = state.engine.account_balance(user.id, id).await?;
    Ok(Json(map_account(account, balance)))
}
