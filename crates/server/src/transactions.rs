//! Transactions API endpoints.

use api_types::transaction::{
    AccountRef, CategoryRef, ItemRef, TransactionCreate, TransactionCreated,
    TransactionKind as ApiKind, TransactionListQuery, TransactionListResponse, TransactionUpdate,
    TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn kind_from_api(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

fn map_detail(detail: engine::TransactionDetail) -> TransactionView {
    let tx = detail.transaction;
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        note: tx.note,
        occurred_at: tx.occurred_at.fixed_offset(),
        account: AccountRef {
            id: tx.account_id,
            name: detail.account_name,
            kind: crate::accounts::map_kind(detail.account_kind),
        },
        category: CategoryRef {
            id: tx.category_id,
            name: detail.category_name,
            kind: crate::categories::map_kind(detail.category_kind),
            icon: detail.category_icon,
        },
        item: tx.item_id.map(|id| ItemRef {
            id,
            name: detail.item_name.unwrap_or_default(),
        }),
    }
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .list_transactions(user.id, query.account_id)
        .await?
        .into_iter()
        .map(map_detail)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionCreate>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let transaction = state
        .engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id: user.id,
            account_id: payload.account_id,
            category_id: payload.category_id,
            item_id: payload.item_id,
            kind: kind_from_api(payload.kind),
            amount_minor: payload.amount_minor,
            note: payload.note,
            occurred_at: payload.occurred_at.with_timezone(&Utc),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated { id: transaction.id }),
    ))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_transaction(engine::UpdateTransactionCmd {
            user_id: user.id,
            transaction_id: id,
            account_id: payload.account_id,
            category_id: payload.category_id,
            item_id: payload.item_id,
            kind: payload.kind.map(kind_from_api),
            amount_minor: payload.amount_minor,
            note: payload.note,
            occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
        })
        .await?;

    Ok(StatusCode::OK)
}

pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
