use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AccountKind, CategoryKind, EngineError, ResultEngine, Transaction, TransactionKind, accounts,
    categories, items, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

pub struct CreateTransactionCmd {
    pub user_id: Uuid,
    /// `None`: the user's default account (created when the user has none).
    pub account_id: Option<Uuid>,
    /// `None`: the same-kind default category.
    pub category_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

pub struct UpdateTransactionCmd {
    pub user_id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub note: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A transaction with its references resolved for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub account_name: String,
    pub account_kind: AccountKind,
    pub category_name: String,
    pub category_kind: CategoryKind,
    pub category_icon: Option<String>,
    pub item_name: Option<String>,
}

impl Engine {
    /// Create a transaction.
    ///
    /// Missing account/category references resolve to the user's defaults,
    /// created on the spot when absent.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidInput(
                "amount_minor must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let account = match cmd.account_id {
                Some(id) => super::accounts::find_owned(&db_tx, cmd.user_id, id).await?,
                None => super::accounts::ensure_default_account(&db_tx, cmd.user_id).await?,
            };

            let category = match cmd.category_id {
                Some(id) => super::categories::find_owned(&db_tx, cmd.user_id, id).await?,
                None => {
                    let kind = match cmd.kind {
                        TransactionKind::Income => CategoryKind::Income,
                        TransactionKind::Expense => CategoryKind::Expense,
                    };
                    super::categories::ensure_default_category(&db_tx, cmd.user_id, kind).await?
                }
            };

            if let Some(item_id) = cmd.item_id {
                super::items::find_owned(&db_tx, cmd.user_id, item_id).await?;
            }

            let model = transactions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(cmd.user_id),
                account_id: ActiveValue::Set(account.id),
                category_id: ActiveValue::Set(category.id),
                item_id: ActiveValue::Set(cmd.item_id),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                note: ActiveValue::Set(normalize_optional_text(cmd.note.as_deref())),
                occurred_at: ActiveValue::Set(cmd.occurred_at),
            }
            .insert(&db_tx)
            .await?;

            Transaction::try_from(model)
        })
    }

    /// Lists the user's transactions, newest first, with account, category
    /// and item references populated for display.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        account_id: Option<Uuid>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::OccurredAt);
        if let Some(account_id) = account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }
        let tx_models = query.all(&self.database).await?;

        let account_models: HashMap<Uuid, accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect();
        let category_models: HashMap<Uuid, categories::Model> = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect();
        let item_models: HashMap<Uuid, items::Model> = items::Entity::find()
            .filter(items::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect();

        let mut out = Vec::with_capacity(tx_models.len());
        for model in tx_models {
            let Some(account) = account_models.get(&model.account_id) else {
                continue;
            };
            let Some(category) = category_models.get(&model.category_id) else {
                continue;
            };
            let item_name = model
                .item_id
                .and_then(|id| item_models.get(&id))
                .map(|item| item.name.clone());

            out.push(TransactionDetail {
                account_name: account.name.clone(),
                account_kind: AccountKind::try_from(account.kind.as_str())?,
                category_name: category.name.clone(),
                category_kind: CategoryKind::try_from(category.kind.as_str())?,
                category_icon: category.icon.clone(),
                item_name,
                transaction: Transaction::try_from(model)?,
            });
        }
        Ok(out)
    }

    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        if let Some(amount_minor) = cmd.amount_minor
            && amount_minor <= 0
        {
            return Err(EngineError::InvalidInput(
                "amount_minor must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = find_owned(&db_tx, cmd.user_id, cmd.transaction_id).await?;

            if let Some(account_id) = cmd.account_id {
                super::accounts::find_owned(&db_tx, cmd.user_id, account_id).await?;
            }
            if let Some(category_id) = cmd.category_id {
                super::categories::find_owned(&db_tx, cmd.user_id, category_id).await?;
            }
            if let Some(item_id) = cmd.item_id {
                super::items::find_owned(&db_tx, cmd.user_id, item_id).await?;
            }

            let mut active: transactions::ActiveModel = model.into();
            if let Some(account_id) = cmd.account_id {
                active.account_id = ActiveValue::Set(account_id);
            }
            if let Some(category_id) = cmd.category_id {
                active.category_id = ActiveValue::Set(category_id);
            }
            if let Some(item_id) = cmd.item_id {
                active.item_id = ActiveValue::Set(Some(item_id));
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(amount_minor) = cmd.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(note) = cmd.note.as_deref() {
                active.note = ActiveValue::Set(normalize_optional_text(Some(note)));
            }
            if let Some(occurred_at) = cmd.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }

            Transaction::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn delete_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<()> {
        find_owned(&self.database, user_id, transaction_id).await?;

        transactions::Entity::delete_by_id(transaction_id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    transaction_id: Uuid,
) -> ResultEngine<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("transaction".to_string()))
}
