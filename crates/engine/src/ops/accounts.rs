use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, AccountKind, EngineError, ResultEngine, TransactionKind, accounts, transactions,
};

use super::{Engine, normalize_required_name, with_tx};

/// Name of the account created lazily for users that have none.
pub(super) const DEFAULT_ACCOUNT_NAME: &str = "Main Wallet";

pub struct UpdateAccountCmd {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub is_default: Option<bool>,
    pub is_featured: Option<bool>,
}

impl Engine {
    /// Create an account.
    ///
    /// When `is_default` is set, every other account of the user loses the
    /// flag first so exactly one default exists afterwards.
    pub async fn create_account(
        &self,
        user_id: Uuid,
        name: &str,
        kind: AccountKind,
        is_default: bool,
        is_featured: bool,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;

        with_tx!(self, |db_tx| {
            if is_default {
                unset_other_defaults(&db_tx, user_id, None).await?;
            }

            let model = accounts::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                is_default: ActiveValue::Set(is_default),
                is_featured: ActiveValue::Set(is_featured),
                last_report_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            Account::try_from(model)
        })
    }

    /// Lists the user's accounts with their derived balances.
    ///
    /// A user with zero accounts gets the default "Main Wallet" created on
    /// the spot. Balances are the signed sum of each account's transactions,
    /// computed from a single scan of the user's transactions per call.
    pub async fn list_accounts(&self, user_id: Uuid) -> ResultEngine<Vec<(Account, i64)>> {
        with_tx!(self, |db_tx| {
            let mut models = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;

            if models.is_empty() {
                let default = ensure_default_account(&db_tx, user_id).await?;
                models = vec![default];
            }

            let mut balances: HashMap<Uuid, i64> = HashMap::new();
            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;
            for tx in tx_models {
                let kind = TransactionKind::try_from(tx.kind.as_str())?;
                *balances.entry(tx.account_id).or_insert(0) += kind.signed(tx.amount_minor);
            }

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let balance = balances.get(&model.id).copied().unwrap_or(0);
                out.push((Account::try_from(model)?, balance));
            }
            Ok(out)
        })
    }

    /// Returns the signed sum of one account's transactions.
    pub async fn account_balance(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<i64> {
        find_owned(&self.database, user_id, account_id).await?;

        let tx_models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::AccountId.eq(account_id))
            .all(&self.database)
            .await?;

        let mut balance = 0;
        for tx in tx_models {
            let kind = TransactionKind::try_from(tx.kind.as_str())?;
            balance += kind.signed(tx.amount_minor);
        }
        Ok(balance)
    }

    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = find_owned(&db_tx, cmd.user_id, cmd.account_id).await?;

            // `is_default: Some(false)` is ignored: the flag is only ever
            // moved by setting it on another account.
            let becomes_default = cmd.is_default == Some(true) && !model.is_default;
            if becomes_default {
                unset_other_defaults(&db_tx, cmd.user_id, Some(cmd.account_id)).await?;
            }

            let mut active: accounts::ActiveModel = model.into();
            if let Some(name) = cmd.name.as_deref() {
                active.name = ActiveValue::Set(normalize_required_name(name, "account")?);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if becomes_default {
                active.is_default = ActiveValue::Set(true);
            }
            if let Some(is_featured) = cmd.is_featured {
                active.is_featured = ActiveValue::Set(is_featured);
            }

            Account::try_from(active.update(&db_tx).await?)
        })
    }

    /// Delete an account, reassigning its transactions to the default.
    ///
    /// The default account itself cannot be deleted.
    pub async fn delete_account(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = find_owned(&db_tx, user_id, account_id).await?;
            if model.is_default {
                return Err(EngineError::Conflict(
                    "default account cannot be deleted".to_string(),
                ));
            }

            let default = ensure_default_account(&db_tx, user_id).await?;

            transactions::Entity::update_many()
                .col_expr(transactions::Column::AccountId, Expr::value(default.id))
                .filter(transactions::Column::AccountId.eq(account_id))
                .exec(&db_tx)
                .await?;

            accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Stamp the time the periodic report for this account went out.
    pub async fn mark_report_sent(
        &self,
        user_id: Uuid,
        account_id: Uuid,
        at: DateTime<Utc>,
    ) -> ResultEngine<Account> {
        let model = find_owned(&self.database, user_id, account_id).await?;

        let mut active: accounts::ActiveModel = model.into();
        active.last_report_at = ActiveValue::Set(Some(at));
        Account::try_from(active.update(&self.database).await?)
    }
}

pub(super) async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    account_id: Uuid,
) -> ResultEngine<accounts::Model> {
    accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("account".to_string()))
}

async fn unset_other_defaults(
    db_tx: &DatabaseTransaction,
    user_id: Uuid,
    keep: Option<Uuid>,
) -> ResultEngine<()> {
    let mut update = accounts::Entity::update_many()
        .col_expr(accounts::Column::IsDefault, Expr::value(false))
        .filter(accounts::Column::UserId.eq(user_id))
        .filter(accounts::Column::IsDefault.eq(true));
    if let Some(keep) = keep {
        update = update.filter(accounts::Column::Id.ne(keep));
    }
    update.exec(db_tx).await?;
    Ok(())
}

/// Returns the user's default account, creating "Main Wallet" when the user
/// has none.
pub(super) async fn ensure_default_account(
    db_tx: &DatabaseTransaction,
    user_id: Uuid,
) -> ResultEngine<accounts::Model> {
    if let Some(model) = accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id))
        .filter(accounts::Column::IsDefault.eq(true))
        .one(db_tx)
        .await?
    {
        return Ok(model);
    }

    let model = accounts::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user_id),
        name: ActiveValue::Set(DEFAULT_ACCOUNT_NAME.to_string()),
        kind: ActiveValue::Set(AccountKind::Cash.as_str().to_string()),
        is_default: ActiveValue::Set(true),
        is_featured: ActiveValue::Set(false),
        last_report_at: ActiveValue::Set(None),
    }
    .insert(db_tx)
    .await?;

    Ok(model)
}
