use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{Category, CategoryKind, EngineError, ResultEngine, categories, items, transactions};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

pub(super) const DEFAULT_INCOME_NAME: &str = "Other Income";
pub(super) const DEFAULT_EXPENSE_NAME: &str = "Other Expenses";

pub struct UpdateCategoryCmd {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl Engine {
    /// Lists the user's categories, lazily creating the per-kind defaults.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            ensure_default_category(&db_tx, user_id, CategoryKind::Income).await?;
            ensure_default_category(&db_tx, user_id, CategoryKind::Expense).await?;

            let models = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .order_by_asc(categories::Column::Kind)
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;

            models.into_iter().map(Category::try_from).collect()
        })
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        kind: CategoryKind,
        icon: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;

        let model = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(name),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            icon: ActiveValue::Set(normalize_optional_text(icon)),
            is_default: ActiveValue::Set(false),
        }
        .insert(&self.database)
        .await?;

        Category::try_from(model)
    }

    /// Rename a category or change its icon. The kind is immutable.
    pub async fn update_category(&self, cmd: UpdateCategoryCmd) -> ResultEngine<Category> {
        let model = find_owned(&self.database, cmd.user_id, cmd.category_id).await?;

        let mut active: categories::ActiveModel = model.into();
        if let Some(name) = cmd.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_name(name, "category")?);
        }
        if let Some(icon) = cmd.icon.as_deref() {
            active.icon = ActiveValue::Set(normalize_optional_text(Some(icon)));
        }

        Category::try_from(active.update(&self.database).await?)
    }

    /// Delete a category, reassigning its transactions to the same-kind
    /// default.
    ///
    /// Reassigned transactions lose their item reference (the items belong
    /// to the deleted category) and the category's items go with it.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = find_owned(&db_tx, user_id, category_id).await?;
            if model.is_default {
                return Err(EngineError::Conflict(
                    "default category cannot be deleted".to_string(),
                ));
            }

            let kind = CategoryKind::try_from(model.kind.as_str())?;
            let default = ensure_default_category(&db_tx, user_id, kind).await?;

            transactions::Entity::update_many()
                .col_expr(transactions::Column::CategoryId, Expr::value(default.id))
                .col_expr(
                    transactions::Column::ItemId,
                    Expr::value(None::<Uuid>),
                )
                .filter(transactions::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;

            items::Entity::delete_many()
                .filter(items::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }
}

pub(super) async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    category_id: Uuid,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(categories::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("category".to_string()))
}

/// Returns the user's default category of `kind`, creating it when absent.
pub(super) async fn ensure_default_category(
    db_tx: &DatabaseTransaction,
    user_id: Uuid,
    kind: CategoryKind,
) -> ResultEngine<categories::Model> {
    if let Some(model) = categories::Entity::find()
        .filter(categories::Column::UserId.eq(user_id))
        .filter(categories::Column::Kind.eq(kind.as_str()))
        .filter(categories::Column::IsDefault.eq(true))
        .one(db_tx)
        .await?
    {
        return Ok(model);
    }

    let name = match kind {
        CategoryKind::Income => DEFAULT_INCOME_NAME,
        CategoryKind::Expense => DEFAULT_EXPENSE_NAME,
    };

    let model = categories::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user_id),
        name: ActiveValue::Set(name.to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        icon: ActiveValue::Set(None),
        is_default: ActiveValue::Set(true),
    }
    .insert(db_tx)
    .await?;

    Ok(model)
}
