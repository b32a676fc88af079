use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Item, ResultEngine, items, transactions};

use super::{Engine, normalize_required_name, with_tx};

pub struct UpdateItemCmd {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
}

impl Engine {
    pub async fn list_items(&self, user_id: Uuid) -> ResultEngine<Vec<Item>> {
        let models = items::Entity::find()
            .filter(items::Column::UserId.eq(user_id))
            .order_by_asc(items::Column::Name)
            .all(&self.database)
            .await?;

        Ok(models.into_iter().map(Item::from).collect())
    }

    pub async fn create_item(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> ResultEngine<Item> {
        let name = normalize_required_name(name, "item")?;
        super::categories::find_owned(&self.database, user_id, category_id).await?;

        let model = items::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            category_id: ActiveValue::Set(category_id),
            name: ActiveValue::Set(name),
        }
        .insert(&self.database)
        .await?;

        Ok(Item::from(model))
    }

    pub async fn update_item(&self, cmd: UpdateItemCmd) -> ResultEngine<Item> {
        let model = find_owned(&self.database, cmd.user_id, cmd.item_id).await?;

        if let Some(category_id) = cmd.category_id {
            super::categories::find_owned(&self.database, cmd.user_id, category_id).await?;
        }

        let mut active: items::ActiveModel = model.into();
        if let Some(category_id) = cmd.category_id {
            active.category_id = ActiveValue::Set(category_id);
        }
        if let Some(name) = cmd.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_name(name, "item")?);
        }

        Ok(Item::from(active.update(&self.database).await?))
    }

    /// Delete an item. Blocked while any transaction references it.
    pub async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_owned(&db_tx, user_id, item_id).await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::ItemId.eq(item_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Conflict(
                    "item is referenced by transactions".to_string(),
                ));
            }

            items::Entity::delete_by_id(item_id).exec(&db_tx).await?;
            Ok(())
        })
    }
}

pub(super) async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    item_id: Uuid,
) -> ResultEngine<items::Model> {
    items::Entity::find_by_id(item_id)
        .filter(items::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("item".to_string()))
}
