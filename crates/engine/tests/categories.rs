use chrono::Utc;
use engine::{CategoryKind, Engine, EngineError, TransactionKind};
use migration::MigratorTrait;
use sea_orm::Database;
use uuid::Uuid;

async fn engine_with_user() -> (Engine, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user = engine
        .create_user("Alice", "alice@example.com", "phc-hash")
        .await
        .unwrap();
    (engine, user.id)
}

#[tokio::test]
async fn list_creates_one_default_per_kind() {
    let (engine, user_id) = engine_with_user().await;

    let categories = engine.list_categories(user_id).await.unwrap();
    assert_eq!(categories.len(), 2);

    let income_defaults: Vec<_> = categories
        .iter()
        .filter(|c| c.kind == CategoryKind::Income && c.is_default)
        .collect();
    let expense_defaults: Vec<_> = categories
        .iter()
        .filter(|c| c.kind == CategoryKind::Expense && c.is_default)
        .collect();
    assert_eq!(income_defaults.len(), 1);
    assert_eq!(income_defaults[0].name, "Other Income");
    assert_eq!(expense_defaults.len(), 1);
    assert_eq!(expense_defaults[0].name, "Other Expenses");

    // Idempotent.
    let categories = engine.list_categories(user_id).await.unwrap();
    assert_eq!(categories.len(), 2);
}

#[tokio::test]
async fn update_renames_and_changes_icon() {
    let (engine, user_id) = engine_with_user().await;

    let category = engine
        .create_category(user_id, "Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();

    let category = engine
        .update_category(engine::UpdateCategoryCmd {
            user_id,
            category_id: category.id,
            name: Some("Food".to_string()),
            icon: Some("cart".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(category.name, "Food");
    assert_eq!(category.icon.as_deref(), Some("cart"));
    assert_eq!(category.kind, CategoryKind::Expense);
}

#[tokio::test]
async fn delete_reassigns_transactions_to_same_kind_default() {
    let (engine, user_id) = engine_with_user().await;

    let groceries = engine
        .create_category(user_id, "Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();
    engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id,
            account_id: None,
            category_id: Some(groceries.id),
            item_id: None,
            kind: TransactionKind::Expense,
            amount_minor: 1200,
            note: None,
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();

    engine.delete_category(user_id, groceries.id).await.unwrap();

    let transactions = engine.list_transactions(user_id, None).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].category_name, "Other Expenses");
    assert_eq!(transactions[0].category_kind, CategoryKind::Expense);

    let categories = engine.list_categories(user_id).await.unwrap();
    assert!(categories.iter().all(|c| c.id != groceries.id));
}

#[tokio::test]
async fn delete_clears_item_references_and_drops_items() {
    let (engine, user_id) = engine_with_user().await;

    let groceries = engine
        .create_category(user_id, "Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();
    let item = engine
        .create_item(user_id, groceries.id, "Coffee")
        .await
        .unwrap();
    engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id,
            account_id: None,
            category_id: Some(groceries.id),
            item_id: Some(item.id),
            kind: TransactionKind::Expense,
            amount_minor: 450,
            note: None,
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();

    engine.delete_category(user_id, groceries.id).await.unwrap();

    let transactions = engine.list_transactions(user_id, None).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction.item_id, None);
    assert!(engine.list_items(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_default_is_rejected() {
    let (engine, user_id) = engine_with_user().await;

    let categories = engine.list_categories(user_id).await.unwrap();
    let default = categories.iter().find(|c| c.is_default).unwrap();

    let err = engine
        .delete_category(user_id, default.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("default category cannot be deleted".to_string())
    );
}
