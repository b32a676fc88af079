use chrono::Utc;
use engine::{AccountKind, Engine, EngineError, TransactionKind};
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
async fn list_creates_main_wallet_for_fresh_user() {
    let (engine, user_id) = engine_with_user().await;

    let accounts = engine.list_accounts(user_id).await.unwrap();
    assert_eq!(accounts.len(), 1);
    let (account, balance) = &accounts[0];
    assert_eq!(account.name, "Main Wallet");
    assert_eq!(account.kind, AccountKind::Cash);
    assert!(account.is_default);
    assert_eq!(*balance, 0);

    // A second listing must not create another one.
    let accounts = engine.list_accounts(user_id).await.unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn single_default_invariant_on_create_and_update() {
    let (engine, user_id) = engine_with_user().await;

    let first = engine
        .create_account(user_id, "Checking", AccountKind::Bank, true, false)
        .await
        .unwrap();
    let second = engine
        .create_account(user_id, "Savings", AccountKind::Bank, true, false)
        .await
        .unwrap();

    let accounts = engine.list_accounts(user_id).await.unwrap();
    let defaults: Vec<_> = accounts
        .iter()
        .filter(|(account, _)| account.is_default)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].0.id, second.id);

    let updated = engine
        .update_account(engine::UpdateAccountCmd {
            user_id,
            account_id: first.id,
            name: None,
            kind: None,
            is_default: Some(true),
            is_featured: None,
        })
        .await
        .unwrap();
    assert!(updated.is_default);

    let accounts = engine.list_accounts(user_id).await.unwrap();
    let defaults: Vec<_> = accounts
        .iter()
        .filter(|(account, _)| account.is_default)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].0.id, first.id);
}

#[tokio::test]
async fn balance_is_signed_sum_of_transactions() {
    let (engine, user_id) = engine_with_user().await;

    let account = engine
        .create_account(user_id, "Checking", AccountKind::Bank, true, false)
        .await
        .unwrap();

    engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id,
            account_id: Some(account.id),
            category_id: None,
            item_id: None,
            kind: TransactionKind::Income,
            amount_minor: 1000,
            note: None,
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();
    engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id,
            account_id: Some(account.id),
            category_id: None,
            item_id: None,
            kind: TransactionKind::Expense,
            amount_minor: 300,
            note: None,
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();

    assert_eq!(
        engine.account_balance(user_id, account.id).await.unwrap(),
        700
    );
}

#[tokio::test]
async fn delete_reassigns_transactions_to_default() {
    let (engine, user_id) = engine_with_user().await;

    // "Main Wallet" becomes the default.
    let accounts = engine.list_accounts(user_id).await.unwrap();
    let default_id = accounts[0].0.id;

    let side = engine
        .create_account(user_id, "Cash Jar", AccountKind::Cash, false, false)
        .await
        .unwrap();
    engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id,
            account_id: Some(side.id),
            category_id: None,
            item_id: None,
            kind: TransactionKind::Income,
            amount_minor: 500,
            note: None,
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();

    engine.delete_account(user_id, side.id).await.unwrap();

    let accounts = engine.list_accounts(user_id).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].0.id, default_id);
    assert_eq!(accounts[0].1, 500);
}

#[tokio::test]
async fn delete_default_is_rejected() {
    let (engine, user_id) = engine_with_user().await;

    let accounts = engine.list_accounts(user_id).await.unwrap();
    let default_id = accounts[0].0.id;

    let err = engine.delete_account(user_id, default_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("default account cannot be deleted".to_string())
    );
}

#[tokio::test]
async fn mark_report_sent_stamps_time() {
    let (engine, user_id) = engine_with_user().await;

    let account = engine
        .create_account(user_id, "Checking", AccountKind::Bank, false, false)
        .await
        .unwrap();
    assert!(account.last_report_at.is_none());

    let at = Utc::now();
    let account = engine
        .mark_report_sent(user_id, account.id, at)
        .await
        .unwrap();
    assert_eq!(account.last_report_at, Some(at));
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let (engine, user_id) = engine_with_user().await;

    let err = engine
        .create_account(user_id, "   ", AccountKind::Cash, false, false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn foreign_account_is_not_found() {
    let (engine, user_id) = engine_with_user().await;
    let other = engine
        .create_user("Bob", "bob@example.com", "phc-hash")
        .await
        .unwrap();

    let account = engine
        .create_account(user_id, "Checking", AccountKind::Bank, false, false)
        .await
        .unwrap();

    let err = engine.delete_account(other.id, account.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("account".to_string()));
}
