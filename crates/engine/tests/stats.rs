use chrono::{DateTime, FixedOffset, Utc};
use engine::{Engine, TransactionKind};
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

fn at(rfc3339: &str) -> DateTime<Utc> {
    rfc3339
        .parse::<DateTime<FixedOffset>>()
        .unwrap()
        .with_timezone(&Utc)
}

async fn add(
    engine: &Engine,
    user_id: Uuid,
    kind: TransactionKind,
    amount_minor: i64,
    occurred_at: &str,
) {
    engine
        .create_transaction(engine::CreateTransactionCmd {
            user_id,
            account_id: None,
            category_id: None,
            item_id: None,
            kind,
            amount_minor,
            note: None,
            occurred_at: at(occurred_at),
        })
        .await
        .unwrap();
}

// Thursday, June 18th 2026, noon, UTC+2.
fn now() -> DateTime<FixedOffset> {
    "2026-06-18T12:00:00+02:00".parse().unwrap()
}

#[tokio::test]
async fn windows_are_anchored_at_local_now() {
    let (engine, user_id) = engine_with_user().await;

    // Today.
    add(&engine, user_id, TransactionKind::Income, 10_000, "2026-06-18T09:00:00+02:00").await;
    // Tuesday of the same ISO week (Monday is 2026-06-15).
    add(&engine, user_id, TransactionKind::Expense, 2_500, "2026-06-16T10:00:00+02:00").await;
    // Earlier this month.
    add(&engine, user_id, TransactionKind::Income, 5_000, "2026-06-02T08:00:00+02:00").await;
    // Previous month.
    add(&engine, user_id, TransactionKind::Expense, 1_000, "2026-05-20T08:00:00+02:00").await;

    let stats = engine.dashboard_stats(user_id, now()).await.unwrap();

    assert_eq!(stats.daily.income_minor, 10_000);
    assert_eq!(stats.daily.expenses_minor, 0);
    assert_eq!(stats.daily.balance_minor, 10_000);

    assert_eq!(stats.weekly.income_minor, 10_000);
    assert_eq!(stats.weekly.expenses_minor, 2_500);
    assert_eq!(stats.weekly.balance_minor, 7_500);

    assert_eq!(stats.monthly.income_minor, 15_000);
    assert_eq!(stats.monthly.expenses_minor, 2_500);
    assert_eq!(
        stats.monthly.balance_minor,
        stats.monthly.income_minor - stats.monthly.expenses_minor
    );
}

#[tokio::test]
async fn month_wise_series_covers_all_history() {
    let (engine, user_id) = engine_with_user().await;

    add(&engine, user_id, TransactionKind::Income, 10_000, "2026-06-18T09:00:00+02:00").await;
    add(&engine, user_id, TransactionKind::Income, 5_000, "2026-06-02T08:00:00+02:00").await;
    add(&engine, user_id, TransactionKind::Expense, 1_000, "2026-05-20T08:00:00+02:00").await;
    add(&engine, user_id, TransactionKind::Income, 2_000, "2025-12-31T23:00:00+02:00").await;

    let stats = engine.dashboard_stats(user_id, now()).await.unwrap();

    let months: Vec<(i32, u32)> = stats
        .month_wise
        .iter()
        .map(|m| (m.year, m.month))
        .collect();
    assert_eq!(months, vec![(2025, 12), (2026, 5), (2026, 6)]);

    let june = &stats.month_wise[2];
    assert_eq!(june.income_minor, 15_000);
    assert_eq!(june.expenses_minor, 0);
    assert_eq!(june.balance_minor, 15_000);

    let may = &stats.month_wise[1];
    assert_eq!(may.income_minor, 0);
    assert_eq!(may.expenses_minor, 1_000);
    assert_eq!(may.balance_minor, -1_000);

    // The series accounts for every income amount ever recorded.
    let total_income: i64 = stats.month_wise.iter().map(|m| m.income_minor).sum();
    assert_eq!(total_income, 17_000);
}

#[tokio::test]
async fn windows_follow_the_local_offset() {
    let (engine, user_id) = engine_with_user().await;

    // 23:30 UTC on the 17th is already the 18th at UTC+2, so it lands in
    // the daily window.
    add(&engine, user_id, TransactionKind::Income, 700, "2026-06-17T23:30:00+00:00").await;

    let stats = engine.dashboard_stats(user_id, now()).await.unwrap();
    assert_eq!(stats.daily.income_minor, 700);

    let june = stats
        .month_wise
        .iter()
        .find(|m| (m.year, m.month) == (2026, 6))
        .unwrap();
    assert_eq!(june.income_minor, 700);
}

#[tokio::test]
async fn empty_history_yields_zeroes() {
    let (engine, user_id) = engine_with_user().await;

    let stats = engine.dashboard_stats(user_id, now()).await.unwrap();
    assert_eq!(stats.daily.balance_minor, 0);
    assert_eq!(stats.weekly.balance_minor, 0);
    assert_eq!(stats.monthly.balance_minor, 0);
    assert!(stats.month_wise.is_empty());
}
