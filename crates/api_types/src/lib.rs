use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForgotPasswordRequest {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetPasswordRequest {
        pub token: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
    }

    /// Returned by register and login: a signed bearer token plus the user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub token: String,
        pub user: UserView,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Cash,
        Bank,
        Person,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreate {
        pub name: String,
        pub kind: AccountKind,
        pub is_default: Option<bool>,
        pub is_featured: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub kind: Option<AccountKind>,
        pub is_default: Option<bool>,
        pub is_featured: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
        pub is_default: bool,
        pub is_featured: bool,
        /// Derived: signed sum of the account's transactions.
        pub balance_minor: i64,
        pub last_report_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub kind: CategoryKind,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: CategoryKind,
        pub icon: Option<String>,
        pub is_default: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemCreate {
        pub category_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub category_id: Option<Uuid>,
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemListResponse {
        pub items: Vec<ItemView>,
    }
}

pub mod transaction {
    use super::*;
    use crate::{account::AccountKind, category::CategoryKind};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreate {
        /// Absent: the user's default account is used (created if missing).
        pub account_id: Option<Uuid>,
        /// Absent: the same-kind default category is used.
        pub category_id: Option<Uuid>,
        pub item_id: Option<Uuid>,
        pub kind: TransactionKind,
        /// Must be > 0. The kind defines the sign.
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub item_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub account_id: Option<Uuid>,
    }

    /// Account reference populated for display.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountRef {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
    }

    /// Category reference populated for display.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryRef {
        pub id: Uuid,
        pub name: String,
        pub kind: CategoryKind,
        pub icon: Option<String>,
    }

    /// Item reference populated for display.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemRef {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset.
        pub occurred_at: DateTime<FixedOffset>,
        pub account: AccountRef,
        pub category: CategoryRef,
        pub item: Option<ItemRef>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }
}

pub mod stats {
    use super::*;

    /// Income/expense sums for one aggregation window.
    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PeriodTotals {
        pub income_minor: i64,
        pub expenses_minor: i64,
        /// Always `income_minor - expenses_minor`.
        pub balance_minor: i64,
    }

    /// One calendar month of the all-time series.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthTotals {
        pub year: i32,
        /// 1-12.
        pub month: u32,
        pub income_minor: i64,
        pub expenses_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub daily: PeriodTotals,
        pub weekly: PeriodTotals,
        pub monthly: PeriodTotals,
        pub month_wise: Vec<MonthTotals>,
    }
}
