pub use accounts::{Account, AccountKind};
pub use categories::{Category, CategoryKind};
pub use error::EngineError;
pub use items::Item;
pub use ops::{
    CreateTransactionCmd, DashboardStats, Engine, EngineBuilder, MonthTotals, PeriodTotals,
    TransactionDetail, UpdateAccountCmd, UpdateCategoryCmd, UpdateItemCmd, UpdateTransactionCmd,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::Model as User;

mod accounts;
mod categories;
mod error;
mod items;
mod ops;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
