use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{AuthConfig, app, run, run_with_listener, spawn_with_listener};

mod accounts;
mod auth;
mod categories;
mod dashboard;
mod items;
mod server;
mod transactions;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{AuthResponse, LoginRequest, RegisterRequest, UserView};
    }

    pub mod account {
        pub use api_types::account::{AccountListResponse, AccountView};
    }

    pub mod category {
        pub use api_types::category::{CategoryListResponse, CategoryView};
    }

    pub mod item {
        pub use api_types::item::{ItemListResponse, ItemView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionCreated, TransactionListResponse, TransactionView,
        };
    }

    pub mod stats {
        pub use api_types::stats::DashboardStats;
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Auth(String),
    Generic(String),
    Internal,
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Auth(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
