//! Dashboard statistics endpoint.

use api_types::stats::{DashboardStats, MonthTotals, PeriodTotals};
use axum::{Extension, Json, extract::State};
use chrono::Local;

use crate::{ServerError, server::ServerState};

fn map_totals(totals: engine::PeriodTotals) -> PeriodTotals {
    PeriodTotals {
        income_minor: totals.income_minor,
        expenses_minor: totals.expenses_minor,
        balance_minor: totals.balance_minor,
    }
}

fn map_month(month: engine::MonthTotals) -> MonthTotals {
    MonthTotals {
        year: month.year,
        month: month.month,
        income_minor: month.income_minor,
        expenses_minor: month.expenses_minor,
        balance_minor: month.balance_minor,
    }
}

/// Handle requests for the dashboard aggregation.
///
/// The fixed windows are anchored at the server's local now.
pub async fn get_stats(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let stats = state
        .engine
        .dashboard_stats(user.id, Local::now().fixed_offset())
        .await?;

    Ok(Json(DashboardStats {
        daily: map_totals(stats.daily),
        weekly: map_totals(stats.weekly),
        monthly: map_totals(stats.monthly),
        month_wise: stats.month_wise.into_iter().map(map_month).collect(),
    }))
}
