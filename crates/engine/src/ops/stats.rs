use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TransactionKind, transactions};

use super::Engine;

/// Income/expense sums for one aggregation window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodTotals {
    pub income_minor: i64,
    pub expenses_minor: i64,
    pub balance_minor: i64,
}

impl PeriodTotals {
    fn add(&mut self, kind: TransactionKind, amount_minor: i64) {
        match kind {
            TransactionKind::Income => self.income_minor += amount_minor,
            TransactionKind::Expense => self.expenses_minor += amount_minor,
        }
        self.balance_minor = self.income_minor - self.expenses_minor;
    }
}

/// One calendar month of the all-time series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthTotals {
    pub year: i32,
    pub month: u32,
    pub income_minor: i64,
    pub expenses_minor: i64,
    pub balance_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardStats {
    pub daily: PeriodTotals,
    pub weekly: PeriodTotals,
    pub monthly: PeriodTotals,
    pub month_wise: Vec<MonthTotals>,
}

impl Engine {
    /// Aggregates the user's transactions into the dashboard view.
    ///
    /// `now` carries the server's local offset; the daily window starts at
    /// local midnight, the weekly window on Monday of the current ISO week,
    /// the monthly window on the 1st. The month-wise series buckets the
    /// whole history by local (year, month), ascending. Everything is
    /// recomputed from the transaction table on each call.
    pub async fn dashboard_stats(
        &self,
        user_id: Uuid,
        now: DateTime<FixedOffset>,
    ) -> ResultEngine<DashboardStats> {
        let offset = *now.offset();
        let today = now.naive_local().date();

        let day_start = today.and_time(NaiveTime::MIN);
        let week_start = week_start(today)?.and_time(NaiveTime::MIN);
        let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .ok_or_else(|| EngineError::InvalidInput("invalid month start".to_string()))?
            .and_time(NaiveTime::MIN);

        let tx_models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;

        let mut daily = PeriodTotals::default();
        let mut weekly = PeriodTotals::default();
        let mut monthly = PeriodTotals::default();
        let mut months: BTreeMap<(i32, u32), PeriodTotals> = BTreeMap::new();

        for model in tx_models {
            let kind = TransactionKind::try_from(model.kind.as_str())?;
            let local: NaiveDateTime = model.occurred_at.with_timezone(&offset).naive_local();

            months
                .entry((local.year(), local.month()))
                .or_default()
                .add(kind, model.amount_minor);

            if local >= month_start {
                monthly.add(kind, model.amount_minor);
            }
            if local >= week_start {
                weekly.add(kind, model.amount_minor);
            }
            if local >= day_start {
                daily.add(kind, model.amount_minor);
            }
        }

        let month_wise = months
            .into_iter()
            .map(|((year, month), totals)| MonthTotals {
                year,
                month,
                income_minor: totals.income_minor,
                expenses_minor: totals.expenses_minor,
                balance_minor: totals.balance_minor,
            })
            .collect();

        Ok(DashboardStats {
            daily,
            weekly,
            monthly,
            month_wise,
        })
    }
}

fn week_start(today: NaiveDate) -> ResultEngine<NaiveDate> {
    let days_from_monday = u64::from(today.weekday().num_days_from_monday());
    today
        .checked_sub_days(Days::new(days_from_monday))
        .ok_or_else(|| EngineError::InvalidInput("invalid week start".to_string()))
}
