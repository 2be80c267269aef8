//! Aggregations behind the analytics procedures.
//!
//! Totals stay in minor units until the response is built so that sums are
//! exact.

use std::collections::BTreeMap;

use time::{error::ComponentRange, Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::{
    analytics::dto::{MonthlyTotal, SummaryResponse},
    money::to_major_units,
    transactions::repo_types::{Transaction, TransactionType, TypeStat},
};

/// Number of calendar months covered by the trend, current month included.
pub(crate) const TREND_MONTHS: i32 = 12;

pub(crate) fn summarize(stats: &[TypeStat]) -> SummaryResponse {
    let mut income = 0i64;
    let mut expenses = 0i64;
    let mut count = 0i64;

    for stat in stats {
        match stat.kind {
            TransactionType::Income => income += stat.total,
            TransactionType::Expense => expenses += stat.total,
        }
        count += stat.count;
    }

    let total_income = to_major_units(income);
    let total_expenses = to_major_units(expenses);
    SummaryResponse {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        transaction_count: count,
    }
}

/// Months since year 0, January being 0.
fn month_index(year: i32, month: Month) -> i32 {
    year * 12 + (month as i32 - 1)
}

fn month_start(index: i32) -> Result<Date, ComponentRange> {
    let year = index.div_euclid(12);
    let month = Month::January.nth_next(index.rem_euclid(12) as u8);
    Date::from_calendar_date(year, month, 1)
}

/// Inclusive UTC bounds of the trend: the first instant of the month
/// `TREND_MONTHS - 1` months ago up to the last microsecond of the current
/// month.
pub(crate) fn trend_window(
    now: OffsetDateTime,
) -> Result<(OffsetDateTime, OffsetDateTime), ComponentRange> {
    let now = now.to_offset(UtcOffset::UTC);
    let current = month_index(now.year(), now.month());

    let start = month_start(current - (TREND_MONTHS - 1))?
        .midnight()
        .assume_utc();
    let next = month_start(current + 1)?.midnight().assume_utc();
    Ok((start, next - Duration::microseconds(1)))
}

fn short_month(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

pub(crate) fn month_label(year: i32, month: Month) -> String {
    format!("{} {year}", short_month(month))
}

/// Buckets transactions by UTC calendar month. Months without transactions
/// are left out; the rest come back oldest first.
pub(crate) fn monthly_trend(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<i32, (i32, Month, i64, i64)> = BTreeMap::new();

    for tx in transactions {
        let date = tx.date.to_offset(UtcOffset::UTC);
        let entry = buckets
            .entry(month_index(date.year(), date.month()))
            .or_insert((date.year(), date.month(), 0, 0));
        match tx.kind {
            TransactionType::Income => entry.2 += tx.amount,
            TransactionType::Expense => entry.3 += tx.amount,
        }
    }

    buckets
        .into_values()
        .map(|(year, month, income, expenses)| MonthlyTotal {
            month: month_label(year, month),
            income: to_major_units(income),
            expenses: to_major_units(expenses),
        })
        .collect()
}
