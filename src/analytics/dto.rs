use serde::{Deserialize, Serialize};

use crate::{
    money::to_major_units,
    transactions::repo_types::{CategoryTotal, TransactionType},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub transaction_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownItem {
    pub category_id: i64,
    pub category_name: String,
    pub category_color: String,
    pub total: f64,
    pub count: i64,
}

impl From<CategoryTotal> for CategoryBreakdownItem {
    fn from(c: CategoryTotal) -> Self {
        Self {
            category_id: c.category_id,
            category_name: c.category_name,
            category_color: c.category_color,
            total: to_major_units(c.total),
            count: c.count,
        }
    }
}

/// One bucket of the monthly trend, labelled like `"Oct 2026"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownQuery {
    #[serde(rename = "type")]
    pub kind: TransactionType,
}
