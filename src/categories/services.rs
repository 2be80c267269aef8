use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    categories::{
        dto::{CreateCategoryRequest, UpdateCategoryRequest},
        repo_types::{CategoryPatch, NewCategory},
    },
    error::{ApiError, ApiResult},
    transactions::repo_types::TransactionType::{self, Expense, Income},
};

pub(crate) const MAX_NAME_LEN: usize = 64;
pub(crate) const MAX_ICON_LEN: usize = 32;

const INCOME_COLOR: &str = "#10B981";
const EXPENSE_COLOR: &str = "#F59E0B";

/// Categories every new user starts with: `(name, type, icon)`.
const DEFAULT_CATEGORIES: &[(&str, TransactionType, &str)] = &[
    ("Salary", Income, "briefcase"),
    ("Freelance", Income, "code"),
    ("Investment", Income, "trending-up"),
    ("Gift", Income, "gift"),
    ("Bonus", Income, "award"),
    ("Other Income", Income, "plus-circle"),
    ("Food & Dining", Expense, "utensils"),
    ("Transportation", Expense, "car"),
    ("Shopping", Expense, "shopping-bag"),
    ("Entertainment", Expense, "film"),
    ("Utilities", Expense, "zap"),
    ("Healthcare", Expense, "heart"),
    ("Rent", Expense, "home"),
    ("Education", Expense, "book"),
    ("Insurance", Expense, "shield"),
    ("Subscriptions", Expense, "repeat"),
    ("Other Expense", Expense, "minus-circle"),
];

pub(crate) fn default_categories() -> Vec<NewCategory> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|&(name, kind, icon)| NewCategory {
            name: name.into(),
            kind,
            color: match kind {
                Income => INCOME_COLOR,
                Expense => EXPENSE_COLOR,
            }
            .into(),
            icon: icon.into(),
        })
        .collect()
}

fn valid_name(name: String) -> ApiResult<String> {
    let name = name.trim().to_owned();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn valid_color(color: String) -> ApiResult<String> {
    lazy_static! {
        static ref HEX_COLOR: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
    }
    if !HEX_COLOR.is_match(&color) {
        return Err(ApiError::validation("color must look like #RRGGBB"));
    }
    Ok(color)
}

fn valid_icon(icon: String) -> ApiResult<String> {
    let icon = icon.trim().to_owned();
    let len = icon.chars().count();
    if len == 0 || len > MAX_ICON_LEN {
        return Err(ApiError::validation(format!(
            "icon must be between 1 and {MAX_ICON_LEN} characters"
        )));
    }
    Ok(icon)
}

pub(crate) fn new_category(req: CreateCategoryRequest) -> ApiResult<NewCategory> {
    Ok(NewCategory {
        name: valid_name(req.name)?,
        kind: req.kind,
        color: valid_color(req.color)?,
        icon: valid_icon(req.icon)?,
    })
}

pub(crate) fn category_patch(req: UpdateCategoryRequest) -> ApiResult<CategoryPatch> {
    Ok(CategoryPatch {
        name: req.name.map(valid_name).transpose()?,
        color: req.color.map(valid_color).transpose()?,
        icon: req.icon.map(valid_icon).transpose()?,
    })
}
