use serde::Deserialize;

use crate::transactions::repo_types::TransactionType;

fn default_color() -> String {
    "#3B82F6".into()
}

fn default_icon() -> String {
    "tag".into()
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// `?type=income|expense`, absent means both.
#[derive(Debug, Deserialize)]
pub struct KindQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
}
