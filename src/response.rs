use serde::Serialize;

/// Body returned by create/update/delete procedures.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            id: None,
        }
    }

    pub fn created(id: i64) -> Self {
        Self {
            success: true,
            id: Some(id),
        }
    }
}
