use time::OffsetDateTime;

use crate::{
    error::{ApiError, ApiResult},
    money::to_minor_units,
    store::{CategoryStore, Store, TransactionStore},
    transactions::{
        dto::{CreateTransactionRequest, ListQuery, UpdateTransactionRequest},
        repo_types::{NewTransaction, TransactionFilter, TransactionPatch, TransactionType},
    },
};

pub(crate) const MAX_PAGE_SIZE: i64 = 500;
pub(crate) const MAX_DESCRIPTION_LEN: usize = 500;
pub(crate) const MAX_SEARCH_LEN: usize = 100;

pub(crate) fn validate_pagination(limit: i64, offset: i64) -> ApiResult<(i64, i64)> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    if offset < 0 {
        return Err(ApiError::validation("offset must not be negative"));
    }
    Ok((limit, offset))
}

/// Splits the list query into a filter and a validated page. A blank
/// search term matches everything.
pub(crate) fn list_params(q: ListQuery) -> ApiResult<(TransactionFilter, i64, i64)> {
    let (limit, offset) = validate_pagination(q.limit, q.offset)?;
    let search = q
        .search
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());
    if search.as_ref().is_some_and(|s| s.chars().count() > MAX_SEARCH_LEN) {
        return Err(ApiError::validation(format!(
            "search must be at most {MAX_SEARCH_LEN} characters"
        )));
    }
    Ok((TransactionFilter { kind: q.kind, search }, limit, offset))
}

pub(crate) fn validate_date_range(start: OffsetDateTime, end: OffsetDateTime) -> ApiResult<()> {
    if start > end {
        return Err(ApiError::validation("startDate must not be after endDate"));
    }
    Ok(())
}

fn trimmed_description(description: String) -> ApiResult<String> {
    let d = description.trim().to_owned();
    if d.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(d)
}

pub(crate) fn new_transaction(req: CreateTransactionRequest) -> ApiResult<NewTransaction> {
    Ok(NewTransaction {
        category_id: req.category_id,
        kind: req.kind,
        amount: to_minor_units(req.amount)?,
        description: req
            .description
            .map(trimmed_description)
            .transpose()?
            .filter(|d| !d.is_empty()),
        date: req.date,
    })
}

pub(crate) fn transaction_patch(req: UpdateTransactionRequest) -> ApiResult<TransactionPatch> {
    Ok(TransactionPatch {
        kind: req.kind,
        amount: req.amount.map(to_minor_units).transpose()?,
        category_id: req.category_id,
        description: req.description.map(trimmed_description).transpose()?,
        date: req.date,
    })
}

/// A transaction may only point at one of the caller's own categories of
/// the same type.
pub(crate) async fn ensure_category_usable(
    store: &dyn Store,
    user_id: i64,
    category_id: i64,
    kind: TransactionType,
) -> ApiResult<()> {
    let Some(category) = store.get_category(user_id, category_id).await? else {
        return Err(ApiError::NotFound("category"));
    };
    if category.kind != kind {
        return Err(ApiError::validation(format!(
            "category {} is not a {} category",
            category.name,
            kind_name(kind)
        )));
    }
    Ok(())
}

fn kind_name(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "income",
        TransactionType::Expense => "expense",
    }
}

/// Re-checks the category when a patch changes the type or the category.
pub(crate) async fn ensure_patch_consistent(
    store: &dyn Store,
    user_id: i64,
    id: i64,
    patch: &TransactionPatch,
) -> ApiResult<()> {
    if patch.kind.is_none() && patch.category_id.is_none() {
        return Ok(());
    }
    let Some(current) = store.get_transaction(user_id, id).await? else {
        return Err(ApiError::NotFound("transaction"));
    };
    ensure_category_usable(
        store,
        user_id,
        patch.category_id.unwrap_or(current.category_id),
        patch.kind.unwrap_or(current.kind),
    )
    .await
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn create_request(amount: f64) -> CreateTransactionRequest {
        CreateTransactionRequest {
            kind: TransactionType::Expense,
            amount,
            category_id: 3,
            description: Some("  Lunch  ".into()),
            date: datetime!(2026-10-01 12:00 UTC),
        }
    }

    #[test]
    fn new_transaction_scales_amount() {
        let new = new_transaction(create_request(12.5)).unwrap();
        assert_eq!(new.amount, 1250);
        assert_eq!(new.description.as_deref(), Some("Lunch"));
        assert_eq!(new.category_id, 3);
    }

    #[test]
    fn new_transaction_rejects_non_positive_amounts() {
        assert!(matches!(
            new_transaction(create_request(-50.0)),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            new_transaction(create_request(0.0)),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn blank_description_is_dropped_on_create() {
        let mut req = create_request(1.0);
        req.description = Some("   ".into());
        assert_eq!(new_transaction(req).unwrap().description, None);
    }

    #[test]
    fn patch_only_carries_supplied_fields() {
        let patch = transaction_patch(UpdateTransactionRequest {
            amount: Some(3.1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.amount, Some(310));
        assert!(patch.kind.is_none());
        assert!(patch.description.is_none());
        assert!(!patch.is_empty());

        let empty = transaction_patch(UpdateTransactionRequest::default()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn pagination_bounds() {
        assert!(validate_pagination(50, 0).is_ok());
        assert!(validate_pagination(0, 0).is_err());
        assert!(validate_pagination(501, 0).is_err());
        assert!(validate_pagination(10, -1).is_err());
    }

    #[test]
    fn blank_search_matches_everything() {
        let (filter, limit, offset) = list_params(ListQuery {
            limit: 20,
            offset: 0,
            kind: Some(TransactionType::Income),
            search: Some("   ".into()),
        })
        .unwrap();
        assert_eq!((limit, offset), (20, 0));
        assert_eq!(filter.kind, Some(TransactionType::Income));
        assert!(filter.search.is_none());

        assert!(list_params(ListQuery {
            limit: 20,
            offset: 0,
            kind: None,
            search: Some("x".repeat(101)),
        })
        .is_err());
    }

    #[test]
    fn date_range_must_be_ordered() {
        let a = datetime!(2026-01-01 0:00 UTC);
        let b = datetime!(2026-02-01 0:00 UTC);
        assert!(validate_date_range(a, b).is_ok());
        assert!(validate_date_range(a, a).is_ok());
        assert!(validate_date_range(b, a).is_err());
    }
}
