//! Collection operations shared by the bundled backends.

use super::{ListPage, ListParams};
use crate::engine::{compute_visible, paginate, PaginationState, QueryState};
use crate::error::{EngineError, Result};
use crate::model::{Draft, Record, RecordId};
use crate::schema::ResourceConfig;

pub(crate) fn list(records: &[Record], config: &ResourceConfig, params: ListParams) -> ListPage<Record> {
    let query = QueryState {
        search: params.search,
        filters: params.filters,
        sort: params.sort,
    };
    let visible = compute_visible(records, &query, config);
    let total = visible.len();

    let data = match params.limit {
        Some(limit) => {
            let pagination = PaginationState {
                page: params.page.unwrap_or(1),
                page_size: limit.max(1),
            };
            paginate(&visible, pagination).items
        }
        None => visible,
    };

    ListPage {
        data: data.into_iter().cloned().collect(),
        total,
    }
}

pub(crate) fn get(records: &[Record], id: &RecordId) -> Result<Record> {
    records
        .iter()
        .find(|r| &r.id == id)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(id.to_string()))
}

pub(crate) fn insert(records: &mut Vec<Record>, config: &ResourceConfig, draft: Draft) -> Result<Record> {
    let record = Record::from_draft(&config.id_key, draft, RecordId::generate());
    if records.iter().any(|r| r.id == record.id) {
        return Err(EngineError::Conflict(format!(
            "{} {} already exists",
            config.singular, record.id
        )));
    }
    records.push(record.clone());
    Ok(record)
}

pub(crate) fn update(
    records: &mut [Record],
    config: &ResourceConfig,
    id: &RecordId,
    draft: Draft,
) -> Result<Record> {
    let record = records
        .iter_mut()
        .find(|r| &r.id == id)
        .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
    record.apply(&config.id_key, draft);
    Ok(record.clone())
}

pub(crate) fn remove(records: &mut Vec<Record>, id: &RecordId) -> Result<()> {
    let before = records.len();
    records.retain(|r| &r.id != id);
    if records.len() == before {
        return Err(EngineError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Removes every id or none of them.
pub(crate) fn remove_many(records: &mut Vec<Record>, ids: &[RecordId]) -> Result<()> {
    if let Some(missing) = ids.iter().find(|id| !records.iter().any(|r| &r.id == *id)) {
        return Err(EngineError::NotFound(missing.to_string()));
    }
    records.retain(|r| !ids.contains(&r.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SortSpec;
    use crate::fields::{FieldSpec, FieldValue, FilterOp, ValueKind};

    fn config() -> ResourceConfig {
        ResourceConfig::builder("products")
            .field(FieldSpec::new("name", "Name", ValueKind::String).searchable())
            .field(FieldSpec::new("price", "Price", ValueKind::Number).sortable().filterable())
            .build()
            .unwrap()
    }

    fn records() -> Vec<Record> {
        (1..=5)
            .map(|i| {
                Record::new(i.to_string())
                    .with("name", format!("widget {}", i))
                    .with("price", (10 - i) as i64)
            })
            .collect()
    }

    #[test]
    fn list_pages_and_reports_total() {
        let params = ListParams {
            page: Some(2),
            limit: Some(2),
            sort: Some(SortSpec::asc("price")),
            ..Default::default()
        };
        let page = list(&records(), &config(), params);
        assert_eq!(page.total, 5);
        let ids: Vec<String> = page.data.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn list_without_limit_returns_all_matches() {
        let mut params = ListParams::all();
        params
            .filters
            .insert("price".into(), FilterOp::parse(ValueKind::Number, "..6"));
        let page = list(&records(), &config(), params);
        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 2);
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut records = records();
        let mut draft = Draft::new();
        draft.insert("id".into(), FieldValue::text("3"));
        let err = insert(&mut records, &config(), draft).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn insert_generates_missing_ids() {
        let mut records = Vec::new();
        let a = insert(&mut records, &config(), Draft::new()).unwrap();
        let b = insert(&mut records, &config(), Draft::new()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn remove_many_is_all_or_nothing() {
        let mut records = records();
        let ids = vec![RecordId::new("1"), RecordId::new("nope")];
        assert!(remove_many(&mut records, &ids).is_err());
        assert_eq!(records.len(), 5);

        remove_many(&mut records, &[RecordId::new("1"), RecordId::new("2")]).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn update_and_remove_unknown_id() {
        let mut records = records();
        assert!(matches!(
            update(&mut records, &config(), &RecordId::new("x"), Draft::new()),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            remove(&mut records, &RecordId::new("x")),
            Err(EngineError::NotFound(_))
        ));
    }
}
