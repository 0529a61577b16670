use super::records as collection;
use super::{ListPage, ListParams, ResourceOperations};
use crate::error::Result;
use crate::model::{Draft, Record, RecordId};
use crate::schema::ResourceConfig;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Mock backend over an in-memory collection.
///
/// Stands in for a remote API in tests and offline mode. Nothing is persisted.
pub struct InMemoryResource {
    config: ResourceConfig,
    records: RwLock<Vec<Record>>,
}

impl InMemoryResource {
    pub fn new(config: ResourceConfig) -> Self {
        Self::with_records(config, Vec::new())
    }

    pub fn with_records(config: ResourceConfig, records: Vec<Record>) -> Self {
        Self {
            config,
            records: RwLock::new(records),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Copy of the stored collection.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ResourceOperations<Record> for InMemoryResource {
    async fn list(&self, params: ListParams) -> Result<ListPage<Record>> {
        let records = self.records.read().await;
        Ok(collection::list(&records, &self.config, params))
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<Record> {
        let records = self.records.read().await;
        collection::get(&records, id)
    }

    async fn create(&self, draft: Draft) -> Result<Record> {
        let mut records = self.records.write().await;
        collection::insert(&mut records, &self.config, draft)
    }

    async fn update(&self, id: &RecordId, draft: Draft) -> Result<Record> {
        let mut records = self.records.write().await;
        collection::update(&mut records, &self.config, id, draft)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut records = self.records.write().await;
        collection::remove(&mut records, id)
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<()> {
        let mut records = self.records.write().await;
        collection::remove_many(&mut records, ids)
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    //! Backends and data for exercising the orchestrator.

    use super::*;
    use crate::error::EngineError;
    use crate::fields::{FieldSpec, ValueKind};
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Op {
        List,
        Get,
        Create,
        Update,
        Delete,
        BulkDelete,
    }

    #[derive(Default)]
    struct Script {
        failing: HashSet<Op>,
        delays: HashMap<Op, VecDeque<usize>>,
        calls: HashMap<Op, usize>,
    }

    /// [`InMemoryResource`] with scriptable failures and latency.
    ///
    /// Latency is simulated by yielding to the executor a number of times after
    /// the backend has applied the change, so the call that yields longest
    /// resolves last. Nothing sleeps.
    pub struct ScriptedResource {
        inner: InMemoryResource,
        script: Mutex<Script>,
    }

    impl ScriptedResource {
        pub fn new(inner: InMemoryResource) -> Self {
            Self {
                inner,
                script: Mutex::new(Script::default()),
            }
        }

        fn script(&self) -> std::sync::MutexGuard<'_, Script> {
            self.script.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Every call of `op` fails until reset.
        pub fn set_failing(&self, op: Op, failing: bool) {
            let mut script = self.script();
            if failing {
                script.failing.insert(op);
            } else {
                script.failing.remove(&op);
            }
        }

        /// The next call of `op` yields `yields` times before resolving.
        pub fn delay_next(&self, op: Op, yields: usize) {
            self.script().delays.entry(op).or_default().push_back(yields);
        }

        pub fn calls(&self, op: Op) -> usize {
            self.script().calls.get(&op).copied().unwrap_or(0)
        }

        pub async fn snapshot(&self) -> Vec<Record> {
            self.inner.snapshot().await
        }

        /// Counts the call and reports whether it should fail.
        fn enter(&self, op: Op) -> (bool, usize) {
            let mut script = self.script();
            *script.calls.entry(op).or_default() += 1;
            let delay = script
                .delays
                .get_mut(&op)
                .and_then(VecDeque::pop_front)
                .unwrap_or(0);
            (script.failing.contains(&op), delay)
        }

        async fn run<T>(&self, op: Op, call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
            let (fail, delay) = self.enter(op);
            let result = if fail {
                Err(EngineError::Operation(format!("simulated {:?} failure", op)))
            } else {
                call.await
            };
            for _ in 0..delay {
                tokio::task::yield_now().await;
            }
            result
        }
    }

    #[async_trait]
    impl ResourceOperations<Record> for ScriptedResource {
        async fn list(&self, params: ListParams) -> Result<ListPage<Record>> {
            self.run(Op::List, self.inner.list(params)).await
        }

        async fn get_by_id(&self, id: &RecordId) -> Result<Record> {
            self.run(Op::Get, self.inner.get_by_id(id)).await
        }

        async fn create(&self, draft: Draft) -> Result<Record> {
            self.run(Op::Create, self.inner.create(draft)).await
        }

        async fn update(&self, id: &RecordId, draft: Draft) -> Result<Record> {
            self.run(Op::Update, self.inner.update(id, draft)).await
        }

        async fn delete(&self, id: &RecordId) -> Result<()> {
            self.run(Op::Delete, self.inner.delete(id)).await
        }

        async fn bulk_delete(&self, ids: &[RecordId]) -> Result<()> {
            self.run(Op::BulkDelete, self.inner.bulk_delete(ids)).await
        }
    }

    pub fn people_config() -> ResourceConfig {
        ResourceConfig::builder("people")
            .singular("person")
            .field(FieldSpec::new("id", "ID", ValueKind::String).form(false))
            .field(
                FieldSpec::new("name", "Name", ValueKind::String)
                    .searchable()
                    .sortable()
                    .required(),
            )
            .field(
                FieldSpec::new("status", "Status", ValueKind::Enum)
                    .options([("active", "Active"), ("inactive", "Inactive")])
                    .filterable()
                    .sortable(),
            )
            .field(FieldSpec::new("balance", "Balance", ValueKind::Number).sortable())
            .page_size(2)
            .build()
            .unwrap_or_else(|e| panic!("fixture config is valid: {}", e))
    }

    pub fn person(id: &str, name: &str, status: &str) -> Record {
        Record::new(id).with("name", name).with("status", status)
    }

    /// Five people, alternating active / inactive.
    pub fn five_people() -> Vec<Record> {
        vec![
            person("1", "Alice", "active"),
            person("2", "Bob", "inactive"),
            person("3", "Carol", "active"),
            person("4", "Dan", "inactive"),
            person("5", "Erin", "active"),
        ]
    }

    pub fn people_backend(records: Vec<Record>) -> ScriptedResource {
        ScriptedResource::new(InMemoryResource::with_records(people_config(), records))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::error::EngineError;
    use crate::fields::FieldValue;
    use crate::model::Resource;

    #[tokio::test]
    async fn create_then_get() {
        let backend = InMemoryResource::new(people_config());
        let mut draft = Draft::new();
        draft.insert("name".into(), FieldValue::text("Alice"));
        let created = backend.create(draft).await.unwrap();

        let fetched = backend.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn list_honours_query() {
        let backend = InMemoryResource::with_records(people_config(), five_people());
        let mut params = ListParams {
            search: "a".into(),
            ..Default::default()
        };
        params.filters.insert(
            "status".into(),
            crate::fields::FilterOp::Eq(FieldValue::text("active")),
        );
        let page = backend.list(params).await.unwrap();
        let names: Vec<String> = page.data.iter().map(|r| r.field("name").to_string()).collect();
        assert_eq!(names, vec!["Alice", "Carol"]);
    }

    #[tokio::test]
    async fn custom_id_key_is_searchable_and_shown() {
        use crate::fields::{FieldSpec, ValueKind};

        let config = ResourceConfig::builder("parts")
            .id_key("sku")
            .field(FieldSpec::new("sku", "SKU", ValueKind::String).searchable())
            .field(FieldSpec::new("name", "Name", ValueKind::String))
            .build()
            .unwrap();
        let backend = InMemoryResource::new(config.clone());
        let mut draft = Draft::new();
        draft.insert("sku".into(), FieldValue::text("A-1"));
        draft.insert("name".into(), FieldValue::text("Widget"));
        let created = backend.create(draft).await.unwrap();
        assert_eq!(created.id, RecordId::new("A-1"));

        let found = backend
            .list(ListParams {
                search: "a-1".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.total, 1);

        let settings = crate::config::DisplaySettings::default();
        let view = crate::engine::ViewState::new(&config);
        let table = crate::present::build_table(&found.data, &view, &config, &settings);
        assert_eq!(table.rows[0].cells[0].text, "A-1");
    }

    #[tokio::test]
    async fn scripted_failure_leaves_data_untouched() {
        let backend = people_backend(five_people());
        backend.set_failing(Op::Delete, true);
        let err = backend.delete(&RecordId::new("1")).await.unwrap_err();
        assert!(matches!(err, EngineError::Operation(_)));
        assert_eq!(backend.snapshot().await.len(), 5);
        assert_eq!(backend.calls(Op::Delete), 1);

        backend.set_failing(Op::Delete, false);
        backend.delete(&RecordId::new("1")).await.unwrap();
        assert_eq!(backend.snapshot().await.len(), 4);
    }
}
