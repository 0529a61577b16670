//! # Resource operations
//!
//! The backend collaborator of a resource page. The orchestrator only ever
//! talks to a [`ResourceOperations`] value it was handed at construction, so
//! tests substitute a fake and production code plugs in whatever transport it
//! has.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryResource`]: mock backend over a seeded `Vec<Record>`
//!   - honours search / filters / sort / paging in `list` using the engine's pipeline
//!   - generates uuid v4 ids for drafts without one
//!
//! - [`fs::FileResource`]: one JSON array per resource on disk
//!   - used by the CLI
//!   - rewrites the file atomically (temp file + rename)
//!
//! Timeouts and retries are the implementation's business; the engine just
//! awaits the result.

use crate::engine::SortSpec;
use crate::error::Result;
use crate::fields::FilterOp;
use crate::model::{Draft, Resource};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod fs;
pub mod memory;
mod records;

/// Query for [`ResourceOperations::list`].
///
/// `limit: None` asks for the whole matching collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    /// 1-based; `None` means the first page.
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: String,
    pub filters: BTreeMap<String, FilterOp>,
    pub sort: Option<SortSpec>,
}

impl ListParams {
    pub fn all() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<R> {
    pub data: Vec<R>,
    /// Matching records across all pages.
    pub total: usize,
}

#[async_trait]
pub trait ResourceOperations<R: Resource>: Send + Sync {
    async fn list(&self, params: ListParams) -> Result<ListPage<R>>;

    /// Returns `EngineError::NotFound` when the record is gone.
    async fn get_by_id(&self, id: &R::Id) -> Result<R>;

    /// Stores a new record; the backend assigns the identifier.
    async fn create(&self, draft: Draft) -> Result<R>;

    /// Merges `draft` into the stored record and returns the result.
    async fn update(&self, id: &R::Id, draft: Draft) -> Result<R>;

    async fn delete(&self, id: &R::Id) -> Result<()>;

    async fn bulk_delete(&self, ids: &[R::Id]) -> Result<()>;
}

#[async_trait]
impl<R, T> ResourceOperations<R> for Arc<T>
where
    R: Resource,
    T: ResourceOperations<R> + ?Sized,
{
    async fn list(&self, params: ListParams) -> Result<ListPage<R>> {
        (**self).list(params).await
    }

    async fn get_by_id(&self, id: &R::Id) -> Result<R> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, draft: Draft) -> Result<R> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &R::Id, draft: Draft) -> Result<R> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &R::Id) -> Result<()> {
        (**self).delete(id).await
    }

    async fn bulk_delete(&self, ids: &[R::Id]) -> Result<()> {
        (**self).bulk_delete(ids).await
    }
}
