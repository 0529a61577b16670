//! # CRUD orchestrator
//!
//! [`CrudOrchestrator`] owns everything one resource page needs: the record
//! collection, the view state, the create / edit / view dialog slots and the
//! notice queue. It is the only thing that talks to the backend.
//!
//! ## Flow
//!
//! ```text
//!   UI intent ──► handle() ──► dispatch(Action) ──► ViewState::reduce
//!                    │
//!                    ├─► create / update / delete ──► ResourceOperations
//!                    │                                     │
//!                    │           reconcile collection ◄────┘ (only on success)
//!                    │
//!                    └─► table_view() ──► present::build_table
//! ```
//!
//! Nothing is applied before the backend answers. A failed operation leaves
//! the collection as it was, keeps its dialog open and queues an error notice,
//! then returns the error to the caller.
//!
//! ## Concurrency
//!
//! The orchestrator is single-threaded (`!Sync`): state sits in a `RefCell`
//! that is never borrowed across an `.await`, so several operations can be in
//! flight on one task at once. Operations on different records interleave
//! freely. Two operations racing on the same record reconcile in arrival
//! order, so the response that arrives last wins; lost updates are not
//! detected.
//!
//! Dialog submissions carry the [`Ticket`] of the dialog they came from. A
//! response for a dialog that was cancelled or reopened meanwhile still
//! updates the collection but leaves the dialog alone.

use crate::config::DisplaySettings;
use crate::dialog::{Dialog, OpenDialog, Ticket};
use crate::engine::{Action, ViewState};
use crate::error::{EngineError, Result, ValidationErrors};
use crate::form::{FormInput, FormSpec};
use crate::model::{Draft, Resource};
use crate::notice::{Notice, NoticeQueue};
use crate::present::{build_detail, build_table, DetailRow, Intent, TableView};
use crate::schema::{BulkAction, ResourceConfig, RowAction};
use crate::store::{ListParams, ResourceOperations};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use tracing::{debug, info, warn};

pub mod deletion;

pub use deletion::{Confirmed, PendingDeletion};

/// Payload of the create dialog.
#[derive(Debug, Clone)]
pub struct CreateForm {
    pub form: FormSpec,
    /// Input as last submitted, so a rejected form can be shown again.
    pub values: FormInput,
}

/// Payload of the edit dialog.
#[derive(Debug, Clone)]
pub struct EditForm<Id> {
    pub id: Id,
    pub form: FormSpec,
    pub values: FormInput,
}

/// What a routed intent produced.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome<Id> {
    /// View state or a dialog changed; redraw.
    Updated,
    /// A delete was requested and needs the user's confirmation.
    ConfirmDeletion(PendingDeletion<Id>),
    /// JSON of the exported records.
    Exported(String),
}

struct PageState<R: Resource> {
    records: Vec<R>,
    version: u64,
    view: ViewState<R::Id>,
    create: Dialog<CreateForm>,
    edit: Dialog<EditForm<R::Id>>,
    detail: Dialog<R>,
    notices: NoticeQueue,
}

impl<R: Resource> PageState<R> {
    fn apply(&mut self, action: Action<R::Id>, config: &ResourceConfig) {
        let view = std::mem::replace(&mut self.view, ViewState::new(config));
        self.view = view.reduce(action, &self.records, config);
    }

    fn records_changed(&mut self, config: &ResourceConfig) {
        self.version += 1;
        self.apply(Action::RecordsChanged, config);
    }

    fn position(&self, id: &R::Id) -> Option<usize> {
        self.records.iter().position(|r| &r.id() == id)
    }

    /// Puts a created record into the collection, replacing one with the same id.
    fn upsert(&mut self, record: R) {
        match self.position(&record.id()) {
            Some(i) => self.records[i] = record,
            None => self.records.push(record),
        }
    }

    fn forget(&mut self, ids: &[R::Id]) {
        self.records.retain(|r| !ids.contains(&r.id()));
        self.view.selection.remove_all(ids.iter());
        if self.edit.payload().map_or(false, |e| ids.contains(&e.id)) {
            self.edit.close();
        }
        if self.detail.payload().map_or(false, |r| ids.contains(&r.id())) {
            self.detail.close();
        }
    }
}

/// Keeps the in-flight counter up for as long as it lives.
struct Busy<'a>(&'a Cell<usize>);

impl<'a> Busy<'a> {
    fn start(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Busy(counter)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

pub struct CrudOrchestrator<R: Resource, B> {
    config: ResourceConfig,
    backend: B,
    state: RefCell<PageState<R>>,
    in_flight: Cell<usize>,
}

impl<R, B> CrudOrchestrator<R, B>
where
    R: Resource,
    B: ResourceOperations<R>,
{
    pub fn new(config: ResourceConfig, backend: B) -> Self {
        Self::with_records(config, backend, Vec::new())
    }

    /// Starts from an already known collection instead of calling [`load`](Self::load).
    pub fn with_records(config: ResourceConfig, backend: B, records: Vec<R>) -> Self {
        let view = ViewState::new(&config);
        Self {
            state: RefCell::new(PageState {
                records,
                version: 0,
                view,
                create: Dialog::default(),
                edit: Dialog::default(),
                detail: Dialog::default(),
                notices: NoticeQueue::default(),
            }),
            config,
            backend,
            in_flight: Cell::new(0),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn records(&self) -> Vec<R> {
        self.state.borrow().records.clone()
    }

    pub fn record(&self, id: &R::Id) -> Option<R> {
        let st = self.state.borrow();
        st.position(id).map(|i| st.records[i].clone())
    }

    /// Bumped every time the collection changes.
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// True while any backend call is pending; drives the page's loading indicator.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get() > 0
    }

    pub fn view_state(&self) -> ViewState<R::Id> {
        self.state.borrow().view.clone()
    }

    /// Selected records, resolved against the collection as it is now.
    pub fn selected_records(&self) -> Vec<R> {
        let st = self.state.borrow();
        st.view.selection.selected_records(&st.records)
    }

    pub fn table_view(&self, settings: &DisplaySettings) -> TableView<R::Id> {
        let st = self.state.borrow();
        build_table(&st.records, &st.view, &self.config, settings)
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.state.borrow_mut().notices.drain()
    }

    fn notify(&self, notice: Notice) {
        self.state.borrow_mut().notices.push(notice);
    }

    pub fn dispatch(&self, action: Action<R::Id>) {
        debug!(resource = %self.config.name, ?action, "dispatch");
        self.state.borrow_mut().apply(action, &self.config);
    }

    /// Routes a UI intent: view intents go to the reducer, row and bulk
    /// actions to the matching operation.
    pub async fn handle(&self, intent: Intent<R::Id>) -> Result<IntentOutcome<R::Id>>
    where
        R: Serialize,
    {
        match intent {
            Intent::RowAction(action, id) => self.row_action(action, &id).await,
            Intent::BulkAction(action) => self.run_bulk_action(action),
            view_intent => {
                if let Some(action) = view_intent.into_action() {
                    self.dispatch(action);
                }
                Ok(IntentOutcome::Updated)
            }
        }
    }

    pub async fn row_action(&self, action: RowAction, id: &R::Id) -> Result<IntentOutcome<R::Id>> {
        if !self.config.has_row_action(action) {
            warn!(resource = %self.config.name, %action, "row action not enabled, ignoring");
            return Err(EngineError::InvalidConfig(format!(
                "{} has no {} action",
                self.config.name, action
            )));
        }
        match action {
            RowAction::View => {
                self.open_view(id).await?;
                Ok(IntentOutcome::Updated)
            }
            RowAction::Edit => {
                self.open_edit(id)?;
                Ok(IntentOutcome::Updated)
            }
            RowAction::Delete => Ok(IntentOutcome::ConfirmDeletion(self.request_delete(id)?)),
        }
    }

    pub fn run_bulk_action(&self, action: BulkAction) -> Result<IntentOutcome<R::Id>>
    where
        R: Serialize,
    {
        if !self.config.has_bulk_action(action) {
            warn!(resource = %self.config.name, ?action, "bulk action not enabled, ignoring");
            return Err(EngineError::InvalidConfig(format!(
                "{} does not allow \"{}\"",
                self.config.name,
                action.label()
            )));
        }
        match action {
            BulkAction::Delete => Ok(IntentOutcome::ConfirmDeletion(self.request_bulk_delete()?)),
            BulkAction::Export => Ok(IntentOutcome::Exported(self.export_selected()?)),
        }
    }

    /// Replaces the collection with everything the backend has.
    pub async fn load(&self) -> Result<usize> {
        debug!(resource = %self.config.name, "load");
        let result = {
            let _busy = Busy::start(&self.in_flight);
            self.backend.list(ListParams::all()).await
        };

        match result {
            Ok(page) => {
                let count = page.data.len();
                let mut st = self.state.borrow_mut();
                st.records = page.data;
                st.records_changed(&self.config);
                info!(resource = %self.config.name, count, "collection loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(resource = %self.config.name, error = %err, "load failed");
                self.notify(Notice::error(format!(
                    "Could not load {}: {}",
                    self.config.name, err
                )));
                Err(err)
            }
        }
    }

    pub fn create_dialog(&self) -> Option<OpenDialog<CreateForm>> {
        self.state.borrow().create.current().cloned()
    }

    pub fn edit_dialog(&self) -> Option<OpenDialog<EditForm<R::Id>>> {
        self.state.borrow().edit.current().cloned()
    }

    /// The record shown in the view dialog.
    pub fn viewed_record(&self) -> Option<R> {
        self.state.borrow().detail.payload().cloned()
    }

    /// Label/value rows for the view dialog, if it is open.
    pub fn detail_rows(&self, settings: &DisplaySettings) -> Option<Vec<DetailRow>> {
        let st = self.state.borrow();
        st.detail
            .payload()
            .map(|record| build_detail(record, &self.config, settings))
    }

    pub fn open_create(&self) -> Ticket {
        let form = FormSpec::create(&self.config);
        self.state.borrow_mut().create.open(CreateForm {
            form,
            values: FormInput::new(),
        })
    }

    pub fn close_create(&self) {
        self.state.borrow_mut().create.close();
    }

    /// Opens the edit dialog pre-filled with the record's current values.
    pub fn open_edit(&self, id: &R::Id) -> Result<Ticket> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let record = match st.position(id) {
            Some(i) => &st.records[i],
            None => return Err(EngineError::NotFound(id.to_string())),
        };
        let form = FormSpec::edit(&self.config);
        let values = form.initial_values(record);
        Ok(st.edit.open(EditForm {
            id: id.clone(),
            form,
            values,
        }))
    }

    pub fn close_edit(&self) {
        self.state.borrow_mut().edit.close();
    }

    /// Fetches the latest version of a record and shows it.
    ///
    /// A record the backend no longer has is dropped from the collection.
    pub async fn open_view(&self, id: &R::Id) -> Result<R> {
        debug!(resource = %self.config.name, %id, "open view");
        let result = {
            let _busy = Busy::start(&self.in_flight);
            self.backend.get_by_id(id).await
        };

        match result {
            Ok(record) => {
                let mut st = self.state.borrow_mut();
                if let Some(i) = st.position(id) {
                    st.records[i] = record.clone();
                    st.records_changed(&self.config);
                }
                st.detail.open(record.clone());
                Ok(record)
            }
            Err(EngineError::NotFound(missing)) => {
                warn!(resource = %self.config.name, %id, "record vanished from backend");
                let mut st = self.state.borrow_mut();
                if st.position(id).is_some() {
                    st.forget(std::slice::from_ref(id));
                    st.records_changed(&self.config);
                }
                st.notices.push(Notice::warning(format!(
                    "{} {} no longer exists",
                    self.config.singular, id
                )));
                Err(EngineError::NotFound(missing))
            }
            Err(err) => {
                warn!(resource = %self.config.name, %id, error = %err, "fetch failed");
                self.notify(Notice::error(format!(
                    "Could not load {} {}: {}",
                    self.config.singular, id, err
                )));
                Err(err)
            }
        }
    }

    pub fn close_view(&self) {
        self.state.borrow_mut().detail.close();
    }

    /// Validates the create dialog's input and, if it is clean, creates the record.
    pub async fn submit_create(&self, input: FormInput) -> Result<R> {
        let (ticket, validated) = {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            let ticket = st.create.ticket().ok_or(EngineError::DialogNotOpen("create"))?;
            let validated = match st.create.payload_mut(ticket) {
                Some(payload) => {
                    payload.values = input.clone();
                    payload.form.validate(&input)
                }
                None => return Err(EngineError::DialogNotOpen("create")),
            };
            match &validated {
                Ok(_) => st.create.begin_submit(ticket),
                Err(errors) => {
                    st.create.reject(ticket, errors.clone());
                }
            }
            (ticket, validated)
        };

        match validated {
            Ok(draft) => self.create_from(draft, Some(ticket)).await,
            Err(errors) => {
                debug!(resource = %self.config.name, %errors, "create form rejected");
                Err(EngineError::Validation(errors))
            }
        }
    }

    /// Validates the edit dialog's input and, if it is clean, updates the record.
    pub async fn submit_edit(&self, input: FormInput) -> Result<R> {
        let (ticket, id, validated) = {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            let ticket = st.edit.ticket().ok_or(EngineError::DialogNotOpen("edit"))?;
            let (id, validated) = match st.edit.payload_mut(ticket) {
                Some(payload) => {
                    payload.values = input.clone();
                    (payload.id.clone(), payload.form.validate(&input))
                }
                None => return Err(EngineError::DialogNotOpen("edit")),
            };
            match &validated {
                Ok(_) => st.edit.begin_submit(ticket),
                Err(errors) => {
                    st.edit.reject(ticket, errors.clone());
                }
            }
            (ticket, id, validated)
        };

        match validated {
            Ok(draft) => self.update_from(&id, draft, Some(ticket)).await,
            Err(errors) => {
                debug!(resource = %self.config.name, %id, %errors, "edit form rejected");
                Err(EngineError::Validation(errors))
            }
        }
    }

    /// Creates a record from an already validated draft.
    pub async fn create(&self, draft: Draft) -> Result<R> {
        self.create_from(draft, None).await
    }

    /// Updates a record from an already validated draft.
    pub async fn update(&self, id: &R::Id, draft: Draft) -> Result<R> {
        self.update_from(id, draft, None).await
    }

    async fn create_from(&self, draft: Draft, ticket: Option<Ticket>) -> Result<R> {
        debug!(resource = %self.config.name, "create");
        let result = {
            let _busy = Busy::start(&self.in_flight);
            self.backend.create(draft).await
        };

        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        match result {
            Ok(record) => {
                let id = record.id();
                st.upsert(record.clone());
                st.records_changed(&self.config);
                if let Some(ticket) = ticket {
                    if !st.create.complete(ticket) {
                        debug!(resource = %self.config.name, %id, "create dialog moved on, leaving it");
                    }
                }
                info!(resource = %self.config.name, %id, "created");
                st.notices.push(Notice::success(format!(
                    "Created {} {}",
                    self.config.singular, id
                )));
                Ok(record)
            }
            Err(err) => {
                warn!(resource = %self.config.name, error = %err, "create failed");
                if let Some(ticket) = ticket {
                    st.create.reject(ticket, field_errors(&err));
                }
                st.notices.push(Notice::error(format!(
                    "Could not create {}: {}",
                    self.config.singular, err
                )));
                Err(err)
            }
        }
    }

    async fn update_from(&self, id: &R::Id, draft: Draft, ticket: Option<Ticket>) -> Result<R> {
        debug!(resource = %self.config.name, %id, "update");
        let result = {
            let _busy = Busy::start(&self.in_flight);
            self.backend.update(id, draft).await
        };

        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        match result {
            Ok(record) => {
                match st.position(id) {
                    Some(i) => {
                        st.records[i] = record.clone();
                        st.records_changed(&self.config);
                    }
                    // deleted while the update was in flight
                    None => debug!(resource = %self.config.name, %id, "updated record is gone, not re-adding"),
                }
                if let Some(shown) = st.detail.ticket() {
                    if st.detail.payload().map_or(false, |r| &r.id() == id) {
                        st.detail.refresh(shown, record.clone());
                    }
                }
                if let Some(ticket) = ticket {
                    if !st.edit.complete(ticket) {
                        debug!(resource = %self.config.name, %id, "edit dialog moved on, leaving it");
                    }
                }
                info!(resource = %self.config.name, %id, "updated");
                st.notices.push(Notice::success(format!(
                    "Updated {} {}",
                    self.config.singular, id
                )));
                Ok(record)
            }
            Err(err) => {
                warn!(resource = %self.config.name, %id, error = %err, "update failed");
                if let Some(ticket) = ticket {
                    st.edit.reject(ticket, field_errors(&err));
                }
                st.notices.push(Notice::error(format!(
                    "Could not update {} {}: {}",
                    self.config.singular, id, err
                )));
                Err(err)
            }
        }
    }

    /// First step of deleting one record.
    pub fn request_delete(&self, id: &R::Id) -> Result<PendingDeletion<R::Id>> {
        if self.state.borrow().position(id).is_none() {
            return Err(EngineError::NotFound(id.to_string()));
        }
        Ok(PendingDeletion::new(
            vec![id.clone()],
            format!("Delete {} {}?", self.config.singular, id),
        ))
    }

    /// First step of deleting several records at once.
    pub fn request_delete_many(&self, ids: &[R::Id]) -> Result<PendingDeletion<R::Id>> {
        let st = self.state.borrow();
        let mut targets: Vec<R::Id> = Vec::with_capacity(ids.len());
        for id in ids {
            if st.position(id).is_none() {
                return Err(EngineError::NotFound(id.to_string()));
            }
            if !targets.contains(id) {
                targets.push(id.clone());
            }
        }
        let prompt = match targets.as_slice() {
            [] => return Err(EngineError::NothingSelected),
            [only] => format!("Delete {} {}?", self.config.singular, only),
            many => format!("Delete {} {}?", many.len(), self.config.name),
        };
        Ok(PendingDeletion::new(targets, prompt))
    }

    /// First step of deleting the current selection.
    pub fn request_bulk_delete(&self) -> Result<PendingDeletion<R::Id>> {
        let ids: Vec<R::Id> = self.selected_records().iter().map(|r| r.id()).collect();
        self.request_delete_many(&ids)
    }

    /// Confirms and runs a pending deletion.
    pub async fn confirm(&self, pending: PendingDeletion<R::Id>) -> Result<()> {
        self.delete(pending.confirm()).await
    }

    /// Runs a confirmed deletion: one id through `delete`, several through `bulk_delete`.
    ///
    /// Targets are resolved against the collection now, not when the prompt
    /// was shown; ids deleted in the meantime are skipped.
    pub async fn delete(&self, mut confirmed: Confirmed<R::Id>) -> Result<()> {
        {
            let st = self.state.borrow();
            confirmed.retain(|id| st.position(id).is_some());
        }
        if confirmed.ids().is_empty() {
            debug!(resource = %self.config.name, "every target is already gone, nothing to delete");
            return Ok(());
        }
        if confirmed.is_bulk() {
            self.bulk_remove(confirmed).await
        } else {
            self.remove(confirmed).await
        }
    }

    /// Deletes the confirmed records one at a time.
    ///
    /// Stops at the first failure; records deleted before it stay deleted.
    pub async fn remove(&self, confirmed: Confirmed<R::Id>) -> Result<()> {
        let ids = confirmed.into_ids();
        let mut deleted: Vec<R::Id> = Vec::with_capacity(ids.len());
        let mut failure = None;
        {
            let _busy = Busy::start(&self.in_flight);
            for id in &ids {
                debug!(resource = %self.config.name, %id, "delete");
                match self.backend.delete(id).await {
                    Ok(()) => deleted.push(id.clone()),
                    Err(err) => {
                        failure = Some((id.clone(), err));
                        break;
                    }
                }
            }
        }

        let mut st = self.state.borrow_mut();
        if !deleted.is_empty() {
            st.forget(&deleted);
            st.records_changed(&self.config);
            info!(resource = %self.config.name, count = deleted.len(), "deleted");
            st.notices.push(Notice::success(self.deleted_message(&deleted)));
        }
        match failure {
            None => Ok(()),
            Some((id, err)) => {
                warn!(resource = %self.config.name, %id, error = %err, "delete failed");
                st.notices.push(Notice::error(format!(
                    "Could not delete {} {}: {}",
                    self.config.singular, id, err
                )));
                Err(err)
            }
        }
    }

    /// Deletes the confirmed records in one backend call, all or nothing.
    pub async fn bulk_remove(&self, confirmed: Confirmed<R::Id>) -> Result<()> {
        let ids = confirmed.into_ids();
        debug!(resource = %self.config.name, count = ids.len(), "bulk delete");
        let result = {
            let _busy = Busy::start(&self.in_flight);
            self.backend.bulk_delete(&ids).await
        };

        let mut st = self.state.borrow_mut();
        match result {
            Ok(()) => {
                st.forget(&ids);
                st.view.selection.clear();
                st.records_changed(&self.config);
                info!(resource = %self.config.name, count = ids.len(), "bulk deleted");
                st.notices.push(Notice::success(self.deleted_message(&ids)));
                Ok(())
            }
            Err(err) => {
                warn!(resource = %self.config.name, error = %err, "bulk delete failed");
                st.notices.push(Notice::error(format!(
                    "Could not delete {} {}: {}",
                    ids.len(),
                    self.config.name,
                    err
                )));
                Err(err)
            }
        }
    }

    fn deleted_message(&self, ids: &[R::Id]) -> String {
        match ids {
            [only] => format!("Deleted {} {}", self.config.singular, only),
            many => format!("Deleted {} {}", many.len(), self.config.name),
        }
    }

    /// Pretty JSON of the selected records; clears the selection.
    pub fn export_selected(&self) -> Result<String>
    where
        R: Serialize,
    {
        let selected = self.selected_records();
        if selected.is_empty() {
            return Err(EngineError::NothingSelected);
        }
        let json = serde_json::to_string_pretty(&selected)?;
        let mut st = self.state.borrow_mut();
        st.view.selection.clear();
        info!(resource = %self.config.name, count = selected.len(), "exported");
        st.notices.push(Notice::info(format!(
            "Exported {} {}",
            selected.len(),
            if selected.len() == 1 {
                &self.config.singular
            } else {
                &self.config.name
            }
        )));
        Ok(json)
    }
}

/// Field errors a backend reported, to show in the dialog.
fn field_errors(err: &EngineError) -> ValidationErrors {
    match err {
        EngineError::Validation(errors) => errors.clone(),
        _ => ValidationErrors::new(),
    }
}
