//! Dialog slots for the create / edit / view flows.
//!
//! Each slot is `closed → open → closed`. Opening hands out a fresh
//! [`Ticket`]; a submission carries the ticket it started with, and when it
//! completes it may only close the dialog if that ticket is still current. A
//! response that arrives after the user cancelled (or reopened the dialog)
//! leaves the dialog alone.

use crate::error::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct OpenDialog<T> {
    pub ticket: Ticket,
    pub payload: T,
    /// Field errors from the last rejected submission.
    pub errors: ValidationErrors,
    pub submitting: bool,
}

#[derive(Debug, Clone)]
pub struct Dialog<T> {
    open: Option<OpenDialog<T>>,
    issued: u64,
}

impl<T> Default for Dialog<T> {
    fn default() -> Self {
        Self {
            open: None,
            issued: 0,
        }
    }
}

impl<T> Dialog<T> {
    /// Opens the dialog, replacing whatever it showed before.
    pub fn open(&mut self, payload: T) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.open = Some(OpenDialog {
            ticket,
            payload,
            errors: ValidationErrors::new(),
            submitting: false,
        });
        ticket
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn current(&self) -> Option<&OpenDialog<T>> {
        self.open.as_ref()
    }

    pub fn payload(&self) -> Option<&T> {
        self.open.as_ref().map(|d| &d.payload)
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.open.as_ref().map(|d| d.ticket)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.ticket() == Some(ticket)
    }

    fn current_mut(&mut self, ticket: Ticket) -> Option<&mut OpenDialog<T>> {
        self.open.as_mut().filter(|d| d.ticket == ticket)
    }

    /// Swaps the shown payload, e.g. after a refresh. Ignored for stale tickets.
    pub fn refresh(&mut self, ticket: Ticket, payload: T) -> bool {
        match self.payload_mut(ticket) {
            Some(current) => {
                *current = payload;
                true
            }
            None => false,
        }
    }

    pub fn payload_mut(&mut self, ticket: Ticket) -> Option<&mut T> {
        self.current_mut(ticket).map(|d| &mut d.payload)
    }

    /// Marks a submission as in flight.
    pub fn begin_submit(&mut self, ticket: Ticket) {
        if let Some(dialog) = self.current_mut(ticket) {
            dialog.submitting = true;
            dialog.errors = ValidationErrors::new();
        }
    }

    /// Keeps the dialog open after a failed submission.
    ///
    /// Returns false when the ticket is stale.
    pub fn reject(&mut self, ticket: Ticket, errors: ValidationErrors) -> bool {
        match self.current_mut(ticket) {
            Some(dialog) => {
                dialog.submitting = false;
                dialog.errors = errors;
                true
            }
            None => false,
        }
    }

    /// Closes the dialog after a successful submission.
    ///
    /// Returns false, leaving the slot untouched, when the ticket is stale.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.open = None;
            true
        } else {
            false
        }
    }
}
