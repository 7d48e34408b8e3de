//! What a find-or-create call reports once it settles.

use crate::document::Document;

/// Result of one find-or-create call.
///
/// Read as the tuple (error, record, was_updated, is_new) through the
/// accessors, or pattern-match the variants directly. `E` is whatever the
/// store's lookup or save returned; nothing is wrapped.
#[derive(Debug)]
pub enum Outcome<E> {
    /// The call completed without error.
    Settled {
        record: Document,
        was_updated: bool,
        is_new: bool,
    },
    /// The lookup failed; nothing was created or saved.
    LookupFailed(E),
    /// The save failed; `record` is the in-memory state that was attempted.
    SaveFailed {
        error: E,
        record: Document,
        is_new: bool,
    },
}

impl<E> Outcome<E> {
    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Settled { .. } => None,
            Outcome::LookupFailed(error) | Outcome::SaveFailed { error, .. } => Some(error),
        }
    }

    pub fn record(&self) -> Option<&Document> {
        match self {
            Outcome::Settled { record, .. } | Outcome::SaveFailed { record, .. } => Some(record),
            Outcome::LookupFailed(_) => None,
        }
    }

    /// True iff a save was issued.
    pub fn was_updated(&self) -> bool {
        match self {
            Outcome::Settled { was_updated, .. } => *was_updated,
            Outcome::SaveFailed { .. } => true,
            Outcome::LookupFailed(_) => false,
        }
    }

    /// True iff no matching record existed before the call.
    pub fn is_new(&self) -> bool {
        match self {
            Outcome::Settled { is_new, .. } | Outcome::SaveFailed { is_new, .. } => *is_new,
            Outcome::LookupFailed(_) => false,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Settled { .. })
    }

    pub fn into_parts(self) -> (Option<E>, Option<Document>, bool, bool) {
        let was_updated = self.was_updated();
        let is_new = self.is_new();
        match self {
            Outcome::Settled { record, .. } => (None, Some(record), was_updated, is_new),
            Outcome::LookupFailed(error) => (Some(error), None, was_updated, is_new),
            Outcome::SaveFailed { error, record, .. } => {
                (Some(error), Some(record), was_updated, is_new)
            }
        }
    }

    /// The record on success, the store error otherwise.
    pub fn into_result(self) -> Result<Document, E> {
        match self {
            Outcome::Settled { record, .. } => Ok(record),
            Outcome::LookupFailed(error) | Outcome::SaveFailed { error, .. } => Err(error),
        }
    }

    pub fn into_status(self) -> Result<Status, E> {
        match self {
            Outcome::Settled {
                record,
                was_updated,
                is_new,
            } => Ok(Status {
                record,
                was_updated,
                is_new,
            }),
            Outcome::LookupFailed(error) | Outcome::SaveFailed { error, .. } => Err(error),
        }
    }

    /// Collapse to a single result, shaped by the `status` option.
    pub fn resolve(self, status: bool) -> Result<Resolution, E> {
        if status {
            self.into_status().map(Resolution::Status)
        } else {
            self.into_result().map(Resolution::Record)
        }
    }
}

/// Composite result returned when the `status` option is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub record: Document,
    pub was_updated: bool,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Record(Document),
    Status(Status),
}

impl Resolution {
    pub fn record(&self) -> &Document {
        match self {
            Resolution::Record(record) => record,
            Resolution::Status(status) => &status.record,
        }
    }

    pub fn into_record(self) -> Document {
        match self {
            Resolution::Record(record) => record,
            Resolution::Status(status) => status.record,
        }
    }

    pub fn status(&self) -> Option<&Status> {
        match self {
            Resolution::Status(status) => Some(status),
            Resolution::Record(_) => None,
        }
    }
}
