//! Client-side mirror of one server-owned resource.
//!
//! Every record-editing view keeps its data in a `Remote<T>`: the last
//! value it fetched, whether a read is in flight, and the inline error
//! from the last failed read. Reads are split into `begin_reload` and
//! `complete_reload` so a completion that lost the race (a newer read
//! started, or the view moved to another patient) is dropped.

use crate::error::PortalError;
use crate::models::Keyed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// Issued by `begin_reload`; only the newest ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    owner: String,
}

impl LoadTicket {
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone)]
pub struct Remote<T> {
    value: T,
    phase: Phase,
    owner: Option<String>,
    generation: u64,
}

/// A list of keyed entities under one patient.
pub type RemoteCollection<T> = Remote<Vec<T>>;

impl<T: Default> Default for Remote<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            phase: Phase::Idle,
            owner: None,
            generation: 0,
        }
    }
}

impl<T: Default> Remote<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a read for `owner` (usually the patient id). Switching
    /// owner drops the data of the previous one immediately.
    pub fn begin_reload(&mut self, owner: &str) -> LoadTicket {
        if self.owner.as_deref() != Some(owner) {
            self.value = T::default();
            self.owner = Some(owner.to_string());
        }
        self.generation += 1;
        self.phase = Phase::Loading;
        LoadTicket {
            generation: self.generation,
            owner: owner.to_string(),
        }
    }
}

impl<T> Remote<T> {
    /// Apply the outcome of the read `ticket` was issued for. Returns
    /// `false` (and changes nothing) for a superseded ticket.
    ///
    /// On failure the previous value is kept but `data()` hides it
    /// until the next successful read.
    pub fn complete_reload(
        &mut self,
        ticket: LoadTicket,
        result: Result<T, PortalError>,
        fetch_error: &str,
    ) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(owner = %ticket.owner, "Discarding stale load result");
            return false;
        }
        match result {
            Ok(value) => {
                self.value = value;
                self.phase = Phase::Loaded;
            }
            Err(e) => {
                tracing::warn!(owner = %ticket.owner, error = %e, "Load failed");
                self.phase = Phase::Error(fetch_error.to_string());
            }
        }
        true
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.owner.as_deref() == Some(ticket.owner.as_str())
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The value, unless loading or the last read failed.
    pub fn data(&self) -> Option<&T> {
        match self.phase {
            Phase::Loaded | Phase::Idle => Some(&self.value),
            Phase::Loading | Phase::Error(_) => None,
        }
    }

    /// The value regardless of phase.
    pub fn retained(&self) -> &T {
        &self.value
    }

    /// Replace the value after a successful mutation.
    pub fn replace(&mut self, value: T) {
        self.value = value;
    }
}

impl<T> Remote<Vec<T>> {
    pub fn items(&self) -> &[T] {
        self.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, item: T) {
        self.value.push(item);
    }
}

impl<T: Keyed> Remote<Vec<T>> {
    /// Drop the item with `key`; returns whether one was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.value.len();
        self.value.retain(|item| item.key() != key);
        self.value.len() != before
    }
}
