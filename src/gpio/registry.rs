//! Ordered collection of edge-triggered callback registrations.
//!
//! Registrations are immutable once added and are never removed.  The
//! registry is shared between the setup code and the poll thread, so the
//! list sits behind an `RwLock`; the poll thread takes a cheap snapshot of
//! `Arc`s once per tick and iterates that.

use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use super::channel::{ChannelKind, PollUnit};
use super::comparator::CompareOp;
use crate::error::RegistrationError;

/// Zero-argument side-effecting procedure fired on an edge.
pub type Action = Arc<dyn Fn() + Send + Sync + 'static>;

/// Position of a registration in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(pub u32);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct Registration {
    pub id: RegistrationId,
    pub kind: ChannelKind,
    pub index: usize,
    pub op: CompareOp,
    pub threshold: f32,
    pub action: Action,
}

impl Registration {
    /// True when the condition holds for `current` but did not hold for
    /// `previous`: a transition into the condition.
    pub fn is_edge(&self, previous: f32, current: f32) -> bool {
        self.op.evaluate(current, self.threshold) && !self.op.evaluate(previous, self.threshold)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("index", &self.index)
            .field("op", &self.op)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of the registry, in registration order.
///
/// Can be iterated any number of times.
#[derive(Debug, Clone, Default)]
pub struct Entries(Vec<Arc<Registration>>);

impl Entries {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.0.iter()
    }

    /// Entries served by one poll unit, in registration order.
    pub fn for_unit(&self, unit: PollUnit) -> impl Iterator<Item = &Arc<Registration>> {
        self.0.iter().filter(move |r| r.kind.unit() == unit)
    }
}

impl<'a> IntoIterator for &'a Entries {
    type Item = &'a Arc<Registration>;
    type IntoIter = core::slice::Iter<'a, Arc<Registration>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Default)]
pub struct CallbackRegistry {
    entries: RwLock<Vec<Arc<Registration>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration.  Duplicates are legal and fire independently.
    pub fn register(
        &self,
        kind: ChannelKind,
        index: usize,
        op: CompareOp,
        threshold: f32,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Result<RegistrationId, RegistrationError> {
        if index >= kind.width() {
            return Err(RegistrationError::IndexOutOfRange {
                index,
                width: kind.width(),
            });
        }
        if !threshold.is_finite() {
            return Err(RegistrationError::NonFiniteThreshold);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let id = RegistrationId(entries.len() as u32);
        entries.push(Arc::new(Registration {
            id,
            kind,
            index,
            op,
            threshold,
            action: Arc::new(action),
        }));
        info!("GPIO: registered {} on {}[{}] {} {}", id, kind, index, op, threshold);
        Ok(id)
    }

    /// Register from textual channel kind and operator, e.g.
    /// `("cgpio-digital", 7, "==", 0.0)`.
    pub fn register_parsed(
        &self,
        kind: &str,
        index: usize,
        op: &str,
        threshold: f32,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Result<RegistrationId, RegistrationError> {
        let kind: ChannelKind = kind.parse()?;
        let op: CompareOp = op.parse()?;
        self.register(kind, index, op, threshold, action)
    }

    /// Snapshot of every registration in insertion order.
    pub fn iterate(&self) -> Entries {
        Entries(self.entries.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.len())
            .finish()
    }
}
