//! Bounded table of decision algorithms.
//!
//! The id space is closed and known at build time, so the table is a
//! fixed array of [`SUPPORTED_ALGORITHMS`] slots reached only through
//! validated ids. Registration happens on a [`RegistryBuilder`]; once
//! [`RegistryBuilder::build`] freezes it into an [`AlgorithmRegistry`]
//! there is no way to register again, so every dispatch sees the same
//! table.

use std::sync::Arc;

use tracing::{debug, error};

use crate::algorithm::DecisionAlgorithm;
use crate::algorithms;
use crate::constants::SUPPORTED_ALGORITHMS;
use crate::errors::{RegistryError, StartupError};
use crate::types::AlgorithmId;

type Slots = [Option<Arc<dyn DecisionAlgorithm>>; SUPPORTED_ALGORITHMS];

/// Startup-time registry under construction.
#[derive(Default)]
pub struct RegistryBuilder {
    slots: Slots,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `algorithm` to `id`.
    ///
    /// # Errors
    /// - [`RegistryError::OutOfRange`] if `id` is outside the supported range.
    /// - [`RegistryError::AlreadyRegistered`] if `id` already has a descriptor;
    ///   the existing binding is kept.
    pub fn register(
        &mut self,
        id: AlgorithmId,
        algorithm: Arc<dyn DecisionAlgorithm>,
    ) -> Result<(), RegistryError> {
        let index = id.index().ok_or(RegistryError::OutOfRange {
            id: id.raw(),
            bound: SUPPORTED_ALGORITHMS,
        })?;

        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(RegistryError::AlreadyRegistered { id });
        }

        debug!(%id, name = algorithm.name(), "registered decision algorithm");
        *slot = Some(algorithm);
        Ok(())
    }

    /// Register every built-in policy at its fixed id, in order:
    /// test, ffsplit, 2nodelms, lms.
    ///
    /// Consumes the builder. On failure the partially populated table is
    /// dropped with it, so it can never be used for dispatch.
    ///
    /// # Errors
    /// [`StartupError::Registration`] naming the first policy that failed.
    pub fn register_builtins(mut self) -> Result<Self, StartupError> {
        for (id, algorithm) in algorithms::builtins() {
            let name = algorithm.name();
            if let Err(source) = self.register(id, algorithm) {
                error!(%id, name, %source, "failed to register decision algorithm");
                return Err(StartupError::Registration { name, id, source });
            }
        }
        Ok(self)
    }

    /// Freeze the table. No registration is possible afterwards.
    pub fn build(self) -> AlgorithmRegistry {
        AlgorithmRegistry { slots: self.slots }
    }
}

/// Read-only algorithm table shared by all instances.
pub struct AlgorithmRegistry {
    slots: Slots,
}

impl AlgorithmRegistry {
    /// Run the full startup sequence: register all built-ins and freeze.
    ///
    /// # Errors
    /// Propagates the first registration failure; the process must not
    /// go on to serve connections.
    pub fn builtin() -> Result<Self, StartupError> {
        Ok(RegistryBuilder::new().register_builtins()?.build())
    }

    /// Descriptor bound to `id`, if any. Never fails, never mutates.
    pub fn lookup(&self, id: AlgorithmId) -> Option<&dyn DecisionAlgorithm> {
        self.slots[id.index()?].as_deref()
    }

    /// Registered ids, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AlgorithmId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| AlgorithmId::new(index as u8))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.ids().map(|id| id.to_string()))
            .finish()
    }
}
