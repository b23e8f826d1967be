//! Scoped stream overlays
//!
//! While a catalog entry is processed its configs are installed as the
//! overlay of the catalog (or state) input. The guard clears the overlay
//! on every exit path so entries never leak into each other.

use super::registry::ConfigRegistry;
use crate::input::InputKind;
use tracing::debug;

/// Clears an installed overlay when dropped
#[must_use = "the overlay is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct OverlayGuard<'a> {
    registry: &'a ConfigRegistry,
    kind: InputKind,
}

impl<'a> OverlayGuard<'a> {
    pub(super) fn new(registry: &'a ConfigRegistry, kind: InputKind) -> Self {
        Self { registry, kind }
    }

    /// Input the overlay was installed on
    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

impl Drop for OverlayGuard<'_> {
    fn drop(&mut self) {
        debug!(input = %self.kind, "Clearing stream overlay");
        self.registry.reset_overlay(self.kind);
    }
}
