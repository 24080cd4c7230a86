//! Engine and renderable interfaces, plus the per-system slot cache.
//!
//! Engines are opaque to the pool. Every capability is optional: the trait
//! methods default to no-ops (or trivial success), so an engine implements
//! only what it has and the pool skips the rest.

pub mod slots;

use anyhow::Result;

/// An individual drawable object owned by an engine.
pub trait Renderable: Send {
    /// Rebind this object to the freshly created contexts of its system.
    /// `Ok(false)` means the object could not rebind and will render
    /// incorrectly until the next switch. The default succeeds trivially
    /// for renderables that hold no context-bound state.
    fn reinitialize_context(&mut self) -> Result<bool> {
        Ok(true)
    }

    /// Release per-object resources. Called when the pool is disposed.
    fn destroy(&mut self) {}
}

/// A system's rendering engine: owns that system's renderables and its
/// start/stop behavior.
pub trait Engine: Send {
    /// Start or stop rendering. Default no-op for engines without the
    /// capability.
    fn set_active(&mut self, _active: bool) {}

    /// The engine's renderables in draw order, or `None` for engines that
    /// do not expose a collection.
    fn visualizers_mut(&mut self) -> Option<&mut [Box<dyn Renderable>]> {
        None
    }
}
