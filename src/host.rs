//! Host UI abstraction: addressable surface elements and region containers.
//!
//! The pool never talks to a concrete windowing or DOM layer; everything it
//! needs from the host is behind these traits. [`headless`] provides an
//! in-memory implementation.

pub mod headless;

use crate::config::{ContextApi, ContextOptions};
use std::sync::Arc;

/// Displayed dimensions of an element as laid out by the host, before
/// device-pixel scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

/// An acquired graphics context bound to one surface element.
pub trait GraphicsContext: Send + Sync {
    /// True once the platform has lost the underlying context.
    fn is_lost(&self) -> bool;

    /// Version string of the backing API, for logging.
    fn version(&self) -> String;

    /// Construct and discard a trivial sub-resource (a shader) to confirm
    /// the context can actually allocate.
    fn probe(&self) -> anyhow::Result<()>;
}

/// A drawable element the host addresses by id.
pub trait SurfaceElement: Send + Sync {
    fn display_size(&self) -> DisplaySize;

    /// Resize the backing store, in physical pixels.
    fn set_backing_size(&self, width: u32, height: u32);

    /// Acquire a context for `api`, or return the one already acquired on
    /// this element. `None` when the host cannot provide that API version.
    fn context(
        &self,
        api: ContextApi,
        options: &ContextOptions,
    ) -> Option<Arc<dyn GraphicsContext>>;
}

/// Container region holding one system's surfaces.
pub trait RegionElement: Send + Sync {
    /// Flip display, visibility and opacity together.
    fn set_shown(&self, shown: bool);

    fn is_shown(&self) -> bool;
}

/// The host UI itself: element lookup plus display density.
pub trait HostPlatform: Send + Sync {
    fn surface(&self, id: &str) -> Option<Arc<dyn SurfaceElement>>;

    fn region(&self, id: &str) -> Option<Arc<dyn RegionElement>>;

    fn device_pixel_ratio(&self) -> f64;
}
