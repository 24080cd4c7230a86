//! A bounded pool of graphics rendering contexts shared across several
//! mutually exclusive visual systems.
//!
//! Every system owns a fixed stack of named surfaces, but only the active
//! system has live graphics contexts at any time. [`ContextPool`] is the
//! state machine that tears down the outgoing system's contexts, shows the
//! incoming system's region, creates fresh contexts and hands back the
//! system's engine, constructing it lazily on first visit and rebinding its
//! renderables on every later visit.
//!
//! The rendering engines, the host UI and the graphics API itself are
//! collaborators behind traits ([`Engine`], [`HostPlatform`],
//! [`GraphicsContext`]); a headless in-memory host lives in
//! [`host::headless`] for tests and embedders without a real UI.

pub mod config;
pub mod contexts;
pub mod engine;
pub mod errors;
pub mod host;
pub mod pool;
pub mod registry;
pub mod visibility;

pub use config::{ContextApi, ContextOptions, PoolConfig, PowerPreference};
pub use engine::{Engine, Renderable};
pub use errors::PoolError;
pub use host::{DisplaySize, GraphicsContext, HostPlatform, RegionElement, SurfaceElement};
pub use pool::{ContextPool, PoolStats};
pub use registry::{SurfaceDescriptor, SurfaceRegistry, SurfaceRole, SystemEntry, SystemName};
