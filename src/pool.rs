//! The pool orchestrator: the public state machine coordinating region
//! visibility, context lifetimes and engine slots during a system switch.
//!
//! Only the active system holds live contexts; everything else is torn
//! down to 1×1 backing stores. Engines are constructed lazily on first
//! visit and kept for the pool's lifetime, so switching back to a system
//! reactivates its cached engine and rebinds its renderables instead of
//! rebuilding the world.

use crate::config::PoolConfig;
use crate::contexts::ContextManager;
use crate::engine::slots::EngineSlots;
use crate::engine::Engine;
use crate::errors::PoolError;
use crate::host::HostPlatform;
use crate::registry::{SurfaceRegistry, SystemName};
use crate::visibility::VisibilityController;
use log::{debug, error, info};
use std::future::Future;
use std::sync::Arc;

/// Snapshot of the pool for diagnostics overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStats {
    pub active_system: Option<SystemName>,
    pub active_contexts: usize,
    /// Most contexts that can ever be live at once.
    pub max_contexts: usize,
    /// Human-readable saving versus keeping every system live, e.g.
    /// `75% (20 → 5 contexts)`.
    pub reduction: String,
}

pub struct ContextPool {
    active_system: Option<SystemName>,
    registry: Arc<SurfaceRegistry>,
    config: Arc<PoolConfig>,
    slots: EngineSlots,
    contexts: ContextManager,
    visibility: VisibilityController,
}

impl ContextPool {
    pub fn new(
        host: Arc<dyn HostPlatform>,
        registry: SurfaceRegistry,
        config: PoolConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let config = Arc::new(config);
        info!(
            "context pool initialized - at most {} of {} contexts live",
            registry.max_system_surfaces(),
            registry.total_surfaces()
        );
        Self {
            active_system: None,
            contexts: ContextManager::new(host.clone(), registry.clone(), config.clone()),
            visibility: VisibilityController::new(host, registry.clone()),
            slots: EngineSlots::new(),
            registry,
            config,
        }
    }

    /// Pool over the stock registry with default configuration.
    pub fn with_defaults(host: Arc<dyn HostPlatform>) -> Self {
        Self::new(host, SurfaceRegistry::default(), PoolConfig::default())
    }

    /// Make `target` the active system and return its engine.
    ///
    /// The sequence is strict: hide everything, deactivate and tear down
    /// the outgoing system, show the target region, create the target's
    /// contexts, then resolve the engine. `factory` runs only when no
    /// engine is cached for `target`; a cached engine gets its renderables
    /// rebound instead, after the configured settle delay.
    ///
    /// Never returns an error: construction and per-surface failures are
    /// logged and the switch continues best-effort. `None` means no engine
    /// could be produced; the region and context switch still happened, and
    /// a later call may retry construction with a working factory.
    ///
    /// Switches must not overlap; `&mut self` makes an in-flight switch
    /// exclusive at compile time.
    pub async fn switch_to_system<F, Fut>(
        &mut self,
        target: &SystemName,
        factory: F,
    ) -> Option<&mut dyn Engine>
    where
        F: FnOnce(&SystemName) -> Fut,
        Fut: Future<Output = anyhow::Result<Box<dyn Engine>>>,
    {
        if !self.registry.contains(target) {
            error!("{}", PoolError::UnknownSystem(target.to_string()));
            return None;
        }

        // Re-entrant switch: the active system keeps its live contexts and
        // running engine, no teardown/recreate cycle. Falls through when
        // the slot is empty so a failed construction can be retried.
        if self.active_system.as_ref() == Some(target) && self.slots.contains(target) {
            debug!("{target} already active, reusing live contexts");
            return self.slots.get_mut(target).map(|e| e.as_mut() as &mut dyn Engine);
        }

        info!("switching to {target}");

        // Nothing may be visible while contexts are in flux.
        self.visibility.hide_all();

        // Deactivate the outgoing engine before its contexts go away, then
        // tear the contexts down. Teardown is synchronous: it completes
        // before the target region is shown.
        if let Some(outgoing) = self.active_system.take() {
            if outgoing != *target {
                if let Some(engine) = self.slots.get_mut(&outgoing) {
                    info!("deactivating {outgoing} engine");
                    engine.set_active(false);
                }
            }
            self.contexts.destroy_all(&outgoing);
        }

        // The region must be visible before contexts are created; hidden
        // regions yield zero-dimension contexts on some platforms.
        self.visibility.show(target);
        self.active_system = Some(target.clone());
        self.contexts.create_all(target);

        if self.slots.contains(target) {
            info!("reusing cached {target} engine");
            self.slots
                .reinitialize_all(target, self.config.settle_delay())
                .await;
        } else {
            info!("constructing {target} engine");
            let _ = self.slots.create(target, factory).await;
        }

        let engine = self.slots.get_mut(target)?;
        engine.set_active(true);
        info!("{target} system active");
        Some(engine.as_mut())
    }

    /// Engine cached for `name`, if it was ever constructed.
    pub fn engine_mut(&mut self, name: &SystemName) -> Option<&mut dyn Engine> {
        self.slots.get_mut(name).map(|e| e.as_mut() as &mut dyn Engine)
    }

    pub fn active_system(&self) -> Option<&SystemName> {
        self.active_system.as_ref()
    }

    /// Pre-create `name`'s contexts so a later switch is faster. Does not
    /// touch the active system or any engine.
    pub fn preload_system(&self, name: &SystemName) {
        if !self.registry.contains(name) {
            error!("{}", PoolError::UnknownSystem(name.to_string()));
            return;
        }
        info!("preloading contexts for {name}");
        self.contexts.create_all(name);
    }

    /// Surfaces of the active system with a live, non-lost context.
    pub fn active_context_count(&self) -> usize {
        match &self.active_system {
            Some(name) => self.contexts.active_count(name),
            None => 0,
        }
    }

    /// Tear down every system's contexts and release all cached engines.
    pub fn dispose(&mut self) {
        for name in self.registry.system_names() {
            self.contexts.destroy_all(name);
        }
        self.slots.dispose();
        self.active_system = None;
        info!("context pool disposed");
    }

    pub fn stats(&self) -> PoolStats {
        let total = self.registry.total_surfaces();
        let max = self.registry.max_system_surfaces();
        let saved_pct = if total > 0 {
            (total - max) * 100 / total
        } else {
            0
        };
        PoolStats {
            active_system: self.active_system.clone(),
            active_contexts: self.active_context_count(),
            max_contexts: max,
            reduction: format!("{saved_pct}% ({total} → {max} contexts)"),
        }
    }
}
