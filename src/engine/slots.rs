//! Engine lifecycle: one lazily filled slot per system.
//!
//! An engine is constructed at most once per system for the pool's
//! lifetime. Switching away deactivates it; switching back reactivates the
//! cached instance and rebinds its renderables. Only [`EngineSlots::dispose`]
//! actually releases engines.

use crate::engine::Engine;
use crate::errors::PoolError;
use crate::registry::SystemName;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

#[derive(Default)]
pub struct EngineSlots {
    slots: HashMap<SystemName, Box<dyn Engine>>,
}

impl EngineSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &SystemName) -> bool {
        self.slots.contains_key(name)
    }

    pub fn get_mut(&mut self, name: &SystemName) -> Option<&mut Box<dyn Engine>> {
        self.slots.get_mut(name)
    }

    /// Construct the engine for `name` and cache it. A factory failure is
    /// logged and leaves the slot empty; the next switch to `name` may try
    /// again with whatever factory it brings.
    pub async fn create<F, Fut>(
        &mut self,
        name: &SystemName,
        factory: F,
    ) -> Option<&mut Box<dyn Engine>>
    where
        F: FnOnce(&SystemName) -> Fut,
        Fut: Future<Output = anyhow::Result<Box<dyn Engine>>>,
    {
        match factory(name).await {
            Ok(engine) => {
                info!("{name} engine created");
                self.slots.insert(name.clone(), engine);
                self.slots.get_mut(name)
            }
            Err(source) => {
                let err = PoolError::EngineBuild {
                    system: name.to_string(),
                    source,
                };
                error!("{err}");
                None
            }
        }
    }

    /// Rebind every renderable of the cached engine for `name` against the
    /// current contexts. Waits out `settle` first; contexts created a
    /// moment ago are not reliably usable yet on some platforms. A failed
    /// rebind is logged per object and never aborts its siblings.
    pub async fn reinitialize_all(&mut self, name: &SystemName, settle: Duration) {
        tokio::time::sleep(settle).await;

        let Some(engine) = self.slots.get_mut(name) else {
            return;
        };
        let Some(visualizers) = engine.visualizers_mut() else {
            debug!("{name} engine exposes no renderable collection");
            return;
        };

        info!("reinitializing {} renderables for {name}", visualizers.len());
        for (index, renderable) in visualizers.iter_mut().enumerate() {
            match renderable.reinitialize_context() {
                Ok(true) => debug!("{name} renderable {index} rebound"),
                Ok(false) => warn!("{name} renderable {index} failed to rebind"),
                Err(err) => error!("{name} renderable {index} rebind error: {err:#}"),
            }
        }
    }

    /// Deactivate and release every cached engine, running the renderables'
    /// destroy hooks.
    pub fn dispose(&mut self) {
        for (name, mut engine) in self.slots.drain() {
            engine.set_active(false);
            if let Some(visualizers) = engine.visualizers_mut() {
                for renderable in visualizers.iter_mut() {
                    renderable.destroy();
                }
            }
            debug!("released {name} engine");
        }
    }
}
