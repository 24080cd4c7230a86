//! Resource handle manager: creates and tears down the graphics contexts
//! behind one system's surface stack.

use crate::config::PoolConfig;
use crate::errors::PoolError;
use crate::host::{GraphicsContext, HostPlatform, SurfaceElement};
use crate::registry::{SurfaceDescriptor, SurfaceRegistry, SystemName};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub struct ContextManager {
    host: Arc<dyn HostPlatform>,
    registry: Arc<SurfaceRegistry>,
    config: Arc<PoolConfig>,
}

impl ContextManager {
    pub fn new(
        host: Arc<dyn HostPlatform>,
        registry: Arc<SurfaceRegistry>,
        config: Arc<PoolConfig>,
    ) -> Self {
        Self {
            host,
            registry,
            config,
        }
    }

    /// Size every surface of `name` and acquire a context on it. Failures
    /// are logged per surface and never abort the rest of the batch.
    pub fn create_all(&self, name: &SystemName) {
        let Some(entry) = self.registry.entry(name) else {
            return;
        };
        info!("creating {} contexts for {name}", entry.surfaces.len());

        // A hidden container yields zero-dimension or invalid contexts on
        // some platforms, so force the region visible first.
        if let Some(region) = self.host.region(&entry.region_id) {
            if !region.is_shown() {
                debug!("making {} visible for context creation", entry.region_id);
                region.set_shown(true);
            }
        }

        let dpr = self.clamped_device_pixel_ratio();
        for descriptor in &entry.surfaces {
            match self.create_one(descriptor, dpr) {
                Ok(()) => {}
                Err(err @ (PoolError::SurfaceNotFound(_) | PoolError::Validation { .. })) => {
                    warn!("{err}");
                }
                Err(err) => error!("{err}"),
            }
        }
    }

    /// Release the backing memory of `name`'s surfaces by shrinking them to
    /// 1×1. The underlying context handle is deliberately NOT invalidated:
    /// explicitly losing a context permanently breaks the surface element
    /// on some platforms, and the element must stay reusable for the next
    /// switch back to this system.
    pub fn destroy_all(&self, name: &SystemName) {
        let Some(surfaces) = self.registry.surfaces(name) else {
            return;
        };
        info!("releasing {} contexts for {name}", surfaces.len());
        for descriptor in surfaces {
            if let Some(surface) = self.host.surface(&descriptor.id) {
                surface.set_backing_size(1, 1);
                debug!("released context backing for {}", descriptor.id);
            }
        }
    }

    /// Surfaces of `name` with a live, non-lost context.
    pub fn active_count(&self, name: &SystemName) -> usize {
        let Some(surfaces) = self.registry.surfaces(name) else {
            return 0;
        };
        surfaces
            .iter()
            .filter_map(|descriptor| self.host.surface(&descriptor.id))
            .filter_map(|surface| self.acquire(surface.as_ref()))
            .filter(|ctx| !ctx.is_lost())
            .count()
    }

    fn create_one(&self, descriptor: &SurfaceDescriptor, dpr: f64) -> Result<(), PoolError> {
        let surface = self
            .host
            .surface(&descriptor.id)
            .ok_or_else(|| PoolError::SurfaceNotFound(descriptor.id.clone()))?;

        let size = surface.display_size();
        let width = (size.width * dpr).round() as u32;
        let height = (size.height * dpr).round() as u32;
        surface.set_backing_size(width, height);

        let ctx = self
            .acquire(surface.as_ref())
            .ok_or_else(|| PoolError::ContextUnavailable(descriptor.id.clone()))?;
        if ctx.is_lost() {
            return Err(PoolError::ContextLost(descriptor.id.clone()));
        }
        ctx.probe().map_err(|err| PoolError::Validation {
            id: descriptor.id.clone(),
            reason: format!("{err:#}"),
        })?;

        debug!(
            "created context {} ({width}x{height}) - {}",
            descriptor.id,
            ctx.version()
        );
        Ok(())
    }

    /// Walk the API preference list until one version yields a context.
    fn acquire(&self, surface: &dyn SurfaceElement) -> Option<Arc<dyn GraphicsContext>> {
        let options = &self.config.context_options;
        options
            .api_preference
            .iter()
            .find_map(|api| surface.context(*api, options))
    }

    fn clamped_device_pixel_ratio(&self) -> f64 {
        let dpr = self.host.device_pixel_ratio();
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        dpr.min(self.config.max_device_pixel_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextApi;
    use crate::host::headless::HeadlessHost;
    use crate::host::RegionElement;

    fn manager(host: Arc<HeadlessHost>) -> ContextManager {
        ContextManager::new(
            host,
            Arc::new(SurfaceRegistry::default()),
            Arc::new(PoolConfig::default()),
        )
    }

    #[test]
    fn create_all_sizes_backing_stores_with_clamped_dpr() {
        let registry = SurfaceRegistry::default();
        // Display density 3, clamp ceiling 2.
        let host = Arc::new(HeadlessHost::for_registry(&registry, 800.0, 600.0, 3.0));
        let contexts = manager(host.clone());
        let faceted = SystemName::from("faceted");

        contexts.create_all(&faceted);

        let surface = host.headless_surface("content-canvas").unwrap();
        assert_eq!(surface.backing_size(), (1600, 1200));
        assert!(surface.current_context().is_some());
        assert_eq!(contexts.active_count(&faceted), 5);
    }

    #[test]
    fn destroy_all_shrinks_but_never_loses_contexts() {
        let registry = SurfaceRegistry::default();
        let host = Arc::new(HeadlessHost::for_registry(&registry, 800.0, 600.0, 1.0));
        let contexts = manager(host.clone());
        let faceted = SystemName::from("faceted");

        contexts.create_all(&faceted);
        contexts.destroy_all(&faceted);

        let surface = host.headless_surface("shadow-canvas").unwrap();
        assert_eq!(surface.backing_size(), (1, 1));
        // The handle survives teardown; the element stays reusable.
        assert!(!surface.current_context().unwrap().is_lost());

        // Switching back recreates on the same elements.
        contexts.create_all(&faceted);
        assert_eq!(surface.backing_size(), (800, 600));
    }

    #[test]
    fn acquisition_falls_back_through_the_api_preference_list() {
        let registry = SurfaceRegistry::default();
        let host = Arc::new(HeadlessHost::for_registry(&registry, 320.0, 240.0, 1.0));
        let surface = host.headless_surface("accent-canvas").unwrap();
        surface.restrict_apis(vec![ContextApi::WebGl]);

        let contexts = manager(host.clone());
        contexts.create_all(&SystemName::from("faceted"));

        assert_eq!(
            surface.current_context().unwrap().version(),
            "headless WebGl"
        );
    }

    #[test]
    fn per_surface_failures_do_not_abort_the_batch() {
        let registry = SurfaceRegistry::default();
        let host = Arc::new(HeadlessHost::for_registry(&registry, 640.0, 480.0, 1.0));
        host.remove_surface("background-canvas");
        host.headless_surface("shadow-canvas")
            .unwrap()
            .set_deny_context(true);
        host.headless_surface("highlight-canvas")
            .unwrap()
            .set_fail_probe(true);

        let contexts = manager(host.clone());
        let faceted = SystemName::from("faceted");
        contexts.create_all(&faceted);

        // The healthy surfaces still got contexts.
        assert!(host
            .headless_surface("content-canvas")
            .unwrap()
            .current_context()
            .is_some());
        assert!(host
            .headless_surface("accent-canvas")
            .unwrap()
            .current_context()
            .is_some());
        // Probe failure is logged but the context exists and counts as live.
        assert_eq!(contexts.active_count(&faceted), 3);
    }

    #[test]
    fn create_all_forces_the_region_visible_first() {
        let registry = SurfaceRegistry::default();
        let host = Arc::new(HeadlessHost::for_registry(&registry, 640.0, 480.0, 1.0));
        let region = host.headless_region("quantumLayers").unwrap();
        assert!(!region.is_shown());

        manager(host.clone()).create_all(&SystemName::from("quantum"));
        assert!(region.is_shown());
    }

    #[test]
    fn lost_contexts_are_excluded_from_the_active_count() {
        let registry = SurfaceRegistry::default();
        let host = Arc::new(HeadlessHost::for_registry(&registry, 640.0, 480.0, 1.0));
        let contexts = manager(host.clone());
        let quantum = SystemName::from("quantum");
        contexts.create_all(&quantum);

        host.headless_surface("quantum-content-canvas")
            .unwrap()
            .current_context()
            .unwrap()
            .force_lose();

        assert_eq!(contexts.active_count(&quantum), 4);
    }
}
