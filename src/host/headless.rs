//! In-memory host that performs no rendering.
//!
//! Serves the same purpose as a null backend: tests and embedders without a
//! real UI get a fully functional [`HostPlatform`] that records every
//! mutation the pool performs, and can be scripted to fail in the ways real
//! platforms do (missing elements, unobtainable contexts, immediate context
//! loss, probe failures).

use crate::config::{ContextApi, ContextOptions};
use crate::host::{DisplaySize, GraphicsContext, HostPlatform, RegionElement, SurfaceElement};
use crate::registry::SurfaceRegistry;
use anyhow::bail;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct HeadlessContext {
    api: ContextApi,
    lost: AtomicBool,
    fail_probe: AtomicBool,
}

impl HeadlessContext {
    fn new(api: ContextApi, fail_probe: bool) -> Self {
        Self {
            api,
            lost: AtomicBool::new(false),
            fail_probe: AtomicBool::new(fail_probe),
        }
    }

    /// Simulate the platform losing this context.
    pub fn force_lose(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }
}

impl GraphicsContext for HeadlessContext {
    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    fn version(&self) -> String {
        format!("headless {:?}", self.api)
    }

    fn probe(&self) -> anyhow::Result<()> {
        if self.fail_probe.load(Ordering::SeqCst) {
            bail!("shader allocation refused");
        }
        Ok(())
    }
}

pub struct HeadlessSurface {
    display: DisplaySize,
    backing: Mutex<(u32, u32)>,
    context: Mutex<Option<Arc<HeadlessContext>>>,
    /// API versions this surface will answer for.
    supported: Mutex<Vec<ContextApi>>,
    deny_context: AtomicBool,
    fail_probe: AtomicBool,
    lose_on_create: AtomicBool,
    context_requests: AtomicUsize,
    resizes: AtomicUsize,
}

impl HeadlessSurface {
    fn new(width: f64, height: f64) -> Self {
        Self {
            display: DisplaySize { width, height },
            backing: Mutex::new((0, 0)),
            context: Mutex::new(None),
            supported: Mutex::new(vec![
                ContextApi::WebGl2,
                ContextApi::WebGl,
                ContextApi::ExperimentalWebGl,
            ]),
            deny_context: AtomicBool::new(false),
            fail_probe: AtomicBool::new(false),
            lose_on_create: AtomicBool::new(false),
            context_requests: AtomicUsize::new(0),
            resizes: AtomicUsize::new(0),
        }
    }

    pub fn backing_size(&self) -> (u32, u32) {
        *self.backing.lock().unwrap()
    }

    /// How many times `set_backing_size` has been called.
    pub fn resizes(&self) -> usize {
        self.resizes.load(Ordering::SeqCst)
    }

    /// How many times a context has been requested, cached or not.
    pub fn context_requests(&self) -> usize {
        self.context_requests.load(Ordering::SeqCst)
    }

    pub fn current_context(&self) -> Option<Arc<HeadlessContext>> {
        self.context.lock().unwrap().clone()
    }

    pub fn restrict_apis(&self, apis: Vec<ContextApi>) {
        *self.supported.lock().unwrap() = apis;
    }

    pub fn set_deny_context(&self, deny: bool) {
        self.deny_context.store(deny, Ordering::SeqCst);
    }

    pub fn set_fail_probe(&self, fail: bool) {
        self.fail_probe.store(fail, Ordering::SeqCst);
    }

    /// Next created context reports itself lost immediately.
    pub fn set_lose_on_create(&self, lose: bool) {
        self.lose_on_create.store(lose, Ordering::SeqCst);
    }
}

impl SurfaceElement for HeadlessSurface {
    fn display_size(&self) -> DisplaySize {
        self.display
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        *self.backing.lock().unwrap() = (width, height);
    }

    fn context(
        &self,
        api: ContextApi,
        _options: &ContextOptions,
    ) -> Option<Arc<dyn GraphicsContext>> {
        self.context_requests.fetch_add(1, Ordering::SeqCst);

        // Like the DOM: once a context exists it is returned for any
        // compatible request, options ignored.
        let mut slot = self.context.lock().unwrap();
        if let Some(existing) = slot.as_ref() {
            return Some(existing.clone() as Arc<dyn GraphicsContext>);
        }

        if self.deny_context.load(Ordering::SeqCst) {
            return None;
        }
        if !self.supported.lock().unwrap().contains(&api) {
            return None;
        }

        let ctx = Arc::new(HeadlessContext::new(
            api,
            self.fail_probe.load(Ordering::SeqCst),
        ));
        if self.lose_on_create.load(Ordering::SeqCst) {
            ctx.force_lose();
        }
        *slot = Some(ctx.clone());
        Some(ctx)
    }
}

#[derive(Default)]
pub struct HeadlessRegion {
    shown: AtomicBool,
}

impl RegionElement for HeadlessRegion {
    fn set_shown(&self, shown: bool) {
        self.shown.store(shown, Ordering::SeqCst);
    }

    fn is_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }
}

/// Host with a fixed set of surfaces and regions, addressable by id.
pub struct HeadlessHost {
    surfaces: Mutex<HashMap<String, Arc<HeadlessSurface>>>,
    regions: Mutex<HashMap<String, Arc<HeadlessRegion>>>,
    device_pixel_ratio: f64,
}

impl HeadlessHost {
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            surfaces: Mutex::new(HashMap::new()),
            regions: Mutex::new(HashMap::new()),
            device_pixel_ratio,
        }
    }

    /// Host populated with every surface and region a registry names, all
    /// surfaces laid out at `width` × `height`.
    pub fn for_registry(
        registry: &SurfaceRegistry,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
    ) -> Self {
        let host = Self::new(device_pixel_ratio);
        for (_, entry) in registry.entries() {
            host.add_region(&entry.region_id);
            for surface in &entry.surfaces {
                host.add_surface(&surface.id, width, height);
            }
        }
        host
    }

    pub fn add_surface(&self, id: &str, width: f64, height: f64) -> Arc<HeadlessSurface> {
        let surface = Arc::new(HeadlessSurface::new(width, height));
        self.surfaces
            .lock()
            .unwrap()
            .insert(id.to_owned(), surface.clone());
        surface
    }

    pub fn add_region(&self, id: &str) -> Arc<HeadlessRegion> {
        let region = Arc::new(HeadlessRegion::default());
        self.regions
            .lock()
            .unwrap()
            .insert(id.to_owned(), region.clone());
        region
    }

    pub fn remove_surface(&self, id: &str) {
        self.surfaces.lock().unwrap().remove(id);
    }

    /// Concrete surface handle, for assertions.
    pub fn headless_surface(&self, id: &str) -> Option<Arc<HeadlessSurface>> {
        self.surfaces.lock().unwrap().get(id).cloned()
    }

    /// Concrete region handle, for assertions.
    pub fn headless_region(&self, id: &str) -> Option<Arc<HeadlessRegion>> {
        self.regions.lock().unwrap().get(id).cloned()
    }
}

impl HostPlatform for HeadlessHost {
    fn surface(&self, id: &str) -> Option<Arc<dyn SurfaceElement>> {
        self.surfaces
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .map(|s| s as Arc<dyn SurfaceElement>)
    }

    fn region(&self, id: &str) -> Option<Arc<dyn RegionElement>> {
        self.regions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .map(|r| r as Arc<dyn RegionElement>)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_caches_its_context_across_requests() {
        let host = HeadlessHost::new(1.0);
        let surface = host.add_surface("content-canvas", 640.0, 480.0);

        let opts = ContextOptions::default();
        let first = surface.context(ContextApi::WebGl2, &opts).unwrap();
        let second = surface.context(ContextApi::WebGl, &opts).unwrap();
        assert!(!first.is_lost());
        assert_eq!(surface.context_requests(), 2);
        // The first acquisition wins; later requests get the same context
        // regardless of the API they asked for.
        assert_eq!(second.version(), "headless WebGl2");
    }

    #[test]
    fn scripted_failures_are_observable() {
        let host = HeadlessHost::new(1.0);
        let surface = host.add_surface("content-canvas", 640.0, 480.0);
        let opts = ContextOptions::default();

        surface.set_deny_context(true);
        assert!(surface.context(ContextApi::WebGl2, &opts).is_none());

        surface.set_deny_context(false);
        surface.set_lose_on_create(true);
        let ctx = surface.context(ContextApi::WebGl2, &opts).unwrap();
        assert!(ctx.is_lost());
    }

    #[test]
    fn restricted_surface_only_answers_supported_apis() {
        let host = HeadlessHost::new(1.0);
        let surface = host.add_surface("content-canvas", 640.0, 480.0);
        surface.restrict_apis(vec![ContextApi::WebGl]);

        let opts = ContextOptions::default();
        assert!(surface.context(ContextApi::WebGl2, &opts).is_none());
        assert!(surface.context(ContextApi::WebGl, &opts).is_some());
    }
}
