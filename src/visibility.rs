//! Visibility controller for the per-system region containers.

use crate::errors::PoolError;
use crate::host::HostPlatform;
use crate::registry::{SurfaceRegistry, SystemName};
use log::{debug, error};
use std::sync::Arc;

pub struct VisibilityController {
    host: Arc<dyn HostPlatform>,
    registry: Arc<SurfaceRegistry>,
}

impl VisibilityController {
    pub fn new(host: Arc<dyn HostPlatform>, registry: Arc<SurfaceRegistry>) -> Self {
        Self { host, registry }
    }

    /// Hide every registered region so nothing is visible while contexts
    /// are in flux.
    pub fn hide_all(&self) {
        for (_, entry) in self.registry.entries() {
            if let Some(region) = self.host.region(&entry.region_id) {
                region.set_shown(false);
            }
        }
        debug!("all system regions hidden");
    }

    /// Show only the region belonging to `name`. A missing region is an
    /// error for the log, not for the switch.
    pub fn show(&self, name: &SystemName) {
        let Some(region_id) = self.registry.region_id(name) else {
            return;
        };
        match self.host.region(region_id) {
            Some(region) => {
                region.set_shown(true);
                debug!("showing region container {region_id}");
            }
            None => error!("{}", PoolError::RegionNotFound(region_id.to_owned())),
        }
    }
}
