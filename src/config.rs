use serde::Deserialize;
use std::time::Duration;

/// Graphics API versions a surface can be asked for, newest first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextApi {
    WebGl2,
    WebGl,
    ExperimentalWebGl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    #[default]
    Default,
    LowPower,
    HighPerformance,
}

/// Capability configuration used for every acquired context.
///
/// One shared option set for all systems, so switching never changes how
/// surfaces blend. The defaults are tuned for mobile consistency: no
/// antialiasing, premultiplied alpha, and tolerance of performance caveats
/// so low-end devices still get a context.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
    pub alpha: bool,
    pub depth: bool,
    pub stencil: bool,
    pub antialias: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
    pub power_preference: PowerPreference,
    pub fail_if_major_performance_caveat: bool,
    /// API versions to try, in order, until one yields a context.
    pub api_preference: Vec<ContextApi>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            alpha: true,
            depth: true,
            stencil: false,
            antialias: false,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            power_preference: PowerPreference::HighPerformance,
            fail_if_major_performance_caveat: false,
            api_preference: vec![
                ContextApi::WebGl2,
                ContextApi::WebGl,
                ContextApi::ExperimentalWebGl,
            ],
        }
    }
}

/// Pool-wide configuration. All fields have working defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Ceiling for the device pixel ratio when sizing surface backing
    /// stores. Bounds memory and fill rate on high-density displays.
    pub max_device_pixel_ratio: f64,
    /// How long to wait after context creation before rebinding a reused
    /// engine's renderables. Empirical workaround: rebinding immediately
    /// after creation fails on some platforms.
    pub settle_delay_ms: u64,
    pub context_options: ContextOptions,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_device_pixel_ratio: 2.0,
            settle_delay_ms: 100,
            context_options: ContextOptions::default(),
        }
    }
}

impl PoolConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
