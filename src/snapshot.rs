//! Point-in-time description of one device.
//!
//! [`DeviceSnapshot`] bundles everything the query side of this crate can learn
//! about a handle: identity, driver version, force-feedback capacity, and the
//! capability map. It is **owned** and serializable, so it can be logged, diffed
//! or shipped to a UI as JSON.
//!
//! # Semantics
//! - Identity and capabilities are mandatory: if either fails, capture fails.
//! - Driver version and effect count are best-effort and are `None` when the
//!   device refuses the query.
//! - Capturing does not read events and does not change device state.
//!
//! # Example
//! ```no_run
//! use evprobe::{DeviceSnapshot, ProbeConfig};
//!
//! let file = std::fs::File::open("/dev/input/event0")?;
//! let snap = DeviceSnapshot::capture(&file, &ProbeConfig::default())?;
//! println!("{}", snap.to_json()?);
//! # Ok::<(), evprobe::Error>(())
//! ```

use crate::capabilities::{probe_capabilities_with, CapabilityMap};
use crate::config::ProbeConfig;
use crate::device::DeviceHandle;
use crate::error::Result;
use crate::metadata::{read_driver_version, read_effect_count, read_identity, DeviceIdentity, DriverVersion};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub identity: DeviceIdentity,
    pub driver_version: Option<DriverVersion>,
    pub effect_count: Option<u32>,
    pub capabilities: CapabilityMap,
}

impl DeviceSnapshot {
    pub fn capture<H: DeviceHandle + ?Sized>(handle: &H, cfg: &ProbeConfig) -> Result<Self> {
        let identity = read_identity(handle)?;
        let driver_version = read_driver_version(handle)
            .inspect_err(|e| log::debug!("driver version unavailable: {e}"))
            .ok();
        let effect_count = read_effect_count(handle)
            .inspect_err(|e| log::debug!("effect count unavailable: {e}"))
            .ok();
        let capabilities = probe_capabilities_with(handle, cfg)?;

        log::debug!("captured {identity} with {} event type(s)", capabilities.len());
        Ok(Self {
            identity,
            driver_version,
            effect_count,
            capabilities,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
