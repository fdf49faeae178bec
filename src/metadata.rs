//! Device identity.
//!
//! [`DeviceIdentity`] is a lightweight, cloneable description of a device suitable
//! for display, logging, and persistence. It is read with one mandatory `input_id`
//! query, one mandatory name query, and two best-effort string queries.
//!
//! # Conventions
//! - `bus_type` is the kernel `BUS_*` constant; see [`bus_name`] for a label.
//! - `phys` is a topology path (e.g. `usb-0000:00:14.0-2/input0`). Many virtual and
//!   platform devices leave it empty.
//! - `uniq` is a firmware-supplied identifier. Some kernels report Bluetooth
//!   controller MACs here. It is usually empty.
//!
//! ## Persistence notes
//! - `vendor`/`product` and a non-empty `uniq` are generally stable and useful for
//!   re-identification.
//! - `phys` changes across ports and reconnects; treat it as diagnostic first,
//!   identity second.

use crate::device::{DeviceHandle, Query};
use crate::error::{Error, Result};
use crate::layout::{Builder, Cursor, INPUT_ID_SIZE, INT_SIZE};
use crate::names::bus_name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Buffer size for the name, phys and uniq string queries.
pub const NAME_BUF_LEN: usize = 256;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub bus_type: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
    /// Device name as reported by the driver.
    pub name: String,
    /// Physical topology path; empty if the device has none.
    pub phys: String,
    /// Unique identifier; empty if the device has none.
    pub uniq: String,
}

impl DeviceIdentity {
    /// Encode the `input_id` portion in kernel layout.
    pub(crate) fn id_reply(&self) -> Vec<u8> {
        let mut b = Builder::with_capacity(INPUT_ID_SIZE);
        b.write_u16(self.bus_type)
            .write_u16(self.vendor)
            .write_u16(self.product)
            .write_u16(self.version);
        b.into_inner()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", self.name)?;
        match bus_name(self.bus_type) {
            Some(bus) => write!(f, "bus={bus}")?,
            None => write!(f, "bus=0x{:02x}", self.bus_type)?,
        }
        write!(
            f,
            " vendor={:04x} product={:04x} version={:04x}",
            self.vendor, self.product, self.version
        )
    }
}

/// evdev protocol version reported by the driver, e.g. `1.0.1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriverVersion {
    pub major: u16,
    pub minor: u8,
    pub patch: u8,
}

impl DriverVersion {
    pub fn from_raw(raw: i32) -> Self {
        Self {
            major: ((raw >> 16) & 0xffff) as u16,
            minor: ((raw >> 8) & 0xff) as u8,
            patch: (raw & 0xff) as u8,
        }
    }

    pub fn to_raw(self) -> i32 {
        ((self.major as i32) << 16) | ((self.minor as i32) << 8) | self.patch as i32
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Read bus/vendor/product/version and the name, phys and uniq strings.
///
/// The `input_id` and name queries are mandatory. A failed phys or uniq query
/// leaves that field empty.
pub fn read_identity<H: DeviceHandle + ?Sized>(handle: &H) -> Result<DeviceIdentity> {
    let mut id = [0u8; INPUT_ID_SIZE];
    handle
        .query(Query::Id, &mut id)
        .map_err(|e| Error::query(Query::Id, e))?;
    let mut c = Cursor::new("input_id", &id);
    let bus_type = c.read_u16()?;
    let vendor = c.read_u16()?;
    let product = c.read_u16()?;
    let version = c.read_u16()?;

    let name = read_string(handle, Query::Name).map_err(|e| Error::query(Query::Name, e))?;
    let phys = read_optional_string(handle, Query::Phys);
    let uniq = read_optional_string(handle, Query::Uniq);

    Ok(DeviceIdentity {
        bus_type,
        vendor,
        product,
        version,
        name,
        phys,
        uniq,
    })
}

/// Read the evdev protocol version (mandatory query).
pub fn read_driver_version<H: DeviceHandle + ?Sized>(handle: &H) -> Result<DriverVersion> {
    read_int(handle, Query::DriverVersion, "driver version").map(DriverVersion::from_raw)
}

/// Read how many force-feedback effects the device can hold at once.
///
/// Devices without force feedback usually report 0.
pub fn read_effect_count<H: DeviceHandle + ?Sized>(handle: &H) -> Result<u32> {
    read_int(handle, Query::EffectCount, "effect count").map(|n| n.max(0) as u32)
}

fn read_int<H: DeviceHandle + ?Sized>(handle: &H, query: Query, what: &'static str) -> Result<i32> {
    let mut buf = [0u8; INT_SIZE];
    handle
        .query(query, &mut buf)
        .map_err(|e| Error::query(query, e))?;
    Ok(Cursor::new(what, &buf).read_i32()?)
}

fn read_string<H: DeviceHandle + ?Sized>(handle: &H, query: Query) -> std::io::Result<String> {
    let mut buf = [0u8; NAME_BUF_LEN];
    handle.query(query, &mut buf)?;
    Ok(c_string_lossy(&buf))
}

fn read_optional_string<H: DeviceHandle + ?Sized>(handle: &H, query: Query) -> String {
    read_string(handle, query).unwrap_or_else(|e| {
        log::debug!("{query} failed, leaving it empty: {e}");
        String::new()
    })
}

/// Text up to the first NUL, decoded lossily.
fn c_string_lossy(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_string_stops_at_nul() {
        assert_eq!(c_string_lossy(b"Mouse\0garbage"), "Mouse");
        assert_eq!(c_string_lossy(b"\0"), "");
        assert_eq!(c_string_lossy(b"no-nul"), "no-nul");
        assert_eq!(c_string_lossy(b"bad\xffutf8\0"), "bad\u{fffd}utf8");
    }

    #[test]
    fn driver_version_split() {
        let v = DriverVersion::from_raw(0x0001_0001);
        assert_eq!(v, DriverVersion { major: 1, minor: 0, patch: 1 });
        assert_eq!(v.to_string(), "1.0.1");
        assert_eq!(v.to_raw(), 0x0001_0001);
    }

    #[test]
    fn identity_display() {
        let id = DeviceIdentity {
            bus_type: 0x03,
            vendor: 0x046d,
            product: 0xc52b,
            version: 0x0111,
            name: "Logitech USB Receiver".into(),
            ..Default::default()
        };
        assert_eq!(
            id.to_string(),
            "\"Logitech USB Receiver\" bus=BUS_USB vendor=046d product=c52b version=0111"
        );

        let id = DeviceIdentity {
            bus_type: 0x7f,
            ..Default::default()
        };
        assert!(id.to_string().contains("bus=0x7f"));
    }
}
