//! Capability discovery.
//!
//! [`probe_capabilities`] asks the kernel which event types a device supports,
//! then which codes it supports under each type, then (for absolute axes only)
//! the calibration data of each axis. The result is a [`CapabilityMap`]:
//!
//! ```text
//! { 1: [272, 273, 274], 2: [0, 1, 8], 3: [(0, AxisInfo { .. }), (1, AxisInfo { .. })] }
//! ```
//!
//! ## Failure policy
//! Only the type-level query is mandatory. A failed code-level query leaves that
//! type's list empty; a failed axis query yields an all-zero [`AxisInfo`]. Either
//! way the probe continues. Every query is issued exactly once.
//!
//! ## Key presence
//! A type appears in the map whenever its type-level bit is set, even if its code
//! list ends up empty.

use crate::config::ProbeConfig;
use crate::device::{DeviceHandle, Query};
use crate::error::{DecodeError, Error, Result};
use crate::event::EV_ABS;
use crate::layout::{Builder, Cursor, ABSINFO_SIZE};
use crate::names::event_type_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Test bit `bit` of a kernel bitmask.
///
/// Masks are byte-major with the least significant bit first inside each byte:
/// bit 0 is `mask[0] & 0x01`, bit 7 is `mask[0] & 0x80`, bit 8 is `mask[1] & 0x01`.
/// Bits past the end of `mask` read as unset.
#[inline]
pub fn test_bit(mask: &[u8], bit: usize) -> bool {
    mask.get(bit / 8)
        .is_some_and(|byte| (byte >> (bit % 8)) & 1 == 1)
}

/// Ascending positions of the set bits among the first `count` bits of `mask`.
pub fn set_bits(mask: &[u8], count: u16) -> impl Iterator<Item = u16> + '_ {
    (0..count).filter(move |&bit| test_bit(mask, bit as usize))
}

/// Calibration data of one absolute axis (`struct input_absinfo`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisInfo {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    /// Noise threshold.
    pub fuzz: i32,
    /// Dead zone.
    pub flat: i32,
    /// Units per millimetre (or per radian for rotational axes).
    pub resolution: i32,
}

impl AxisInfo {
    pub fn new(value: i32, minimum: i32, maximum: i32, fuzz: i32, flat: i32, resolution: i32) -> Self {
        Self {
            value,
            minimum,
            maximum,
            fuzz,
            flat,
            resolution,
        }
    }

    pub(crate) fn from_reply(buf: &[u8]) -> std::result::Result<Self, DecodeError> {
        let mut c = Cursor::new("input_absinfo", buf);
        Ok(Self {
            value: c.read_i32()?,
            minimum: c.read_i32()?,
            maximum: c.read_i32()?,
            fuzz: c.read_i32()?,
            flat: c.read_i32()?,
            resolution: c.read_i32()?,
        })
    }

    pub(crate) fn to_reply(self) -> Vec<u8> {
        let mut b = Builder::with_capacity(ABSINFO_SIZE);
        b.write_i32(self.value)
            .write_i32(self.minimum)
            .write_i32(self.maximum)
            .write_i32(self.fuzz)
            .write_i32(self.flat)
            .write_i32(self.resolution);
        b.into_inner()
    }
}

/// One supported code under an event type.
///
/// Absolute-position codes carry their [`AxisInfo`]; every other type carries
/// the bare code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeEntry {
    Code(u16),
    Axis(u16, AxisInfo),
}

impl CodeEntry {
    #[inline]
    pub fn code(&self) -> u16 {
        match *self {
            CodeEntry::Code(code) | CodeEntry::Axis(code, _) => code,
        }
    }

    #[inline]
    pub fn axis_info(&self) -> Option<&AxisInfo> {
        match self {
            CodeEntry::Axis(_, info) => Some(info),
            CodeEntry::Code(_) => None,
        }
    }
}

/// Supported event types mapped to their supported codes.
///
/// Iteration is in ascending type order; each list is in ascending code order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityMap(BTreeMap<u16, Vec<CodeEntry>>);

impl CapabilityMap {
    /// Entries for `event_type`, or `None` if its type bit was not set.
    #[inline]
    pub fn get(&self, event_type: u16) -> Option<&[CodeEntry]> {
        self.0.get(&event_type).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains_type(&self, event_type: u16) -> bool {
        self.0.contains_key(&event_type)
    }

    /// Whether `code` is listed under `event_type`.
    pub fn supports(&self, event_type: u16, code: u16) -> bool {
        self.get(event_type)
            .is_some_and(|entries| entries.iter().any(|e| e.code() == code))
    }

    /// Supported event types, ascending.
    pub fn types(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.keys().copied()
    }

    /// Supported codes under `event_type`, ascending; empty if the type is absent.
    pub fn codes(&self, event_type: u16) -> impl Iterator<Item = u16> + '_ {
        self.get(event_type)
            .unwrap_or_default()
            .iter()
            .map(CodeEntry::code)
    }

    /// Calibration data for absolute axis `code`.
    pub fn axis_info(&self, code: u16) -> Option<&AxisInfo> {
        self.get(EV_ABS)?
            .iter()
            .find(|e| e.code() == code)
            .and_then(CodeEntry::axis_info)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u16, &[CodeEntry])> {
        self.0.iter().map(|(ty, entries)| (*ty, entries.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn into_inner(self) -> BTreeMap<u16, Vec<CodeEntry>> {
        self.0
    }
}

impl FromIterator<(u16, Vec<CodeEntry>)> for CapabilityMap {
    fn from_iter<I: IntoIterator<Item = (u16, Vec<CodeEntry>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CapabilityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ty, entries) in self.iter() {
            match event_type_name(ty) {
                Some(name) => write!(f, "{name} ({ty}):")?,
                None => write!(f, "type {ty}:")?,
            }
            for entry in entries {
                match entry {
                    CodeEntry::Code(code) => write!(f, " {code}")?,
                    CodeEntry::Axis(code, a) => write!(
                        f,
                        " {code}[{} {}..{} fuzz={} flat={} res={}]",
                        a.value, a.minimum, a.maximum, a.fuzz, a.flat, a.resolution
                    )?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Probe with the default kernel maxima.
pub fn probe_capabilities<H: DeviceHandle + ?Sized>(handle: &H) -> Result<CapabilityMap> {
    probe_capabilities_with(handle, &ProbeConfig::default())
}

/// Build the capability map of `handle`.
///
/// Fails only if the type-level bitmask query fails.
pub fn probe_capabilities_with<H: DeviceHandle + ?Sized>(
    handle: &H,
    cfg: &ProbeConfig,
) -> Result<CapabilityMap> {
    let mut type_bits = vec![0u8; cfg.type_mask_len()];
    handle
        .query(Query::EventTypes, &mut type_bits)
        .map_err(|e| Error::query(Query::EventTypes, e))?;

    let mut map = BTreeMap::new();
    let mut code_bits = vec![0u8; cfg.code_mask_len()];

    for ty in set_bits(&type_bits, cfg.event_type_count) {
        let entries: &mut Vec<CodeEntry> = map.entry(ty).or_default();

        code_bits.fill(0);
        if let Err(e) = handle.query(Query::EventCodes(ty), &mut code_bits) {
            log::debug!("{} failed, leaving type {ty} empty: {e}", Query::EventCodes(ty));
            continue;
        }

        for code in set_bits(&code_bits, cfg.event_code_count) {
            if ty == EV_ABS {
                entries.push(CodeEntry::Axis(code, read_axis_info(handle, code)));
            } else {
                entries.push(CodeEntry::Code(code));
            }
        }
    }

    let map = CapabilityMap(map);
    log::debug!(
        "probed {} event type(s), {} code(s)",
        map.len(),
        map.iter().map(|(_, e)| e.len()).sum::<usize>()
    );
    Ok(map)
}

/// Best-effort `EVIOCGABS`; any failure yields all zeros.
fn read_axis_info<H: DeviceHandle + ?Sized>(handle: &H, code: u16) -> AxisInfo {
    let query = Query::AbsInfo(code);
    let mut buf = [0u8; ABSINFO_SIZE];
    if let Err(e) = handle.query(query, &mut buf) {
        log::debug!("{query} failed, using zeroed axis info: {e}");
        return AxisInfo::default();
    }
    // `buf` is exactly one `input_absinfo`, so decoding cannot come up short.
    AxisInfo::from_reply(&buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_order_is_lsb_first_byte_major() {
        let mask = [0b1000_0001u8, 0b0000_0001];
        assert!(test_bit(&mask, 0));
        assert!(!test_bit(&mask, 1));
        assert!(test_bit(&mask, 7));
        assert!(test_bit(&mask, 8));
        assert!(!test_bit(&mask, 9));
    }

    #[test]
    fn bits_past_mask_are_unset() {
        assert!(!test_bit(&[0xFF], 8));
        assert!(!test_bit(&[], 0));
    }

    #[test]
    fn set_bits_respects_count() {
        let mask = [0xFFu8, 0x01];
        assert_eq!(set_bits(&mask, 9).collect::<Vec<_>>(), (0..9).collect::<Vec<_>>());
        assert_eq!(set_bits(&mask, 3).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn axis_info_reply_layout() -> std::result::Result<(), DecodeError> {
        let info = AxisInfo::new(512, 0, 1023, 4, 8, 0);
        let reply = info.to_reply();
        assert_eq!(reply.len(), ABSINFO_SIZE);
        assert_eq!(&reply[4..8], &0i32.to_ne_bytes());
        assert_eq!(&reply[8..12], &1023i32.to_ne_bytes());
        assert_eq!(AxisInfo::from_reply(&reply)?, info);
        Ok(())
    }

    #[test]
    fn map_accessors() {
        let map: CapabilityMap = [
            (1, vec![CodeEntry::Code(30), CodeEntry::Code(31)]),
            (3, vec![CodeEntry::Axis(0, AxisInfo::new(1, -5, 5, 0, 0, 0))]),
            (5, vec![]),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.types().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert!(map.supports(1, 31));
        assert!(!map.supports(1, 32));
        assert!(map.contains_type(5));
        assert_eq!(map.codes(5).count(), 0);
        assert_eq!(map.codes(9).count(), 0);
        assert_eq!(map.axis_info(0).map(|a| a.minimum), Some(-5));
        assert_eq!(map.axis_info(1), None);
    }

    #[test]
    fn display_names_known_types() {
        let map: CapabilityMap = [(1, vec![CodeEntry::Code(2)]), (0x1e, vec![])]
            .into_iter()
            .collect();
        assert_eq!(map.to_string(), "EV_KEY (1): 2\ntype 30:\n");
    }
}
