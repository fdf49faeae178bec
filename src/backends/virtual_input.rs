//! In-memory device handle.
//!
//! [`VirtualDevice`] answers every [`Query`] from programmable state (bitmasks,
//! axis calibration, identity strings) and serves reads from a queue of byte
//! chunks. Any query can be made to fail. It keeps a log of the queries it
//! received, so callers can check how often each was issued.
//!
//! Answers follow the kernel's conventions:
//! - bitmask and string replies are truncated to the caller's buffer;
//! - strings are NUL-terminated, and an unset phys/uniq fails with `NotFound`;
//! - `EventCodes(0)` returns the type-level mask unless one was set explicitly;
//! - a read with nothing queued fails with `WouldBlock`, like a non-blocking node.

use crate::capabilities::AxisInfo;
use crate::device::{DeviceHandle, Query};
use crate::event::{EventRecord, EV_ABS, EV_SYN};
use crate::layout::{ABSINFO_SIZE, INPUT_ID_SIZE, INT_SIZE};
use crate::metadata::{DeviceIdentity, DriverVersion};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::io;
use std::sync::Mutex;

#[derive(Debug)]
enum ReadStep {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

#[derive(Debug)]
pub struct VirtualDevice {
    bus_type: u16,
    vendor: u16,
    product: u16,
    version: u16,
    name: String,
    phys: Option<String>,
    uniq: Option<String>,
    driver_version: DriverVersion,
    effect_count: i32,
    type_mask: Vec<u8>,
    code_masks: BTreeMap<u16, Vec<u8>>,
    axes: BTreeMap<u16, AxisInfo>,
    failing: HashSet<Query>,
    reads: Mutex<VecDeque<ReadStep>>,
    log: Mutex<Vec<Query>>,
}

fn set_bit(mask: &mut Vec<u8>, bit: u16) {
    let byte = bit as usize / 8;
    if mask.len() <= byte {
        mask.resize(byte + 1, 0);
    }
    mask[byte] |= 1 << (bit % 8);
}

/// Copy as much of `src` as fits; returns the byte count.
fn copy_reply(src: &[u8], buf: &mut [u8]) -> usize {
    let n = src.len().min(buf.len());
    buf[..n].copy_from_slice(&src[..n]);
    n
}

fn fixed_reply(query: Query, src: &[u8], buf: &mut [u8], size: usize) -> io::Result<usize> {
    if buf.len() != size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{query} needs a {size}-byte buffer, got {}", buf.len()),
        ));
    }
    buf.copy_from_slice(src);
    Ok(0)
}

fn string_reply(s: &str, buf: &mut [u8]) -> usize {
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    copy_reply(&bytes, buf)
}

impl VirtualDevice {
    /// A device with the given name, evdev version 1.0.1, and no capabilities.
    pub fn new(name: &str) -> Self {
        Self {
            bus_type: 0x06,
            vendor: 0,
            product: 0,
            version: 0,
            name: name.to_string(),
            phys: None,
            uniq: None,
            driver_version: DriverVersion::from_raw(0x0001_0001),
            effect_count: 0,
            type_mask: Vec::new(),
            code_masks: BTreeMap::new(),
            axes: BTreeMap::new(),
            failing: HashSet::new(),
            reads: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_id(mut self, bus_type: u16, vendor: u16, product: u16, version: u16) -> Self {
        self.bus_type = bus_type;
        self.vendor = vendor;
        self.product = product;
        self.version = version;
        self
    }

    pub fn with_phys(mut self, phys: &str) -> Self {
        self.phys = Some(phys.to_string());
        self
    }

    pub fn with_uniq(mut self, uniq: &str) -> Self {
        self.uniq = Some(uniq.to_string());
        self
    }

    pub fn with_driver_version(mut self, version: DriverVersion) -> Self {
        self.driver_version = version;
        self
    }

    pub fn with_effect_count(mut self, count: u32) -> Self {
        self.effect_count = count.min(i32::MAX as u32) as i32;
        self
    }

    /// Set the type-level bit of `event_type` without any codes.
    pub fn with_type(mut self, event_type: u16) -> Self {
        set_bit(&mut self.type_mask, event_type);
        self
    }

    /// Set `event_type` and the given codes under it.
    pub fn with_codes(mut self, event_type: u16, codes: impl IntoIterator<Item = u16>) -> Self {
        set_bit(&mut self.type_mask, event_type);
        let mask = self.code_masks.entry(event_type).or_default();
        for code in codes {
            set_bit(mask, code);
        }
        self
    }

    /// Declare absolute axis `code` with its calibration data.
    pub fn with_axis(mut self, code: u16, info: AxisInfo) -> Self {
        self = self.with_codes(EV_ABS, [code]);
        self.axes.insert(code, info);
        self
    }

    /// Replace the type-level mask with raw bytes.
    pub fn with_type_mask(mut self, mask: &[u8]) -> Self {
        self.type_mask = mask.to_vec();
        self
    }

    /// Replace the code-level mask of `event_type` with raw bytes.
    pub fn with_code_mask(mut self, event_type: u16, mask: &[u8]) -> Self {
        self.code_masks.insert(event_type, mask.to_vec());
        self
    }

    /// Make every `query` fail.
    pub fn failing(mut self, query: Query) -> Self {
        self.failing.insert(query);
        self
    }

    /// Queue one read returning `bytes` (possibly empty).
    pub fn feed(&self, bytes: impl Into<Vec<u8>>) {
        let mut reads = self.reads.lock().unwrap_or_else(|e| e.into_inner());
        reads.push_back(ReadStep::Data(bytes.into()));
    }

    /// Queue one read returning these records back to back.
    pub fn feed_events(&self, events: &[EventRecord]) {
        self.feed(events.iter().flat_map(EventRecord::encode).collect::<Vec<u8>>());
    }

    /// Queue one read that fails with `kind`.
    pub fn fail_read(&self, kind: io::ErrorKind) {
        let mut reads = self.reads.lock().unwrap_or_else(|e| e.into_inner());
        reads.push_back(ReadStep::Fail(kind));
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> Vec<Query> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The identity this device reports when nothing fails.
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            bus_type: self.bus_type,
            vendor: self.vendor,
            product: self.product,
            version: self.version,
            name: self.name.clone(),
            phys: self.phys.clone().unwrap_or_default(),
            uniq: self.uniq.clone().unwrap_or_default(),
        }
    }

    fn answer(&self, query: Query, buf: &mut [u8]) -> io::Result<usize> {
        match query {
            Query::EventTypes => Ok(copy_reply(&self.type_mask, buf)),
            Query::EventCodes(ty) => {
                let mask = match self.code_masks.get(&ty) {
                    Some(mask) => mask.as_slice(),
                    None if ty == EV_SYN => self.type_mask.as_slice(),
                    None => &[],
                };
                Ok(copy_reply(mask, buf))
            }
            Query::AbsInfo(code) => {
                let info = self.axes.get(&code).copied().unwrap_or_default();
                fixed_reply(query, &info.to_reply(), buf, ABSINFO_SIZE)
            }
            Query::Id => fixed_reply(query, &self.identity().id_reply(), buf, INPUT_ID_SIZE),
            Query::Name => Ok(string_reply(&self.name, buf)),
            Query::Phys | Query::Uniq => {
                let value = if query == Query::Phys { &self.phys } else { &self.uniq };
                match value {
                    Some(s) => Ok(string_reply(s, buf)),
                    None => Err(io::Error::new(io::ErrorKind::NotFound, format!("{query}: not set"))),
                }
            }
            Query::DriverVersion => {
                let raw = self.driver_version.to_raw().to_ne_bytes();
                fixed_reply(query, &raw, buf, INT_SIZE)
            }
            Query::EffectCount => {
                fixed_reply(query, &self.effect_count.to_ne_bytes(), buf, INT_SIZE)
            }
        }
    }
}

impl DeviceHandle for VirtualDevice {
    fn query(&self, query: Query, buf: &mut [u8]) -> io::Result<usize> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query);
        if self.failing.contains(&query) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{query} rejected by virtual device"),
            ));
        }
        self.answer(query, buf)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reads = self.reads.lock().unwrap_or_else(|e| e.into_inner());
        match reads.pop_front() {
            Some(ReadStep::Data(data)) => {
                let n = copy_reply(&data, buf);
                if n < data.len() {
                    reads.push_front(ReadStep::Data(data[n..].to_vec()));
                }
                Ok(n)
            }
            Some(ReadStep::Fail(kind)) => Err(io::Error::from(kind)),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }
}
