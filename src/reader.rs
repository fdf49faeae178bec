//! Reading and decoding one batch of events from a handle.
//!
//! [`read_events`] performs a single `read` of at most `read_batch` records and
//! decodes whatever came back. It does not loop, retry, or keep partial records
//! between calls. Whether the read blocks is decided by how the handle was opened.

use crate::config::ProbeConfig;
use crate::device::DeviceHandle;
use crate::error::Result;
use crate::event::{decode_with, EventRecord};

/// Result of one read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The read succeeded; possibly with zero records.
    Events(Vec<EventRecord>),
    /// The read itself failed (including `WouldBlock` on a non-blocking handle).
    NoData,
}

impl ReadOutcome {
    /// Records of this read; empty for [`ReadOutcome::NoData`].
    pub fn events(&self) -> &[EventRecord] {
        match self {
            ReadOutcome::Events(events) => events,
            ReadOutcome::NoData => &[],
        }
    }

    /// Collapse both "no records" cases into an empty list.
    pub fn into_events(self) -> Vec<EventRecord> {
        match self {
            ReadOutcome::Events(events) => events,
            ReadOutcome::NoData => Vec::new(),
        }
    }

    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, ReadOutcome::NoData)
    }
}

/// Read one batch from `handle` and decode it.
///
/// A failed read is reported as [`ReadOutcome::NoData`], never as an error.
/// Errors are a `read_batch` outside `1..=`[`MAX_READ_BATCH`](crate::MAX_READ_BATCH)
/// and a trailing partial record under
/// [`DecodeMode::Strict`](crate::DecodeMode::Strict).
pub fn read_events<H: DeviceHandle + ?Sized>(handle: &H, cfg: &ProbeConfig) -> Result<ReadOutcome> {
    let mut buf = vec![0u8; cfg.read_buf_len()?];
    let n = match handle.read(&mut buf) {
        Ok(n) => n.min(buf.len()),
        Err(e) => {
            log::debug!("event read failed: {e}");
            return Ok(ReadOutcome::NoData);
        }
    };

    #[cfg(feature = "debug-log")]
    log::trace!("read {n} byte(s): {:02x?}", &buf[..n]);

    let events = decode_with(&buf[..n], cfg.decode_mode)?;
    Ok(ReadOutcome::Events(events))
}
