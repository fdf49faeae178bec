//! Event records and the event-stream decoder.
//!
//! An evdev node emits a stream of fixed-size `struct input_event` records. This
//! module turns a byte buffer read from the node into [`EventRecord`]s, in the
//! order the bytes were laid out. No reordering, no filtering, no state is kept
//! between calls: bytes past the last whole record are dropped (or rejected in
//! [`DecodeMode::Strict`]), never carried over.
//!
//! ## Record layout
//! `tv_sec: long`, `tv_usec: long`, `type: u16`, `code: u16`, `value: i32`, all in
//! host byte order. That is 24 bytes on 64-bit targets and 16 on 32-bit ones; see
//! [`EventRecord::SIZE`].

use crate::config::DecodeMode;
use crate::error::DecodeError;
use crate::layout::{Builder, EVENT_SIZE, LONG_SIZE};
use serde::{Deserialize, Serialize};
use std::ffi::c_long;
use std::iter::FusedIterator;
use std::slice::ChunksExact;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;
pub const EV_REP: u16 = 0x14;
pub const EV_FF: u16 = 0x15;
pub const EV_PWR: u16 = 0x16;
pub const EV_FF_STATUS: u16 = 0x17;
pub const EV_MAX: u16 = 0x1f;
/// Size of the event-type space.
pub const EV_CNT: u16 = EV_MAX + 1;

pub const KEY_MAX: u16 = 0x2ff;
/// Size of the largest event-code space (keys); bounds every code bitmask.
pub const KEY_CNT: u16 = KEY_MAX + 1;

pub const ABS_MAX: u16 = 0x3f;
pub const ABS_CNT: u16 = ABS_MAX + 1;

/// One decoded `input_event`.
///
/// The timestamp is kept as the kernel's two independent fields rather than a
/// `Duration`; `usec` is not normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord {
    pub sec: i64,
    pub usec: i64,
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl EventRecord {
    /// Size of one record on this target.
    pub const SIZE: usize = EVENT_SIZE;

    /// A record with a zero timestamp.
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            sec: 0,
            usec: 0,
            event_type,
            code,
            value,
        }
    }

    pub fn at(mut self, sec: i64, usec: i64) -> Self {
        self.sec = sec;
        self.usec = usec;
        self
    }

    /// Encode into the kernel layout. Used to feed synthetic streams.
    pub fn encode(&self) -> Vec<u8> {
        let mut b = Builder::with_capacity(Self::SIZE);
        b.write_long(self.sec)
            .write_long(self.usec)
            .write_u16(self.event_type)
            .write_u16(self.code)
            .write_i32(self.value);
        b.into_inner()
    }

    // `raw` is always exactly `SIZE` bytes (from `chunks_exact`).
    fn from_chunk(raw: &[u8]) -> Self {
        let sec = c_long::from_ne_bytes(field(raw, 0));
        let usec = c_long::from_ne_bytes(field(raw, LONG_SIZE));
        let at = 2 * LONG_SIZE;
        Self {
            sec: sec as i64,
            usec: usec as i64,
            event_type: u16::from_ne_bytes(field(raw, at)),
            code: u16::from_ne_bytes(field(raw, at + 2)),
            value: i32::from_ne_bytes(field(raw, at + 4)),
        }
    }
}

#[inline]
fn field<const N: usize>(raw: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&raw[at..at + N]);
    out
}

/// Lazy iterator over the whole records in a byte buffer.
///
/// Trailing bytes that do not form a whole record are available through
/// [`Events::remainder`] and are never yielded.
#[derive(Clone, Debug)]
pub struct Events<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl<'a> Events<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            chunks: bytes.chunks_exact(EventRecord::SIZE),
        }
    }

    /// The partial record at the end of the buffer, if any.
    pub fn remainder(&self) -> &'a [u8] {
        self.chunks.remainder()
    }
}

impl Iterator for Events<'_> {
    type Item = EventRecord;

    fn next(&mut self) -> Option<EventRecord> {
        self.chunks.next().map(EventRecord::from_chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Events<'_> {}
impl FusedIterator for Events<'_> {}

/// Decode `floor(len / SIZE)` records, dropping any trailing partial record.
///
/// This mirrors what a single `read(2)` hands back: the kernel only ever returns
/// whole records, so trailing bytes are treated as absent rather than malformed.
pub fn decode_events(bytes: &[u8]) -> Vec<EventRecord> {
    Events::new(bytes).collect()
}

/// Decode like [`decode_events`], but fail on a trailing partial record.
pub fn decode_events_strict(bytes: &[u8]) -> Result<Vec<EventRecord>, DecodeError> {
    let events = Events::new(bytes);
    let trailing = events.remainder().len();
    if trailing != 0 {
        return Err(DecodeError::TrailingBytes {
            records: events.len(),
            record_size: EventRecord::SIZE,
            trailing,
        });
    }
    Ok(events.collect())
}

/// Decode according to `mode`.
pub fn decode_with(bytes: &[u8], mode: DecodeMode) -> Result<Vec<EventRecord>, DecodeError> {
    match mode {
        DecodeMode::Lenient => Ok(decode_events(bytes)),
        DecodeMode::Strict => decode_events_strict(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(records: &[EventRecord]) -> Vec<u8> {
        records.iter().flat_map(|r| r.encode()).collect()
    }

    #[test]
    fn encode_is_one_record_long() {
        assert_eq!(EventRecord::new(EV_KEY, 30, 1).encode().len(), EventRecord::SIZE);
    }

    #[test]
    fn decodes_fields_at_kernel_offsets() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&(1_700_000_000 as c_long).to_ne_bytes());
        raw.extend_from_slice(&(250_000 as c_long).to_ne_bytes());
        raw.extend_from_slice(&EV_REL.to_ne_bytes());
        raw.extend_from_slice(&8u16.to_ne_bytes());
        raw.extend_from_slice(&(-1i32).to_ne_bytes());

        let out = decode_events(&raw);
        assert_eq!(
            out,
            vec![EventRecord::new(EV_REL, 8, -1).at(1_700_000_000, 250_000)]
        );
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert!(decode_events(&[]).is_empty());
        assert_eq!(decode_events_strict(&[]), Ok(vec![]));
    }

    #[test]
    fn short_buffer_is_all_remainder() {
        let bytes = vec![0xAAu8; EventRecord::SIZE - 1];
        let events = Events::new(&bytes);
        assert_eq!(events.len(), 0);
        assert_eq!(events.remainder().len(), EventRecord::SIZE - 1);
        assert!(decode_events(&bytes).is_empty());
    }

    #[test]
    fn lenient_drops_trailing_partial_record() {
        let recs = [EventRecord::new(EV_KEY, 30, 1), EventRecord::new(EV_SYN, 0, 0)];
        let mut bytes = stream(&recs);
        bytes.extend_from_slice(&[1, 2, 3]);

        assert_eq!(decode_events(&bytes), recs.to_vec());
        assert_eq!(decode_with(&bytes, DecodeMode::Lenient), Ok(recs.to_vec()));
    }

    #[test]
    fn strict_rejects_trailing_partial_record() {
        let mut bytes = stream(&[EventRecord::new(EV_KEY, 30, 1)]);
        bytes.push(0);

        assert_eq!(
            decode_with(&bytes, DecodeMode::Strict),
            Err(DecodeError::TrailingBytes {
                records: 1,
                record_size: EventRecord::SIZE,
                trailing: 1,
            })
        );
    }

    #[test]
    fn iterator_is_lazy_and_exact() {
        let recs = [
            EventRecord::new(EV_ABS, 0, 512),
            EventRecord::new(EV_ABS, 1, 100),
            EventRecord::new(EV_SYN, 0, 0),
        ];
        let bytes = stream(&recs);
        let mut it = Events::new(&bytes);
        assert_eq!(it.len(), 3);
        assert_eq!(it.next(), Some(recs[0]));
        assert_eq!(it.len(), 2);
        assert_eq!(it.by_ref().count(), 2);
        assert_eq!(it.next(), None);
    }
}
