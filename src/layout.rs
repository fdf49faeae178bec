//! Native-endian readers and writers for the kernel's fixed-layout structs.
//!
//! The kernel hands us `input_event`, `input_absinfo`, `input_id` and plain
//! `int`s as raw bytes in host byte order. [`Cursor`] walks a borrowed reply
//! buffer field by field; [`Builder`] produces the same layouts, which the
//! virtual backend uses to answer queries.

use crate::error::DecodeError;
use std::ffi::c_long;
use std::mem::size_of;

/// Size of the kernel's `long`, which backs both `timeval` fields.
pub const LONG_SIZE: usize = size_of::<c_long>();

/// `struct input_event`: `timeval` + `u16` type + `u16` code + `i32` value.
pub const EVENT_SIZE: usize = 2 * LONG_SIZE + 2 + 2 + 4;

/// `struct input_absinfo`: six `i32`.
pub const ABSINFO_SIZE: usize = 6 * 4;

/// `struct input_id`: four `u16`.
pub const INPUT_ID_SIZE: usize = 4 * 2;

/// A C `int` reply (`EVIOCGVERSION`, `EVIOCGEFFECTS`).
pub const INT_SIZE: usize = 4;

pub(crate) struct Cursor<'a> {
    what: &'static str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// `what` names the struct being decoded, for error messages.
    pub fn new(what: &'static str, buf: &'a [u8]) -> Self {
        Self { what, buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let bytes: [u8; N] = self
            .buf
            .get(self.pos..end)
            .and_then(|b| b.try_into().ok())
            .ok_or(DecodeError::ShortReply {
                what: self.what,
                expected: end,
                actual: self.buf.len(),
            })?;
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.take().map(u16::from_ne_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.take().map(i32::from_ne_bytes)
    }
}

#[derive(Default)]
pub(crate) struct Builder {
    buf: Vec<u8>,
}

impl Builder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_ne_bytes());
        self
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_ne_bytes());
        self
    }

    /// Write a C `long`; values outside its range are truncated on 32-bit hosts.
    pub fn write_long(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&(value as c_long).to_ne_bytes());
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
