//! The device-handle boundary.
//!
//! Every operation in this crate talks to an already-open device node through
//! [`DeviceHandle`]. Opening and closing the node is the caller's business; the
//! handle is only ever borrowed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// A kernel query issued against a device handle.
///
/// The size of the reply buffer is part of the request: bitmask and string
/// queries fill at most `buf.len()` bytes, fixed-struct queries expect a buffer
/// of exactly the struct size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Query {
    /// Type-level bitmask (`EVIOCGBIT(0, len)`).
    EventTypes,
    /// Code-level bitmask for one event type (`EVIOCGBIT(ty, len)`).
    ///
    /// For type 0 the kernel answers with the type-level bitmask again.
    EventCodes(u16),
    /// `input_absinfo` for one absolute axis (`EVIOCGABS(code)`).
    AbsInfo(u16),
    /// `input_id`: bus type, vendor, product, version (`EVIOCGID`).
    Id,
    /// Device name (`EVIOCGNAME(len)`).
    Name,
    /// Physical topology path (`EVIOCGPHYS(len)`).
    Phys,
    /// Unique identifier, e.g. a Bluetooth MAC (`EVIOCGUNIQ(len)`).
    Uniq,
    /// evdev protocol version (`EVIOCGVERSION`).
    DriverVersion,
    /// Number of force-feedback effects playable at once (`EVIOCGEFFECTS`).
    EffectCount,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::EventTypes => f.write_str("EVIOCGBIT(0)"),
            Query::EventCodes(ty) => write!(f, "EVIOCGBIT({ty})"),
            Query::AbsInfo(code) => write!(f, "EVIOCGABS({code})"),
            Query::Id => f.write_str("EVIOCGID"),
            Query::Name => f.write_str("EVIOCGNAME"),
            Query::Phys => f.write_str("EVIOCGPHYS"),
            Query::Uniq => f.write_str("EVIOCGUNIQ"),
            Query::DriverVersion => f.write_str("EVIOCGVERSION"),
            Query::EffectCount => f.write_str("EVIOCGEFFECTS"),
        }
    }
}

/// An open input device node.
///
/// Implementations perform exactly one kernel call per method invocation: no
/// retries, no timeouts, no buffering. Both methods take `&self`, mirroring how
/// `&File` is readable; callers must still serialize use of one handle.
pub trait DeviceHandle {
    /// Issue `query`, writing the reply into `buf`.
    ///
    /// Returns the number of bytes the kernel reported as written.
    fn query(&self, query: Query, buf: &mut [u8]) -> io::Result<usize>;

    /// Read whatever the device has buffered, up to `buf.len()` bytes.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<H: DeviceHandle + ?Sized> DeviceHandle for &H {
    #[inline]
    fn query(&self, query: Query, buf: &mut [u8]) -> io::Result<usize> {
        (**self).query(query, buf)
    }

    #[inline]
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
}

impl<H: DeviceHandle + ?Sized> DeviceHandle for Box<H> {
    #[inline]
    fn query(&self, query: Query, buf: &mut [u8]) -> io::Result<usize> {
        (**self).query(query, buf)
    }

    #[inline]
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
}
