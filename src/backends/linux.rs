//! Linux evdev backend.
//!
//! Implements [`DeviceHandle`] for an open `/dev/input/event*` [`File`]. Queries
//! are `EVIOC*` ioctls whose request codes are computed here from the reply
//! buffer size; reads go through `read(2)` on the file.
//!
//! This module does **not** open device nodes, grab them, or touch force-feedback
//! effects. It never closes the file either: it only borrows it.

use crate::device::{DeviceHandle, Query};
use crate::event::{ABS_MAX, EV_CNT};
use crate::layout::{ABSINFO_SIZE, INPUT_ID_SIZE, INT_SIZE};
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::AsRawFd;

const IOC_READ: u32 = 2;

// `_IOC` size field width differs between architecture families.
#[cfg(any(
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "sparc64"
))]
const SIZEBITS: u32 = 13;
#[cfg(not(any(
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "sparc64"
)))]
const SIZEBITS: u32 = 14;

const NRSHIFT: u32 = 0;
const TYPESHIFT: u32 = 8;
const SIZESHIFT: u32 = 16;
const DIRSHIFT: u32 = SIZESHIFT + SIZEBITS;

/// ioctl "type" byte of every evdev request.
const EVDEV_IOC_TYPE: u32 = b'E' as u32;

const MAX_IOC_SIZE: usize = (1 << SIZEBITS) - 1;

/// `_IOC(_IOC_READ, 'E', nr, size)`.
const fn ior(nr: u32, size: usize) -> u32 {
    (IOC_READ << DIRSHIFT)
        | (EVDEV_IOC_TYPE << TYPESHIFT)
        | (nr << NRSHIFT)
        | ((size as u32) << SIZESHIFT)
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn exact(query: Query, len: usize, want: usize) -> io::Result<()> {
    if len == want {
        Ok(())
    } else {
        Err(invalid(format!("{query} needs a {want}-byte buffer, got {len}")))
    }
}

/// Request code for `query` with a reply buffer of `len` bytes.
pub fn request_code(query: Query, len: usize) -> io::Result<u32> {
    if len > MAX_IOC_SIZE {
        return Err(invalid(format!("{query}: buffer of {len} bytes is too large")));
    }
    let nr = match query {
        Query::EventTypes => 0x20,
        Query::EventCodes(ty) if ty < EV_CNT => 0x20 + ty as u32,
        Query::EventCodes(ty) => return Err(invalid(format!("event type {ty} out of range"))),
        Query::AbsInfo(code) if code <= ABS_MAX => {
            exact(query, len, ABSINFO_SIZE)?;
            0x40 + code as u32
        }
        Query::AbsInfo(code) => return Err(invalid(format!("axis {code} out of range"))),
        Query::Id => {
            exact(query, len, INPUT_ID_SIZE)?;
            0x02
        }
        Query::Name => 0x06,
        Query::Phys => 0x07,
        Query::Uniq => 0x08,
        Query::DriverVersion => {
            exact(query, len, INT_SIZE)?;
            0x01
        }
        Query::EffectCount => {
            exact(query, len, INT_SIZE)?;
            0x84
        }
    };
    Ok(ior(nr, len))
}

impl DeviceHandle for File {
    fn query(&self, query: Query, buf: &mut [u8]) -> io::Result<usize> {
        let request = request_code(query, buf.len())?;
        // SAFETY: `request` is a read-direction evdev ioctl whose encoded size is
        // `buf.len()`, so the kernel writes at most that many bytes into `buf`.
        let ret = unsafe { libc::ioctl(self.as_raw_fd(), request as _, buf.as_mut_ptr()) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ret as usize)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut file: &File = self;
        Read::read(&mut file, buf)
    }
}
