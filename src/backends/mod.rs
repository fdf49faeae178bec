//! Device-handle backends.
//!
//! Implementations of [`DeviceHandle`](crate::device::DeviceHandle) for concrete
//! handle types.
//!
//! # Feature flags
//! - **`evdev`** (default): `std::fs::File` as a Linux evdev handle.
//!
//! [`virtual_input::VirtualDevice`] is always available; it needs no OS support.

#[cfg(all(feature = "evdev", target_os = "linux"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "evdev", target_os = "linux"))))]
pub mod linux;

pub mod virtual_input;

pub use virtual_input::VirtualDevice;
