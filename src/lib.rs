//! evprobe: capability discovery and event decoding for evdev input devices.
//!
//! Given an already-open `/dev/input/event*` handle, this crate:
//! - probes which event types and codes the device supports, including the
//!   calibration of every absolute axis ([`probe_capabilities`]);
//! - reads the device identity ([`read_identity`]);
//! - decodes the raw `input_event` stream into [`EventRecord`]s ([`decode_events`],
//!   [`read_events`]).
//!
//! It does not open devices, grab them, or interpret what events mean.
//!
//! ```no_run
//! use evprobe::{probe_capabilities, read_events, read_identity, ProbeConfig, EV_ABS};
//!
//! let file = std::fs::File::open("/dev/input/event0")?;
//! println!("{}", read_identity(&file)?);
//! let caps = probe_capabilities(&file)?;
//! for code in caps.codes(EV_ABS) {
//!     println!("axis {code}: {:?}", caps.axis_info(code));
//! }
//! for ev in read_events(&file, &ProbeConfig::default())?.into_events() {
//!     println!("{ev:?}");
//! }
//! # Ok::<(), evprobe::Error>(())
//! ```

pub mod backends;
pub mod capabilities;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
mod layout;
pub mod metadata;
pub mod names;
pub mod reader;
pub mod snapshot;

pub use backends::VirtualDevice;
pub use capabilities::*;
pub use config::*;
pub use device::*;
pub use error::*;
pub use event::*;
pub use metadata::*;
pub use reader::*;
pub use snapshot::*;
