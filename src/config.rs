//! Probe and decoder configuration.
//!
//! The kernel-header maxima (event-type count, event-code count) are kept here
//! rather than hardcoded at the query sites, so targets with different headers
//! can adjust them. Every field has a default, so an empty TOML document is a
//! valid configuration:
//!
//! ```toml
//! event_type_count = 32
//! event_code_count = 768
//! read_batch = 64
//! decode_mode = "lenient"
//! ```

use crate::error::{Error, Result};
use crate::event::{EventRecord, EV_CNT, KEY_CNT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `read_batch`; the kernel's own event buffer holds far fewer.
pub const MAX_READ_BATCH: usize = 1024;

/// How the decoder treats bytes past the last whole record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Drop them silently.
    #[default]
    Lenient,
    /// Fail with [`DecodeError::TrailingBytes`](crate::DecodeError::TrailingBytes).
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Number of event types covered by the type-level bitmask.
    pub event_type_count: u16,
    /// Number of event codes covered by each code-level bitmask.
    pub event_code_count: u16,
    /// Maximum records requested per read.
    pub read_batch: usize,
    pub decode_mode: DecodeMode,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            event_type_count: EV_CNT,
            event_code_count: KEY_CNT,
            read_batch: 64,
            decode_mode: DecodeMode::Lenient,
        }
    }
}

impl ProbeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_type_count == 0 || self.event_type_count > EV_CNT {
            return Err(Error::Config(format!(
                "event_type_count must be in 1..={EV_CNT}, got {}",
                self.event_type_count
            )));
        }
        if self.event_code_count == 0 || self.event_code_count > KEY_CNT {
            return Err(Error::Config(format!(
                "event_code_count must be in 1..={KEY_CNT}, got {}",
                self.event_code_count
            )));
        }
        self.read_buf_len()?;
        Ok(())
    }

    /// Bytes of one read buffer: `read_batch` whole records.
    pub fn read_buf_len(&self) -> Result<usize> {
        if !(1..=MAX_READ_BATCH).contains(&self.read_batch) {
            return Err(Error::Config(format!(
                "read_batch must be in 1..={MAX_READ_BATCH}, got {}",
                self.read_batch
            )));
        }
        self.read_batch
            .checked_mul(EventRecord::SIZE)
            .ok_or_else(|| Error::Config(format!("read_batch {} overflows", self.read_batch)))
    }

    /// Bytes needed for the type-level bitmask.
    #[inline]
    pub fn type_mask_len(&self) -> usize {
        mask_len(self.event_type_count)
    }

    /// Bytes needed for one code-level bitmask.
    #[inline]
    pub fn code_mask_len(&self) -> usize {
        mask_len(self.event_code_count)
    }
}

#[inline]
fn mask_len(bits: u16) -> usize {
    (bits as usize).div_ceil(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_kernel_maxima() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.type_mask_len(), 4);
        assert_eq!(cfg.code_mask_len(), 96);
        assert_eq!(cfg.read_batch, 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() -> Result<()> {
        assert_eq!(ProbeConfig::from_toml_str("")?, ProbeConfig::default());
        Ok(())
    }

    #[test]
    fn parses_overrides() -> Result<()> {
        let cfg = ProbeConfig::from_toml_str(
            "event_code_count = 20\nread_batch = 8\ndecode_mode = \"strict\"\n",
        )?;
        assert_eq!(cfg.event_type_count, EV_CNT);
        assert_eq!(cfg.event_code_count, 20);
        assert_eq!(cfg.code_mask_len(), 3);
        assert_eq!(cfg.read_batch, 8);
        assert_eq!(cfg.decode_mode, DecodeMode::Strict);
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_bounds() {
        for doc in [
            "event_type_count = 0",
            "event_type_count = 33",
            "event_code_count = 769",
            "read_batch = 0",
            "read_batch = 1025",
            "read_batch = 9223372036854775807",
        ] {
            assert!(
                matches!(ProbeConfig::from_toml_str(doc), Err(Error::Config(_))),
                "{doc}"
            );
        }
    }

    #[test]
    fn read_buf_len_is_whole_records() -> Result<()> {
        let cfg = ProbeConfig {
            read_batch: MAX_READ_BATCH,
            ..ProbeConfig::default()
        };
        assert_eq!(cfg.read_buf_len()?, MAX_READ_BATCH * EventRecord::SIZE);

        let cfg = ProbeConfig {
            read_batch: usize::MAX,
            ..ProbeConfig::default()
        };
        assert!(matches!(cfg.read_buf_len(), Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            ProbeConfig::from_toml_str("batch = 3"),
            Err(Error::ConfigParse(_))
        ));
    }
}
