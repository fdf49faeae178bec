//! Read-only name tables for event types and bus types.
//!
//! These are plain `static` data: built at compile time, shared process-wide,
//! never mutated. Per-code names (`KEY_A`, `ABS_X`, ...) are deliberately not
//! provided here.

use crate::event::*;

/// Event-type names from `linux/input-event-codes.h`.
pub static EVENT_TYPE_NAMES: &[(u16, &str)] = &[
    (EV_SYN, "EV_SYN"),
    (EV_KEY, "EV_KEY"),
    (EV_REL, "EV_REL"),
    (EV_ABS, "EV_ABS"),
    (EV_MSC, "EV_MSC"),
    (EV_SW, "EV_SW"),
    (EV_LED, "EV_LED"),
    (EV_SND, "EV_SND"),
    (EV_REP, "EV_REP"),
    (EV_FF, "EV_FF"),
    (EV_PWR, "EV_PWR"),
    (EV_FF_STATUS, "EV_FF_STATUS"),
];

/// Bus-type names from `linux/input.h`.
pub static BUS_NAMES: &[(u16, &str)] = &[
    (0x01, "BUS_PCI"),
    (0x02, "BUS_ISAPNP"),
    (0x03, "BUS_USB"),
    (0x04, "BUS_HIL"),
    (0x05, "BUS_BLUETOOTH"),
    (0x06, "BUS_VIRTUAL"),
    (0x10, "BUS_ISA"),
    (0x11, "BUS_I8042"),
    (0x12, "BUS_XTKBD"),
    (0x13, "BUS_RS232"),
    (0x14, "BUS_GAMEPORT"),
    (0x15, "BUS_PARPORT"),
    (0x16, "BUS_AMIGA"),
    (0x17, "BUS_ADB"),
    (0x18, "BUS_I2C"),
    (0x19, "BUS_HOST"),
    (0x1A, "BUS_GSC"),
    (0x1B, "BUS_ATARI"),
    (0x1C, "BUS_SPI"),
    (0x1D, "BUS_RMI"),
    (0x1E, "BUS_CEC"),
    (0x1F, "BUS_INTEL_ISHTP"),
    (0x20, "BUS_AMD_SFH"),
];

fn lookup(table: &'static [(u16, &'static str)], key: u16) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}

#[inline]
pub fn event_type_name(event_type: u16) -> Option<&'static str> {
    lookup(EVENT_TYPE_NAMES, event_type)
}

#[inline]
pub fn bus_name(bus: u16) -> Option<&'static str> {
    lookup(BUS_NAMES, bus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_names() {
        assert_eq!(event_type_name(EV_ABS), Some("EV_ABS"));
        assert_eq!(event_type_name(EV_FF_STATUS), Some("EV_FF_STATUS"));
        assert_eq!(event_type_name(0x06), None);
        assert_eq!(bus_name(0x03), Some("BUS_USB"));
        assert_eq!(bus_name(0x00), None);
    }

    #[test]
    fn tables_are_sorted_and_unique() {
        for table in [EVENT_TYPE_NAMES, BUS_NAMES] {
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0));
        }
    }
}
