//! Property tests for bitmask interpretation and record decoding.

use evprobe::{
    decode_events, probe_capabilities, test_bit, AxisInfo, CodeEntry, EventRecord, Query,
    VirtualDevice, EV_ABS, EV_CNT, EV_KEY, KEY_CNT,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn bits_of(mask: &[u8], count: u16) -> Vec<u16> {
    (0..count)
        .filter(|&b| {
            let byte = mask.get(b as usize / 8).copied().unwrap_or(0);
            byte & (1 << (b % 8)) != 0
        })
        .collect()
}

fn arb_record() -> impl Strategy<Value = EventRecord> {
    (any::<i32>(), 0i32..1_000_000, any::<u16>(), any::<u16>(), any::<i32>())
        .prop_map(|(sec, usec, ty, code, value)| {
            EventRecord::new(ty, code, value).at(sec as i64, usec as i64)
        })
}

fn arb_axis() -> impl Strategy<Value = AxisInfo> {
    any::<[i32; 6]>().prop_map(|[v, lo, hi, fuzz, flat, res]| AxisInfo::new(v, lo, hi, fuzz, flat, res))
}

#[test]
fn bit_positions_cross_byte_boundaries() {
    let mask = [0b1000_0001u8, 0b0000_0001];
    assert!(test_bit(&mask, 0));
    assert!(test_bit(&mask, 7));
    assert!(test_bit(&mask, 8));
    assert_eq!(bits_of(&mask, 16), vec![0, 7, 8]);
}

proptest! {
    #[test]
    fn type_keys_equal_set_type_bits(
        type_mask in proptest::collection::vec(any::<u8>(), 4),
        fail_codes in any::<bool>(),
    ) {
        let mut dev = VirtualDevice::new("p").with_type_mask(&type_mask);
        for ty in 0..EV_CNT {
            dev = dev.with_code_mask(ty, &[0b101]);
            if fail_codes {
                dev = dev.failing(Query::EventCodes(ty));
            }
        }
        let caps = probe_capabilities(&dev)?;
        prop_assert_eq!(caps.types().collect::<Vec<_>>(), bits_of(&type_mask, EV_CNT));
    }

    #[test]
    fn key_codes_equal_set_code_bits(code_mask in proptest::collection::vec(any::<u8>(), 0..=96)) {
        let dev = VirtualDevice::new("p")
            .with_type(EV_KEY)
            .with_code_mask(EV_KEY, &code_mask);
        let caps = probe_capabilities(&dev)?;

        let entries = caps.get(EV_KEY).unwrap_or_default();
        prop_assert!(entries.iter().all(|e| matches!(e, CodeEntry::Code(_))));
        prop_assert_eq!(caps.codes(EV_KEY).collect::<Vec<_>>(), bits_of(&code_mask, KEY_CNT));
    }

    #[test]
    fn absolute_entries_carry_queried_info(
        axes in proptest::collection::btree_map(0u16..64, arb_axis(), 0..12),
        failing in proptest::collection::btree_set(0u16..64, 0..6),
    ) {
        let mut dev = VirtualDevice::new("p").with_type(EV_ABS);
        for (&code, &info) in &axes {
            dev = dev.with_axis(code, info);
        }
        for &code in &failing {
            dev = dev.failing(Query::AbsInfo(code));
        }
        let caps = probe_capabilities(&dev)?;

        let entries = caps.get(EV_ABS).unwrap_or_default();
        prop_assert_eq!(entries.len(), axes.len());
        for (entry, (&code, &info)) in entries.iter().zip(&axes) {
            let expected = if failing.contains(&code) { AxisInfo::default() } else { info };
            prop_assert_eq!(*entry, CodeEntry::Axis(code, expected));
        }
    }

    #[test]
    fn whole_records_decode_in_order(
        recs in proptest::collection::vec(arb_record(), 0..40),
        tail in proptest::collection::vec(any::<u8>(), 0..EventRecord::SIZE),
    ) {
        let mut bytes: Vec<u8> = recs.iter().flat_map(EventRecord::encode).collect();
        bytes.extend_from_slice(&tail);
        prop_assert_eq!(decode_events(&bytes), recs);
    }

    #[test]
    fn codes_are_strictly_ascending(codes in proptest::collection::btree_set(0u16..KEY_CNT, 0..50)) {
        let dev = VirtualDevice::new("p").with_codes(EV_KEY, codes.iter().copied());
        let caps = probe_capabilities(&dev)?;
        let listed: Vec<u16> = caps.codes(EV_KEY).collect();
        prop_assert!(listed.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(listed.into_iter().collect::<BTreeSet<_>>(), codes);
    }
}
