use super::encode::*;
use hex_literal::hex;

fn emit<F>(f: F) -> std::vec::Vec<u8>
where
    F: FnOnce(&mut Writer),
{
    let mut buffer = [0u8; 128];
    let mut writer = Writer::new(&mut buffer);
    f(&mut writer);
    writer.finish().unwrap().to_vec()
}

fn emit_unsigned(value: u64) -> std::vec::Vec<u8> {
    emit(|w| {
        w.prepend_unsigned(value);
    })
}

fn sample(writer: &mut Writer) {
    writer
        .open_array()
        .prepend_unsigned(123)
        .prepend_data(&hex!("0a0b0c"))
        .wrap_array();
}

#[test]
fn sample_array() {
    let mut buffer = [0u8; 128];
    let mut writer = Writer::new(&mut buffer);
    sample(&mut writer);
    assert_eq!(writer.position(), Some(121));
    assert_eq!(writer.finish().unwrap(), &hex!("82430a0b0c187b"));
}

#[test]
fn rfc_tests() {
    // RFC 8949, Appendix A:
    // https://www.rfc-editor.org/rfc/rfc8949.html#section-appendix.a

    assert_eq!(emit_unsigned(0), hex!("00"));
    assert_eq!(emit_unsigned(1), hex!("01"));
    assert_eq!(emit_unsigned(10), hex!("0a"));
    assert_eq!(emit_unsigned(23), hex!("17"));
    assert_eq!(emit_unsigned(24), hex!("1818"));
    assert_eq!(emit_unsigned(25), hex!("1819"));
    assert_eq!(emit_unsigned(100), hex!("1864"));
    assert_eq!(emit_unsigned(1000), hex!("1903e8"));
    assert_eq!(emit_unsigned(1000000), hex!("1a000f4240"));
    assert_eq!(emit_unsigned(1000000000000), hex!("1b000000e8d4a51000"));
    assert_eq!(emit_unsigned(18446744073709551615), hex!("1bffffffffffffffff"));

    assert_eq!(emit(|w| { w.prepend_bool(false); }), hex!("f4"));
    assert_eq!(emit(|w| { w.prepend_bool(true); }), hex!("f5"));
    assert_eq!(emit(|w| { w.prepend_null(); }), hex!("f6"));
    assert_eq!(emit(|w| { w.prepend_undefined(); }), hex!("f7"));

    assert_eq!(emit(|w| { w.prepend_data(&[]); }), hex!("40"));
    assert_eq!(emit(|w| { w.prepend_data(&hex!("01020304")); }), hex!("4401020304"));
    assert_eq!(emit(|w| { w.prepend_text(""); }), hex!("60"));
    assert_eq!(emit(|w| { w.prepend_text("a"); }), hex!("6161"));
    assert_eq!(emit(|w| { w.prepend_text("IETF"); }), hex!("6449455446"));
    assert_eq!(emit(|w| { w.prepend_text("\"\\"); }), hex!("62225c"));
    assert_eq!(emit(|w| { w.prepend_text("\u{00fc}"); }), hex!("62c3bc"));
    assert_eq!(emit(|w| { w.prepend_text("\u{6c34}"); }), hex!("63e6b0b4"));

    assert_eq!(emit(|w| { w.open_array().wrap_array(); }), hex!("80"));
    assert_eq!(
        emit(|w| {
            w.open_array()
                .prepend_unsigned(3)
                .prepend_unsigned(2)
                .prepend_unsigned(1)
                .wrap_array();
        }),
        hex!("83010203")
    );
    assert_eq!(
        emit(|w| {
            w.open_array()
                .open_array()
                .prepend_unsigned(5)
                .prepend_unsigned(4)
                .wrap_array()
                .open_array()
                .prepend_unsigned(3)
                .prepend_unsigned(2)
                .wrap_array()
                .prepend_unsigned(1)
                .wrap_array();
        }),
        hex!("8301820203820405")
    );
    assert_eq!(
        emit(|w| {
            w.open_array();
            for i in (1..=25).rev() {
                w.prepend_unsigned(i);
            }
            w.wrap_array();
        }),
        hex!("98190102030405060708090a0b0c0d0e0f101112131415161718181819")
    );

    assert_eq!(emit(|w| { w.open_map().wrap_map(); }), hex!("a0"));
    assert_eq!(
        emit(|w| {
            w.open_map()
                .prepend_unsigned(4)
                .prepend_unsigned(3)
                .prepend_unsigned(2)
                .prepend_unsigned(1)
                .wrap_map();
        }),
        hex!("a201020304")
    );
    assert_eq!(
        emit(|w| {
            w.open_map()
                .open_array()
                .prepend_unsigned(3)
                .prepend_unsigned(2)
                .wrap_array()
                .prepend_text("b")
                .prepend_unsigned(1)
                .prepend_text("a")
                .wrap_map();
        }),
        hex!("a26161016162820203")
    );
    assert_eq!(
        emit(|w| {
            w.open_array()
                .open_map()
                .prepend_text("c")
                .prepend_text("b")
                .wrap_map()
                .prepend_text("a")
                .wrap_array();
        }),
        hex!("826161a161626163")
    );
}

#[test]
fn minimal_width_boundaries() {
    for (value, len) in [
        (0u64, 1usize),
        (23, 1),
        (24, 2),
        (255, 2),
        (256, 3),
        (65535, 3),
        (65536, 5),
        (u32::MAX as u64, 5),
        (u32::MAX as u64 + 1, 9),
        (u64::MAX, 9),
    ] {
        let encoded = emit_unsigned(value);
        assert_eq!(encoded.len(), len, "value {value}");
        assert_eq!(encoded.len(), crate::format::unsigned_size(value));
    }

    assert_eq!(emit_unsigned(255), hex!("18ff"));
    assert_eq!(emit_unsigned(256), hex!("190100"));
    assert_eq!(emit_unsigned(65536), hex!("1a00010000"));
    assert_eq!(emit_unsigned(u32::MAX as u64 + 1), hex!("1b0000000100000000"));
}

#[test]
fn long_lengths() {
    let data = [0x55u8; 300];
    let mut buffer = [0u8; 512];

    let mut writer = Writer::new(&mut buffer);
    writer.prepend_data(&data[..255]);
    let encoded = writer.finish().unwrap();
    assert_eq!(encoded.len(), 257);
    assert_eq!(encoded[..2], hex!("58ff"));

    let mut writer = Writer::new(&mut buffer);
    writer.prepend_data(&data[..256]);
    let encoded = writer.finish().unwrap();
    assert_eq!(encoded.len(), 259);
    assert_eq!(encoded[..3], hex!("590100"));

    let mut writer = Writer::new(&mut buffer);
    writer.prepend_text(&data[..]);
    let encoded = writer.finish().unwrap();
    assert_eq!(encoded.len(), 303);
    assert_eq!(encoded[..3], hex!("79012c"));
    assert!(encoded[3..].iter().all(|b| *b == 0x55));
}

#[test]
fn zero_length_items_are_counted() {
    assert_eq!(
        emit(|w| {
            w.open_array().prepend_data(&[]).prepend_text("").wrap_array();
        }),
        hex!("826040")
    );
    assert_eq!(
        emit(|w| {
            w.open_array().prepend_object(&[]).wrap_array();
        }),
        hex!("81")
    );
}

#[test]
fn raw_and_wrapped_data() {
    // An embedded CBOR item carried in a byte string
    assert_eq!(
        emit(|w| {
            w.open_array()
                .prepend_raw(&hex!("8101"))
                .wrap_data(2)
                .wrap_array();
        }),
        hex!("81428101")
    );

    // Pre-encoded items count once each
    assert_eq!(
        emit(|w| {
            w.open_array()
                .prepend_object(&hex!("f5"))
                .prepend_object(&hex!("6161"))
                .wrap_array();
        }),
        hex!("826161f5")
    );
}

#[test]
fn to_cbor() {
    assert_eq!(emit(|w| { w.prepend(&7u8); }), hex!("07"));
    assert_eq!(emit(|w| { w.prepend(&1000u16); }), hex!("1903e8"));
    assert_eq!(emit(|w| { w.prepend(&1000000u32); }), hex!("1a000f4240"));
    assert_eq!(emit(|w| { w.prepend(&24usize); }), hex!("1818"));
    assert_eq!(emit(|w| { w.prepend(&true); }), hex!("f5"));
    assert_eq!(emit(|w| { w.prepend(&Some(5u64)); }), hex!("05"));
    assert_eq!(emit(|w| { w.prepend(&None::<u64>); }), hex!("f6"));
    assert_eq!(emit(|w| { w.prepend("IETF"); }), hex!("6449455446"));
    assert_eq!(emit(|w| { w.prepend(&hex!("0102")); }), hex!("420102"));
    assert_eq!(emit(|w| { w.prepend(&hex!("0102")[..]); }), hex!("420102"));
}

#[test]
fn exact_fit() {
    let mut buffer = [0u8; 7];
    let mut writer = Writer::new(&mut buffer);
    sample(&mut writer);
    assert_eq!(writer.available(), 0);
    assert_eq!(writer.finish().unwrap(), &hex!("82430a0b0c187b"));
}

#[test]
fn overflow_containment() {
    const GUARD: usize = 8;

    for size in 0..7 {
        let mut storage = [0xA5u8; 2 * GUARD + 7];
        {
            let mut writer = Writer::new(&mut storage[GUARD..GUARD + size]);
            sample(&mut writer);
            assert_eq!(writer.position(), None);
            assert_eq!(writer.available(), 0);
            assert!(matches!(
                writer.finish(),
                Err(Error::BufferTooSmall { .. })
            ));
        }
        assert!(storage[..GUARD].iter().all(|b| *b == 0xA5), "size {size}");
        assert!(
            storage[GUARD + size..].iter().all(|b| *b == 0xA5),
            "size {size}"
        );
    }
}

#[test]
fn failure_is_sticky() {
    let mut buffer = [0u8; 4];
    {
        let mut writer = Writer::new(&mut buffer);
        writer.prepend_unsigned(1000000);
        assert_eq!(writer.position(), None);

        // None of these may write, nor replace the first error
        writer
            .prepend_unsigned(1)
            .prepend_bool(true)
            .prepend_data(&[1])
            .wrap_array()
            .prepend_null();
        assert_eq!(
            writer.finish(),
            Err(Error::BufferTooSmall {
                needed: 5,
                available: 4
            })
        );
    }
    assert_eq!(buffer, [0u8; 4]);
}

#[test]
fn failure_freezes_nesting() {
    let mut buffer = [0u8; 2];
    let mut writer = Writer::new(&mut buffer);
    writer.open_array().open_array().prepend_unsigned(1000);
    assert_eq!(writer.depth(), 2);

    writer.wrap_array();
    assert_eq!(writer.depth(), 2);
    writer.open_map().open_array();
    assert_eq!(writer.depth(), 2);
    writer.wrap_map().wrap_array().wrap_array();
    assert_eq!(writer.depth(), 2);

    assert_eq!(
        writer.finish(),
        Err(Error::BufferTooSmall {
            needed: 3,
            available: 2
        })
    );
}

#[test]
fn nesting_limits() {
    let mut buffer = [0u8; 16];

    let mut writer = Writer::<2>::with_max_nesting(&mut buffer);
    writer.open_array().open_map();
    assert_eq!(writer.depth(), 2);
    writer.open_array();
    assert_eq!(writer.position(), None);
    assert_eq!(writer.finish(), Err(Error::NestingTooDeep(2)));

    let mut writer = Writer::<0>::with_max_nesting(&mut buffer);
    writer.open_array();
    assert_eq!(writer.finish(), Err(Error::NestingTooDeep(0)));

    let mut writer = Writer::new(&mut buffer);
    for _ in 0..crate::format::DEFAULT_MAX_NESTING {
        writer.open_array();
    }
    for _ in 0..crate::format::DEFAULT_MAX_NESTING {
        writer.wrap_array();
    }
    assert_eq!(writer.finish().unwrap(), &hex!("8181818181818180"));
}

#[test]
fn structural_misuse() {
    let mut buffer = [0u8; 16];

    let mut writer = Writer::new(&mut buffer);
    writer.wrap_array();
    assert_eq!(writer.finish(), Err(Error::NoOpenContainer));

    let mut writer = Writer::new(&mut buffer);
    writer.open_array().wrap_array().wrap_map();
    assert_eq!(writer.finish(), Err(Error::NoOpenContainer));

    let mut writer = Writer::new(&mut buffer);
    writer
        .open_map()
        .prepend_unsigned(1)
        .prepend_unsigned(2)
        .prepend_unsigned(3)
        .wrap_map();
    assert_eq!(writer.finish(), Err(Error::UnmatchedMapKey));

    let mut writer = Writer::new(&mut buffer);
    writer.open_array().open_array().prepend_null().wrap_array();
    assert_eq!(writer.depth(), 1);
    assert!(writer.position().is_some());
    assert_eq!(writer.finish(), Err(Error::UnclosedContainers(1)));
}

#[test]
fn top_level_sequence() {
    // Top-level items are not counted, and simply follow one another
    assert_eq!(
        emit(|w| {
            w.prepend_unsigned(2).prepend_unsigned(1);
        }),
        hex!("0102")
    );
}
