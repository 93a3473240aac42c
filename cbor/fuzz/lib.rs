use tiny_cbor::decode::Reader;
use tiny_cbor::encode::Writer;
use tiny_cbor::format::MajorType;

const MAX_RECURSION: usize = 16;
const GUARD: usize = 16;
const GUARD_BYTE: u8 = 0xA5;

/// Reads every top-level item of `data`, returning false at the first
/// malformed or unsupported item.
pub fn walk(data: &[u8]) -> bool {
    let mut reader = Reader::new(data);
    while reader.remaining() > 0 {
        if !walk_item(&mut reader, MAX_RECURSION) {
            return false;
        }
    }
    true
}

fn walk_item(reader: &mut Reader, max_recursion: usize) -> bool {
    let items = match reader.peek_major_type() {
        Some(MajorType::Unsigned) => return reader.read_unsigned().is_ok(),
        Some(MajorType::ByteString) => return reader.read_data().is_ok(),
        Some(MajorType::TextString) => return reader.read_text().is_ok(),
        Some(MajorType::Simple) => return reader.read_simple().is_ok(),
        Some(MajorType::Array) => reader.read_array().ok(),
        Some(MajorType::Map) => reader.read_map().ok().and_then(|n| n.checked_mul(2)),
        _ => None,
    };
    let Some(items) = items else {
        return false;
    };
    if max_recursion == 0 {
        return false;
    }
    // Every item takes at least a byte, so a bogus count fails quickly
    (0..items).all(|_| walk_item(reader, max_recursion - 1))
}

/// Drives a writer over a guarded buffer from a script of operation bytes.
///
/// Panics if the writer touches memory outside its buffer, or produces
/// output that does not read back.
pub fn run_script(script: &[u8]) {
    let Some((size, mut script)) = script.split_first() else {
        return;
    };
    let size = *size as usize;
    let mut storage = [GUARD_BYTE; 2 * GUARD + 256];
    let end = GUARD + size;

    {
        let mut writer = Writer::new(&mut storage[GUARD..end]);
        while let Some((op, rest)) = script.split_first() {
            script = rest;
            match op % 10 {
                0 => {
                    let len = script.first().map_or(0, |n| (*n as usize % 9).min(script.len() - 1));
                    let value = script
                        .iter()
                        .skip(1)
                        .take(len)
                        .fold(0u64, |v, b| (v << 8) | *b as u64);
                    script = &script[(len + 1).min(script.len())..];
                    writer.prepend_unsigned(value);
                }
                1 | 2 => {
                    let len = script.first().map_or(0, |n| *n as usize % 32);
                    script = &script[1.min(script.len())..];
                    let payload = [0x5Au8; 32];
                    if op % 10 == 1 {
                        writer.prepend_data(&payload[..len]);
                    } else {
                        writer.prepend_text(&payload[..len]);
                    }
                }
                3 => {
                    writer.open_array();
                }
                4 => {
                    writer.wrap_array();
                }
                5 => {
                    writer.open_map();
                }
                6 => {
                    writer.wrap_map();
                }
                7 => {
                    writer.prepend_null();
                }
                8 => {
                    writer.prepend_bool(op & 0x80 != 0);
                }
                _ => {
                    writer.prepend_undefined();
                }
            }
        }

        if let Ok(cbor) = writer.finish() {
            assert!(walk(cbor), "written CBOR does not read back");
        }
    }

    assert!(storage[..GUARD].iter().all(|b| *b == GUARD_BYTE));
    assert!(storage[end..].iter().all(|b| *b == GUARD_BYTE));
}
