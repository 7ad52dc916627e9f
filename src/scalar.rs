//! Scalar reference validator
//!
//! Builds the per-position category and required-mask arrays in one pass,
//! then compares them pointwise. This is the oracle the lane validators are
//! checked against; it is written for clarity, not speed.

use crate::core::category::{Category, classify};
use crate::core::requirement::{MAX_REACH, requirement_after};

/// Validate `data` as UTF-8.
pub fn validate(data: &[u8]) -> bool {
    check(data, false)
}

/// Same verdict as [`validate`], emitting one `trace` event per position.
pub fn validate_traced(data: &[u8]) -> bool {
    check(data, true)
}

fn check(data: &[u8], traced: bool) -> bool {
    if data.is_empty() {
        return true;
    }

    let len = data.len();
    // Sentinel positions past the end read as START so a truncated
    // sequence is still held to its outstanding requirements.
    let total = len + MAX_REACH;
    let mut categories = vec![Category::START; total];
    let mut required = vec![Category::EMPTY; total];
    required[0] = Category::START;

    for (i, &byte) in data.iter().enumerate() {
        categories[i] = classify(byte);
        for (k, &item) in requirement_after(byte).next_items().iter().enumerate() {
            required[i + 1 + k] |= item;
        }
    }

    // The traced pass keeps going after a mismatch so the dump covers
    // every position.
    let mut valid = true;
    for position in 0..total {
        let wanted = required[position];
        let actual = categories[position];

        if traced {
            let byte = data.get(position).copied();
            tracing::trace!(
                position,
                byte = ?byte.map(|b| format!("{:02x}", b)),
                category = %actual,
                state = ?byte.map(requirement_after),
                required = %wanted,
                "octet"
            );
        }

        if !actual.satisfies(wanted) {
            if !traced {
                return false;
            }
            tracing::trace!(position, "requirement not met");
            valid = false;
            continue;
        }

        debug_assert!(
            !valid || wanted.bits().count_ones() == 1 || (position >= len && wanted.is_empty()),
            "required mask {} at position {} of {}",
            wanted,
            position,
            len
        );
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(data: &[u8]) -> bool {
        let plain = validate(data);
        assert_eq!(plain, validate_traced(data), "traced verdict differs for {:02x?}", data);
        plain
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(both(&[]));
    }

    #[test]
    fn test_ascii() {
        assert!(both(b"Hello"));
        assert!(both(b"x\0"));
        let all: Vec<u8> = (0..0x80).collect();
        assert!(both(&all));
    }

    #[test]
    fn test_multibyte_sequences() {
        assert!(both("crêpe".as_bytes()));
        assert!(both(&[0xE3, 0x81, 0x8C]));
        assert!(both(&[0xEF, 0xBB, 0xBF]));
        assert!(both(&[0xF4, 0x8F, 0xBF, 0xBF]));
        assert!(both(&[0xF0, 0x90, 0x90, 0x80]));
    }

    #[test]
    fn test_rejects_overlong_surrogate_and_out_of_range() {
        assert!(!both(&[0xC0, 0x80]));
        assert!(!both(&[0xE0, 0x83, 0xBF]));
        assert!(!both(&[0xED, 0xA0, 0x81, 0xED, 0xB0, 0x80]));
        assert!(!both(&[0xF4, 0x90, 0x80, 0x80]));
        assert!(!both(&[0xFE, 0xFE, 0xFE, 0xFE]));
    }

    #[test]
    fn test_truncated_sequences() {
        let four = [0xF0, 0x9F, 0x98, 0x80];
        for cut in 1..four.len() {
            assert!(!both(&four[..cut]), "prefix of length {}", cut);
        }
        assert!(both(&four));
    }

    #[test]
    fn test_stray_continuation() {
        assert!(!both(&[0x80]));
        assert!(!both(b"ab\xBFcd"));
        assert!(!both(&[0xC3, 0xAA, 0xAA]));
    }

    #[test]
    fn test_lone_impossible_leads() {
        for lead in [0xC0, 0xC1, 0xF5, 0xF7, 0xFF] {
            assert!(!both(&[lead]));
            assert!(!both(&[lead, 0x80, 0x80, 0x80]));
            assert!(!both(&[b'a', lead, b'a']));
        }
    }

    /// Run `f` with a trace-level subscriber and return what it printed.
    fn captured_trace(f: impl FnOnce()) -> String {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Shared(Arc<Mutex<Vec<u8>>>);

        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let shared = Shared::default();
        let writer = shared.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = shared.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_trace_covers_every_position_past_an_error() {
        let data = [b'a', 0x80, b'b', 0xC3];
        let mut verdict = true;
        let output = captured_trace(|| verdict = validate_traced(&data));
        assert!(!verdict);

        let positions = output.lines().filter(|line| line.contains("octet")).count();
        assert_eq!(positions, data.len() + MAX_REACH);
        let misses = output.lines().filter(|line| line.contains("requirement not met")).count();
        assert_eq!(misses, 2, "{}", output);
    }

    #[test]
    fn test_every_two_byte_input_matches_std() {
        for a in 0..=0xFFu8 {
            for b in 0..=0xFFu8 {
                let bytes = [a, b];
                assert_eq!(
                    validate(&bytes),
                    std::str::from_utf8(&bytes).is_ok(),
                    "{:02x?}",
                    bytes
                );
            }
        }
    }
}
