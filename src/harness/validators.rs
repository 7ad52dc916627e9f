//! Validators compared by the harness
//!
//! Ours are the lane automaton and its scalar forms. The independent ones
//! (std, a width-table decoder and two table DFAs) exist to cross-check
//! them; the lenient decoder is wrong on purpose and only joins when asked
//! for.

/// A UTF-8 validator under test.
pub trait Validator {
    fn name(&self) -> &str;

    /// True for validators built on this crate's automaton.
    fn ours(&self) -> bool;

    /// Reserve any scratch space for inputs up to `len` bytes. Called
    /// outside timed regions.
    fn prepare(&mut self, _len: usize) {}

    fn validate(&mut self, data: &[u8]) -> bool;
}

/// A stateless validator wrapping a plain function.
pub struct FnValidator {
    name: &'static str,
    ours: bool,
    check: fn(&[u8]) -> bool,
}

impl FnValidator {
    pub const fn new(name: &'static str, ours: bool, check: fn(&[u8]) -> bool) -> Self {
        Self { name, ours, check }
    }
}

impl Validator for FnValidator {
    fn name(&self) -> &str {
        self.name
    }

    fn ours(&self) -> bool {
        self.ours
    }

    fn validate(&mut self, data: &[u8]) -> bool {
        (self.check)(data)
    }
}

/// Continuation bytes following each lead byte; 0xFF marks bytes that can
/// never start a sequence.
const TRAILING_BYTES: [u8; 256] = {
    let mut table = [0xFFu8; 256];
    let mut b = 0;
    while b < 256 {
        table[b] = match b {
            0x00..=0x7F => 0,
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            0xF8..=0xFB => 4,
            0xFC..=0xFD => 5,
            _ => 0xFF,
        };
        b += 1;
    }
    table
};

/// Smallest code point that needs `n + 1` bytes
const MIN_FOR_TRAILING: [u32; 6] = [0, 0x80, 0x800, 0x1_0000, 0x20_0000, 0x400_0000];

/// Decode the sequence at the start of `data`. Returns the code point and
/// sequence length, or `None` when it is truncated, has a bad continuation
/// byte, or is overlong.
fn decode_sequence(data: &[u8], max_trailing: u8) -> Option<(u32, usize)> {
    let lead = *data.first()?;
    let trailing = TRAILING_BYTES[lead as usize];
    if trailing > max_trailing {
        return None;
    }
    let len = trailing as usize + 1;
    let sequence = data.get(..len)?;

    let mut value = if trailing == 0 {
        lead as u32
    } else {
        lead as u32 & (0x7F >> len)
    };
    for &b in &sequence[1..] {
        if b & 0xC0 != 0x80 {
            return None;
        }
        value = (value << 6) | (b & 0x3F) as u32;
    }
    if value < MIN_FOR_TRAILING[trailing as usize] {
        return None;
    }
    Some((value, len))
}

/// Classic table-driven validator: decode each sequence, then reject
/// surrogates and anything above U+10FFFF.
pub fn width_table(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        let Some((value, len)) = decode_sequence(&data[i..], 3) else {
            return false;
        };
        if (0xD800..=0xDFFF).contains(&value) || value > 0x10FFFF {
            return false;
        }
        i += len;
    }
    true
}

const DFA_ACCEPT: u8 = 0;
const DFA_REJECT: u8 = 12;

/// Byte to character class
#[rustfmt::skip]
const DFA_CLASSES: [u8; 256] = [
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,  9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,
    7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,  7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,
    8,8,2,2,2,2,2,2,2,2,2,2,2,2,2,2,  2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,
    10,3,3,3,3,3,3,3,3,3,3,3,3,4,3,3, 11,6,6,6,5,8,8,8,8,8,8,8,8,8,8,8,
];

/// (state + class) to state; states are premultiplied by 12
#[rustfmt::skip]
const DFA_TRANSITIONS: [u8; 108] = [
    0,12,24,36,60,96,84,12,12,12,48,72, 12,12,12,12,12,12,12,12,12,12,12,12,
    12, 0,12,12,12,12,12, 0,12, 0,12,12, 12,24,12,12,12,12,12,24,12,24,12,12,
    12,12,12,12,12,12,12,24,12,12,12,12, 12,24,12,12,12,12,12,12,12,24,12,12,
    12,12,12,12,12,12,12,36,12,36,12,12, 12,36,12,12,12,12,12,36,12,36,12,12,
    12,36,12,12,12,12,12,12,12,12,12,12,
];

/// Björn Höhrmann's byte-at-a-time DFA over character classes.
pub fn hoehrmann(data: &[u8]) -> bool {
    let mut state = DFA_ACCEPT;
    for &b in data {
        state = DFA_TRANSITIONS[(state + DFA_CLASSES[b as usize]) as usize];
        if state == DFA_REJECT {
            return false;
        }
    }
    state == DFA_ACCEPT
}

const SHIFT_BITS: u32 = 6;
const SHIFT_STATES: usize = 10;
const SHIFT_ERROR: u64 = 0;
const SHIFT_ACCEPT: u64 = SHIFT_BITS as u64;

/// Shift-based DFA: every transition for one byte packed into a `u64`,
/// each target premultiplied by the bit width so the next state is a
/// single shift. State 0 is the error sink and 1 the accept state.
static SHIFT_TRANSITIONS: [u64; 256] = {
    let mut table = [0u64; 256];
    let mut b = 0;
    while b < 256 {
        let mut to = [0u64; SHIFT_STATES];
        to[1] = match b {
            0x00..=0x7F => 1,
            0xC2..=0xDF => 2,
            0xE0 => 3,
            0xE1..=0xEC | 0xEE..=0xEF => 4,
            0xED => 5,
            0xF0 => 6,
            0xF4 => 7,
            0xF1..=0xF3 => 8,
            _ => 0,
        };
        to[2] = if matches!(b, 0x80..=0xBF) { 1 } else { 0 };
        to[3] = if matches!(b, 0xA0..=0xBF) { 9 } else { 0 };
        to[4] = if matches!(b, 0x80..=0xBF) { 2 } else { 0 };
        to[5] = if matches!(b, 0x80..=0x9F) { 9 } else { 0 };
        to[6] = if matches!(b, 0x90..=0xBF) { 4 } else { 0 };
        to[7] = if matches!(b, 0x80..=0x8F) { 4 } else { 0 };
        to[8] = if matches!(b, 0x80..=0xBF) { 9 } else { 0 };
        to[9] = to[2];

        let mut bits = 0u64;
        let mut j = SHIFT_STATES;
        while j > 0 {
            j -= 1;
            bits = (bits << SHIFT_BITS) | to[j];
        }
        table[b] = bits * SHIFT_BITS as u64;
        b += 1;
    }
    table
};

/// Run the shift DFA over 16-byte chunks, checking for the error sink once
/// per chunk.
pub fn shift_dfa(data: &[u8]) -> bool {
    let mask = (1u64 << SHIFT_BITS) - 1;
    let mut state = SHIFT_ACCEPT;
    for chunk in data.chunks(16) {
        for &b in chunk {
            state = SHIFT_TRANSITIONS[b as usize].wrapping_shr(state as u32);
        }
        if state & mask == SHIFT_ERROR {
            return false;
        }
    }
    state & mask == SHIFT_ACCEPT
}

/// Decoder that accepts surrogates and code points up to 0x7FFFFFFF, the
/// way several C library converters do. Decodes into a scratch buffer.
#[derive(Debug, Default)]
pub struct Lenient {
    scratch: Vec<u32>,
}

impl Lenient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Validator for Lenient {
    fn name(&self) -> &str {
        "lenient"
    }

    fn ours(&self) -> bool {
        false
    }

    fn prepare(&mut self, len: usize) {
        self.scratch.clear();
        self.scratch.reserve(len);
    }

    fn validate(&mut self, data: &[u8]) -> bool {
        self.scratch.clear();
        let mut i = 0;
        while i < data.len() {
            let Some((value, len)) = decode_sequence(&data[i..], 5) else {
                return false;
            };
            self.scratch.push(value);
            i += len;
        }
        true
    }
}

/// Every validator, ours first. `include_lenient` adds the lenient decoder.
pub fn create_all(include_lenient: bool) -> Vec<Box<dyn Validator>> {
    let mut validators: Vec<Box<dyn Validator>> = vec![
        Box::new(FnValidator::new("verbose", true, crate::scalar::validate_traced)),
        Box::new(FnValidator::new("vector", true, crate::simd::validate)),
        Box::new(FnValidator::new("scalar", true, crate::scalar::validate)),
        Box::new(FnValidator::new("portable", true, crate::simd::validate_portable)),
        Box::new(FnValidator::new("std", false, |data| std::str::from_utf8(data).is_ok())),
        Box::new(FnValidator::new("width-table", false, width_table)),
        Box::new(FnValidator::new("hoehrmann", false, hoehrmann)),
        Box::new(FnValidator::new("shift-dfa", false, shift_dfa)),
    ];
    if include_lenient {
        validators.push(Box::new(Lenient::new()));
    }
    validators
}

/// Names accepted by `-c`.
pub fn available_names() -> Vec<String> {
    create_all(true).iter().map(|v| v.name().to_string()).collect()
}
