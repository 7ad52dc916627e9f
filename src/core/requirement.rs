//! Requirement table: what a lead byte demands of the bytes after it
//!
//! Each byte value maps to one of ten requirement states. A state expands to
//! the ordered category masks that the next one to four bytes must match;
//! a completed sequence always ends by requiring `START` again.

use super::category::Category;

/// Requirement state imposed by a byte on the positions that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Requirement {
    /// ASCII: the next byte starts something new
    Start = 0,
    /// C0, C1, F5..FF: nothing may follow
    Impossible = 1,
    /// C2..DF: one continuation byte
    Last1 = 2,
    /// E1..EC, EE, EF: two continuation bytes
    Last2 = 3,
    /// F1..F3: three continuation bytes
    Last3 = 4,
    /// E0: first continuation in A0..BF (no overlong 3-byte forms)
    FirstA0Bf = 5,
    /// ED: first continuation in 80..9F (no surrogates)
    First809F = 6,
    /// F0: first continuation in 90..BF (no overlong 4-byte forms)
    First90Bf = 7,
    /// F4: first continuation in 80..8F (nothing above U+10FFFF)
    First808F = 8,
    /// 80..BF: a continuation byte imposes nothing forward
    Nothing = 9,
}

use Category as C;

const START: &[Category] = &[C::START];
const IMPOSSIBLE: &[Category] = &[C::IMPOSSIBLE];
const LAST1: &[Category] = &[C::N_LAST, C::START];
const LAST2: &[Category] = &[C::N_LAST, C::N_LAST, C::START];
const LAST3: &[Category] = &[C::N_LAST, C::N_LAST, C::N_LAST, C::START];
const FIRST_A0_BF: &[Category] = &[C::CONT_A0_BF, C::N_LAST, C::START];
const FIRST_80_9F: &[Category] = &[C::CONT_80_9F, C::N_LAST, C::START];
const FIRST_90_BF: &[Category] = &[C::CONT_90_BF, C::N_LAST, C::N_LAST, C::START];
const FIRST_80_8F: &[Category] = &[C::CONT_80_8F, C::N_LAST, C::N_LAST, C::START];
const NOTHING: &[Category] = &[];

/// Longest forward reach of any requirement state.
pub const MAX_REACH: usize = 4;

impl Requirement {
    pub const ALL: [Requirement; 10] = [
        Requirement::Start,
        Requirement::Impossible,
        Requirement::Last1,
        Requirement::Last2,
        Requirement::Last3,
        Requirement::FirstA0Bf,
        Requirement::First809F,
        Requirement::First90Bf,
        Requirement::First808F,
        Requirement::Nothing,
    ];

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Masks the following bytes must match, nearest first.
    pub const fn next_items(self) -> &'static [Category] {
        match self {
            Requirement::Start => START,
            Requirement::Impossible => IMPOSSIBLE,
            Requirement::Last1 => LAST1,
            Requirement::Last2 => LAST2,
            Requirement::Last3 => LAST3,
            Requirement::FirstA0Bf => FIRST_A0_BF,
            Requirement::First809F => FIRST_80_9F,
            Requirement::First90Bf => FIRST_90_BF,
            Requirement::First808F => FIRST_80_8F,
            Requirement::Nothing => NOTHING,
        }
    }
}

/// Requirement state a byte imposes when it appears where a lead is read.
pub const fn requirement_after(lead: u8) -> Requirement {
    match lead {
        0x00..=0x7F => Requirement::Start,
        0x80..=0xBF => Requirement::Nothing,
        0xC0..=0xC1 => Requirement::Impossible,
        0xC2..=0xDF => Requirement::Last1,
        0xE0 => Requirement::FirstA0Bf,
        0xED => Requirement::First809F,
        0xE1..=0xEF => Requirement::Last2,
        0xF0 => Requirement::First90Bf,
        0xF1..=0xF3 => Requirement::Last3,
        0xF4 => Requirement::First808F,
        0xF5..=0xFF => Requirement::Impossible,
    }
}

/// Requirement state per high nibble, before the exact-byte corrections.
///
/// C0/C1 and F5..FF are left to the empty-category check; E0, ED, F0 and
/// F4 are patched with [`SPECIAL_LEADS`].
pub(crate) const STATE_BY_HIGH_NIBBLE: [u8; 16] = {
    let mut table = [0u8; 16];
    let mut nibble = 0;
    while nibble < 16 {
        let state = match nibble {
            0x0..=0x7 => Requirement::Start,
            0x8..=0xB => Requirement::Nothing,
            0xC | 0xD => Requirement::Last1,
            0xE => Requirement::Last2,
            _ => Requirement::Last3,
        };
        table[nibble] = state.index();
        nibble += 1;
    }
    table
};

/// Single bytes whose requirement differs from their nibble's default.
pub(crate) const SPECIAL_LEADS: [(u8, Requirement); 4] = [
    (0xE0, Requirement::FirstA0Bf),
    (0xED, Requirement::First809F),
    (0xF0, Requirement::First90Bf),
    (0xF4, Requirement::First808F),
];

/// `NEXT_ITEM_TABLES[k][state]` is the mask a state demands `k + 1` bytes
/// ahead, or zero when its sequence is shorter.
pub(crate) const NEXT_ITEM_TABLES: [[u8; 16]; MAX_REACH] = {
    let mut tables = [[0u8; 16]; MAX_REACH];
    let mut s = 0;
    while s < Requirement::ALL.len() {
        let state = Requirement::ALL[s];
        let items = state.next_items();
        let mut k = 0;
        while k < items.len() {
            tables[k][state.index() as usize] = items[k].bits();
            k += 1;
        }
        s += 1;
    }
    tables
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::classify;

    #[test]
    fn test_table_ranges() {
        assert_eq!(requirement_after(b'A'), Requirement::Start);
        assert_eq!(requirement_after(0x80), Requirement::Nothing);
        assert_eq!(requirement_after(0xBF), Requirement::Nothing);
        assert_eq!(requirement_after(0xC1), Requirement::Impossible);
        assert_eq!(requirement_after(0xC2), Requirement::Last1);
        assert_eq!(requirement_after(0xDF), Requirement::Last1);
        assert_eq!(requirement_after(0xE0), Requirement::FirstA0Bf);
        assert_eq!(requirement_after(0xEC), Requirement::Last2);
        assert_eq!(requirement_after(0xED), Requirement::First809F);
        assert_eq!(requirement_after(0xEE), Requirement::Last2);
        assert_eq!(requirement_after(0xF0), Requirement::First90Bf);
        assert_eq!(requirement_after(0xF3), Requirement::Last3);
        assert_eq!(requirement_after(0xF4), Requirement::First808F);
        assert_eq!(requirement_after(0xF5), Requirement::Impossible);
        assert_eq!(requirement_after(0xFF), Requirement::Impossible);
    }

    #[test]
    fn test_sequences_end_with_start() {
        for state in Requirement::ALL {
            let items = state.next_items();
            assert!(items.len() <= MAX_REACH);
            match state {
                Requirement::Nothing => assert!(items.is_empty()),
                Requirement::Impossible => assert_eq!(items, &[Category::IMPOSSIBLE]),
                _ => assert_eq!(items.last(), Some(&Category::START), "{:?}", state),
            }
            for item in items {
                assert_eq!(item.bits().count_ones(), 1, "{:?}", state);
            }
        }
    }

    #[test]
    fn test_ordinals_match_all() {
        for (i, state) in Requirement::ALL.iter().enumerate() {
            assert_eq!(state.index() as usize, i);
        }
    }

    #[test]
    fn test_nibble_table_with_corrections_matches_scalar() {
        for byte in 0..=0xFFu8 {
            let mut state = STATE_BY_HIGH_NIBBLE[(byte >> 4) as usize];
            for (special, replacement) in SPECIAL_LEADS {
                if byte == special {
                    state = replacement.index();
                }
            }
            if classify(byte).is_empty() {
                state = Requirement::Impossible.index();
            }
            assert_eq!(state, requirement_after(byte).index(), "byte {:#04x}", byte);
        }
    }

    #[test]
    fn test_next_item_tables() {
        let last3 = Requirement::Last3.index() as usize;
        assert_eq!(NEXT_ITEM_TABLES[0][last3], Category::N_LAST.bits());
        assert_eq!(NEXT_ITEM_TABLES[3][last3], Category::START.bits());
        let nothing = Requirement::Nothing.index() as usize;
        for table in NEXT_ITEM_TABLES {
            assert_eq!(table[nothing], 0);
            assert!(table[10..].iter().all(|&b| b == 0));
        }
    }
}
