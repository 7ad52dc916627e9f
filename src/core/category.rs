//! Context-free byte categories
//!
//! Every byte value maps to a small bitmask describing what it may be when
//! looked at in isolation. The mapping is total and knows nothing about the
//! bytes around it; context enters later through requirement masks.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask over the seven byte categories.
///
/// A byte may carry several flags at once: `0x90` is both in the `90..BF`
/// and the `80..9F` restricted continuation ranges.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Category(u8);

impl Category {
    /// No flags at all
    pub const EMPTY: Category = Category(0);
    /// ASCII or a legal lead byte
    pub const START: Category = Category(0x01);
    /// Any continuation byte (80..BF)
    pub const N_LAST: Category = Category(0x02);
    /// Continuation byte restricted to A0..BF (after E0)
    pub const CONT_A0_BF: Category = Category(0x04);
    /// Continuation byte restricted to 80..9F (after ED)
    pub const CONT_80_9F: Category = Category(0x08);
    /// Continuation byte restricted to 90..BF (after F0)
    pub const CONT_90_BF: Category = Category(0x10);
    /// Continuation byte restricted to 80..8F (after F4)
    pub const CONT_80_8F: Category = Category(0x20);
    /// Never carried by any byte, so a requirement for it always fails
    pub const IMPOSSIBLE: Category = Category(0x40);

    const NAMES: [(Category, &'static str); 7] = [
        (Category::START, "START"),
        (Category::N_LAST, "N_LAST"),
        (Category::CONT_A0_BF, "A0BF"),
        (Category::CONT_80_9F, "809F"),
        (Category::CONT_90_BF, "90BF"),
        (Category::CONT_80_8F, "808F"),
        (Category::IMPOSSIBLE, "IMPOSSIBLE"),
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Category(bits)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Category) -> Category {
        Category(self.0 | other.0)
    }

    /// True when every flag of `other` is also set here
    #[inline]
    pub const fn contains(self, other: Category) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when this byte category meets the `required` mask.
    ///
    /// An empty requirement is met by anything.
    #[inline]
    pub const fn satisfies(self, required: Category) -> bool {
        self.contains(required)
    }
}

impl BitOr for Category {
    type Output = Category;

    fn bitor(self, rhs: Category) -> Category {
        self.union(rhs)
    }
}

impl BitOrAssign for Category {
    fn bitor_assign(&mut self, rhs: Category) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Category {
    type Output = Category;

    fn bitand(self, rhs: Category) -> Category {
        Category(self.0 & rhs.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({})", self)
    }
}

/// Classify a single byte.
pub const fn classify(byte: u8) -> Category {
    match byte {
        0x00..=0x7F => Category::START,
        0x80..=0x8F => Category(Category::N_LAST.0 | Category::CONT_80_9F.0 | Category::CONT_80_8F.0),
        0x90..=0x9F => Category(Category::N_LAST.0 | Category::CONT_80_9F.0 | Category::CONT_90_BF.0),
        0xA0..=0xBF => Category(Category::N_LAST.0 | Category::CONT_A0_BF.0 | Category::CONT_90_BF.0),
        0xC0..=0xC1 => Category::EMPTY,
        0xC2..=0xF4 => Category::START,
        0xF5..=0xFF => Category::EMPTY,
    }
}

/// Coarse category per high nibble, used by the lane classifier.
///
/// Nibbles C..F carry no flags here: the legal lead range C2..F4 does not
/// line up with nibble boundaries and is matched separately.
pub(crate) const CATEGORY_BY_HIGH_NIBBLE: [u8; 16] = {
    let mut table = [0u8; 16];
    let mut nibble = 0;
    while nibble < 0xC {
        table[nibble] = classify((nibble as u8) << 4).bits();
        nibble += 1;
    }
    table
};

/// `byte - LEAD_BIAS`, read as a signed lane, is below `LEAD_LIMIT` exactly
/// for bytes C2..=F4.
pub(crate) const LEAD_BIAS: u8 = 0xC2 - 0x80;
pub(crate) const LEAD_LIMIT: i8 = (0xF4u8 - LEAD_BIAS).wrapping_add(1) as i8;
