//! Lane-parallel byte classification
//!
//! Maps a block of 16 bytes to their categories and to the requirement state
//! each byte imposes, using only nibble lookups, compares and selects.

use super::lanes::{ByteLanes, LANES};
use crate::core::category::{CATEGORY_BY_HIGH_NIBBLE, Category, LEAD_BIAS, LEAD_LIMIT};
use crate::core::requirement::{
    MAX_REACH, NEXT_ITEM_TABLES, Requirement, SPECIAL_LEADS, STATE_BY_HIGH_NIBBLE,
};

/// Lookup tables and constants splatted into lanes once per call.
#[derive(Clone, Copy)]
pub(crate) struct LaneTables<V> {
    category_by_nibble: V,
    state_by_nibble: V,
    pub(crate) next_items: [V; MAX_REACH],
    special_leads: [(V, V); SPECIAL_LEADS.len()],
    lead_bias: V,
    lead_limit: V,
    start: V,
    impossible_state: V,
    pub(crate) zero: V,
}

impl<V: ByteLanes> LaneTables<V> {
    #[inline(always)]
    pub(crate) unsafe fn new() -> Self {
        unsafe {
            let mut special_leads = [(V::splat(0), V::splat(0)); SPECIAL_LEADS.len()];
            for (slot, (byte, state)) in special_leads.iter_mut().zip(SPECIAL_LEADS) {
                *slot = (V::splat(byte), V::splat(state.index()));
            }

            Self {
                category_by_nibble: V::from_array(&CATEGORY_BY_HIGH_NIBBLE),
                state_by_nibble: V::from_array(&STATE_BY_HIGH_NIBBLE),
                next_items: [
                    V::from_array(&NEXT_ITEM_TABLES[0]),
                    V::from_array(&NEXT_ITEM_TABLES[1]),
                    V::from_array(&NEXT_ITEM_TABLES[2]),
                    V::from_array(&NEXT_ITEM_TABLES[3]),
                ],
                special_leads,
                lead_bias: V::splat(LEAD_BIAS),
                lead_limit: V::splat(LEAD_LIMIT as u8),
                start: V::splat(Category::START.bits()),
                impossible_state: V::splat(Requirement::Impossible.index()),
                zero: V::splat(0),
            }
        }
    }

    /// Category bits of every lane.
    #[inline(always)]
    pub(crate) unsafe fn categories(&self, block: V) -> V {
        unsafe {
            let by_nibble = V::lookup(self.category_by_nibble, block.high_nibbles());
            // C2..F4 straddle nibble boundaries; a biased signed compare
            // picks them out in one step.
            let is_lead = block.sub(self.lead_bias).lt_signed(self.lead_limit);
            by_nibble.or(is_lead.and(self.start))
        }
    }

    /// Requirement state ordinal of every lane.
    #[inline(always)]
    pub(crate) unsafe fn states(&self, block: V, categories: V) -> V {
        unsafe {
            let mut states = V::lookup(self.state_by_nibble, block.high_nibbles());
            for (byte, state) in self.special_leads {
                states = V::select(block.eq(byte), state, states);
            }
            let no_category = categories.eq(self.zero);
            V::select(no_category, self.impossible_state, states)
        }
    }
}

/// Classify a block held in a plain array.
///
/// Callers must only pick lane types the running CPU supports.
#[cfg(test)]
pub(crate) fn classify_block<V: ByteLanes>(block: &[u8; LANES]) -> ([u8; LANES], [u8; LANES]) {
    let mut categories = [0u8; LANES];
    let mut states = [0u8; LANES];
    unsafe {
        let tables = LaneTables::<V>::new();
        let lanes = V::from_array(block);
        let cats = tables.categories(lanes);
        cats.store(&mut categories);
        tables.states(lanes, cats).store(&mut states);
    }
    (categories, states)
}
