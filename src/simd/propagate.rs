//! Requirement propagation across lanes
//!
//! A lane in state `s` demands `next_items(s)[k]` of the lane `k + 1` places
//! ahead. Those demands are gathered by table lookup, shifted into position
//! and ORed together. Demands that fall past the end of the block become the
//! carry for the next block.

use super::classify::LaneTables;
use super::lanes::ByteLanes;

/// Result of propagating one block of states.
#[derive(Clone, Copy)]
pub(crate) struct Propagation<V> {
    /// Mask each lane of this block must satisfy
    pub(crate) required: V,
    /// Demands on the first lanes of the following block
    pub(crate) carry: V,
}

#[inline(always)]
pub(crate) unsafe fn propagate<V: ByteLanes>(
    tables: &LaneTables<V>,
    states: V,
    carry_in: V,
) -> Propagation<V> {
    unsafe {
        let [t1, t2, t3, t4] = tables.next_items;
        let v1 = V::lookup(t1, states);
        let v2 = V::lookup(t2, states);
        let v3 = V::lookup(t3, states);
        let v4 = V::lookup(t4, states);

        let required = carry_in
            .or(v1.shift_up::<1>())
            .or(v2.shift_up::<2>())
            .or(v3.shift_up::<3>())
            .or(v4.shift_up::<4>());

        let carry = v1
            .spill::<1>()
            .or(v2.spill::<2>())
            .or(v3.spill::<3>())
            .or(v4.spill::<4>());

        Propagation { required, carry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::Category;
    use crate::core::requirement::Requirement;
    use crate::simd::lanes::{LANES, Portable};

    fn run(states: [Requirement; LANES], carry_in: [u8; LANES]) -> ([u8; LANES], [u8; LANES]) {
        unsafe {
            let tables = LaneTables::<Portable>::new();
            let states = Portable(states.map(Requirement::index));
            let out = propagate(&tables, states, Portable(carry_in));
            (out.required.0, out.carry.0)
        }
    }

    #[test]
    fn test_four_byte_lead_spills_into_carry() {
        let mut states = [Requirement::Nothing; LANES];
        states[14] = Requirement::First90Bf;
        let (required, carry) = run(states, [0; LANES]);

        assert_eq!(required[15], Category::CONT_90_BF.bits());
        assert_eq!(carry[0], Category::N_LAST.bits());
        assert_eq!(carry[1], Category::N_LAST.bits());
        assert_eq!(carry[2], Category::START.bits());
        assert!(carry[3..].iter().all(|&b| b == 0));
        assert!(required[..15].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_carry_in_lands_on_low_lanes() {
        let mut carry_in = [0; LANES];
        carry_in[0] = Category::N_LAST.bits();
        carry_in[1] = Category::START.bits();
        let (required, carry) = run([Requirement::Nothing; LANES], carry_in);

        assert_eq!(required, carry_in);
        assert_eq!(carry, [0; LANES]);
    }

    #[test]
    fn test_ascii_requires_start_everywhere() {
        let (required, carry) = run([Requirement::Start; LANES], [Category::START.bits(); LANES]);
        assert_eq!(required, [Category::START.bits(); LANES]);
        assert_eq!(carry[0], Category::START.bits());
        assert!(carry[1..].iter().all(|&b| b == 0));
    }
}
