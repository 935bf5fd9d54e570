//! Pair selection policies for the reducer.

use std::fmt;

/// What a strategy sees of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Contracted dimension at this position (the operand's width).
    pub size: usize,
    /// A reduction task currently owns the slot.
    pub busy: bool,
}

/// Chooses which adjacent pairs collapse in one pass.
///
/// `select` returns left indices `i` of pairs `(i, i + 1)`. The reducer
/// re-validates every pick; overlapping pairs or pairs touching a busy slot
/// are dropped.
pub trait PairingStrategy: Send + Sync + fmt::Debug {
    fn select(&self, slots: &[SlotInfo]) -> Vec<usize>;
}

/// `(0, 1), (2, 3), ...` left to right, skipping pairs with a busy slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Strided;

impl PairingStrategy for Strided {
    fn select(&self, slots: &[SlotInfo]) -> Vec<usize> {
        (0..slots.len() / 2)
            .map(|p| 2 * p)
            .filter(|&i| !slots[i].busy && !slots[i + 1].busy)
            .collect()
    }
}

/// Greedy: repeatedly take the free adjacent pair whose left operand has the
/// widest contracted dimension (leftmost on ties) until no free pair is left.
#[derive(Debug, Default, Clone, Copy)]
pub struct LargestContraction;

impl PairingStrategy for LargestContraction {
    fn select(&self, slots: &[SlotInfo]) -> Vec<usize> {
        let mut busy: Vec<bool> = slots.iter().map(|s| s.busy).collect();
        let mut picks = Vec::new();
        while let Some(i) = widest_free_pair(slots, &busy) {
            busy[i] = true;
            busy[i + 1] = true;
            picks.push(i);
        }
        picks
    }
}

fn widest_free_pair(slots: &[SlotInfo], busy: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for i in 0..slots.len().saturating_sub(1) {
        if busy[i] || busy[i + 1] {
            continue;
        }
        match best {
            Some((_, size)) if slots[i].size <= size => {}
            _ => best = Some((i, slots[i].size)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(sizes: &[usize]) -> Vec<SlotInfo> {
        sizes
            .iter()
            .map(|&size| SlotInfo { size, busy: false })
            .collect()
    }

    #[test]
    fn strided_pairs_left_to_right() {
        assert_eq!(Strided.select(&slots(&[1, 1, 1, 1, 1])), vec![0, 2]);
        let mut s = slots(&[1, 1, 1, 1]);
        s[1].busy = true;
        assert_eq!(Strided.select(&s), vec![2]);
    }

    #[test]
    fn largest_contraction_prefers_wide_then_leftmost() {
        // sizes at pair starts: 2, 9, 3, 9, 1
        assert_eq!(
            LargestContraction.select(&slots(&[2, 9, 3, 9, 1, 4])),
            vec![1, 3]
        );
        // all equal: leftmost first, then the next disjoint one
        assert_eq!(LargestContraction.select(&slots(&[5, 5, 5, 5])), vec![0, 2]);
    }

    #[test]
    fn in_flight_slots_are_never_picked() {
        // slots 2 and 3 belong to a running task
        let mut s = slots(&[4, 1, 9, 9, 6, 2, 3]);
        s[2].busy = true;
        s[3].busy = true;
        assert_eq!(LargestContraction.select(&s), vec![4, 0]);
        assert_eq!(Strided.select(&s), vec![0, 4]);

        s[5].busy = true;
        assert_eq!(LargestContraction.select(&s), vec![0]);
        assert_eq!(Strided.select(&s), vec![0]);
    }

    #[test]
    fn nothing_to_pick() {
        assert!(LargestContraction.select(&slots(&[3])).is_empty());
        assert!(Strided.select(&[]).is_empty());
    }
}
