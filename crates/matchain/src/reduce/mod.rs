//! Pairwise reduction of an ordered operand list.
//!
//! Each pass picks disjoint adjacent pairs under the list lock, marks their
//! slots busy, and combines every pair as its own task on the rayon pool.
//! Finished tasks splice their result back in place of the pair, located by
//! slot id. The lock is never held while a pair is being computed.

pub mod pairing;

use crate::matrix::Matrix;
use matchain_core::{Error, FailureKind, MatrixView, Result, Scalar, SharedView, TaskFailure};
use matchain_kernels::run_task;
use pairing::{PairingStrategy, SlotInfo};
use parking_lot::Mutex;
use std::sync::Arc;

struct Slot<T> {
    id: u64,
    view: SharedView<T>,
    size: usize,
    busy: bool,
}

struct SlotList<T> {
    slots: Vec<Slot<T>>,
    next_id: u64,
    failures: Vec<TaskFailure>,
}

impl<T: Scalar> SlotList<T> {
    fn push(&mut self, view: SharedView<T>) {
        let id = self.next_id;
        self.next_id += 1;
        let size = view.width();
        self.slots.push(Slot {
            id,
            view,
            size,
            busy: false,
        });
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    fn infos(&self) -> Vec<SlotInfo> {
        self.slots
            .iter()
            .map(|s| SlotInfo {
                size: s.size,
                busy: s.busy,
            })
            .collect()
    }

    /// Replaces the pair `(left, right)` by `view`.
    fn splice(
        &mut self,
        left: u64,
        right: u64,
        view: SharedView<T>,
    ) -> std::result::Result<(), TaskFailure> {
        let pos = self.position(left).ok_or_else(|| missing_slot(left))?;
        if self.slots.get(pos + 1).map(|s| s.id) != Some(right) {
            return Err(missing_slot(right));
        }
        self.slots.remove(pos + 1);
        let id = self.next_id;
        self.next_id += 1;
        let slot = &mut self.slots[pos];
        slot.id = id;
        slot.size = view.width();
        slot.view = view;
        slot.busy = false;
        Ok(())
    }

    fn release(&mut self, ids: [u64; 2]) {
        for slot in &mut self.slots {
            if ids.contains(&slot.id) {
                slot.busy = false;
            }
        }
    }
}

fn missing_slot(id: u64) -> TaskFailure {
    TaskFailure::new(
        FailureKind::Logic,
        format!("slot {id} is no longer adjacent to its pair"),
    )
}

/// A pair claimed for one task.
struct Claim<T> {
    ids: [u64; 2],
    lhs: SharedView<T>,
    rhs: SharedView<T>,
}

/// Ordered operand list plus the strategy that collapses it.
pub(crate) struct PairReducer<T> {
    list: Mutex<SlotList<T>>,
    strategy: Arc<dyn PairingStrategy>,
}

impl<T: Scalar> PairReducer<T> {
    pub(crate) fn new(strategy: Arc<dyn PairingStrategy>) -> Self {
        Self {
            list: Mutex::new(SlotList {
                slots: Vec::new(),
                next_id: 0,
                failures: Vec::new(),
            }),
            strategy,
        }
    }

    pub(crate) fn push(&mut self, view: SharedView<T>) {
        self.list.get_mut().push(view);
    }

    /// Moves every operand of `other` to the end of this list, in order.
    pub(crate) fn append(&mut self, other: Self) {
        let list = self.list.get_mut();
        for slot in other.list.into_inner().slots {
            list.push(slot.view);
        }
    }

    pub(crate) fn set_strategy(&mut self, strategy: Arc<dyn PairingStrategy>) {
        self.strategy = strategy;
    }

    pub(crate) fn len(&self) -> usize {
        self.list.lock().slots.len()
    }

    /// Collapses the list with `combine` until at most two operands remain,
    /// then combines those into the result. A single operand is copied.
    ///
    /// # Errors
    /// `Error::TaskFailed` as soon as a pass had failing tasks; the failed
    /// pairs stay in the list.
    pub(crate) fn reduce<F>(self, combine: F) -> Result<Matrix<T>>
    where
        F: Fn(&SharedView<T>, &SharedView<T>) -> Result<Matrix<T>> + Sync,
    {
        self.resolve(&combine)?;
        let mut rest = self.list.into_inner().slots.into_iter().map(|s| s.view);
        match (rest.next(), rest.next()) {
            (Some(lhs), Some(rhs)) => combine(&lhs, &rhs),
            (Some(single), None) => Matrix::from_view(&*single),
            (None, _) => Ok(Matrix::zeros(0, 0)),
        }
    }

    fn resolve<F>(&self, combine: &F) -> Result<()>
    where
        F: Fn(&SharedView<T>, &SharedView<T>) -> Result<Matrix<T>> + Sync,
    {
        let mut pass = 0usize;
        loop {
            let (claims, remaining) = {
                let mut list = self.list.lock();
                if list.slots.len() <= 2 {
                    return Ok(());
                }
                let claims = self.claim_pairs(&mut list);
                (claims, list.slots.len())
            };
            pass += 1;
            log::debug!(
                "reduce pass {pass}: {} pair(s) over {remaining} operands",
                claims.len()
            );

            rayon::scope(|s| {
                for claim in claims {
                    s.spawn(move |_| self.run_pair(claim, combine));
                }
            });

            let failures = std::mem::take(&mut self.list.lock().failures);
            Error::from_failures(failures)?;
        }
    }

    /// Asks the strategy for pairs, keeps the valid ones and marks them busy.
    fn claim_pairs(&self, list: &mut SlotList<T>) -> Vec<Claim<T>> {
        let picks = self.strategy.select(&list.infos());
        log::trace!("{:?} picked {picks:?}", self.strategy);
        let mut claims = Vec::with_capacity(picks.len());
        for i in picks {
            if !self.try_claim(list, i, &mut claims) {
                log::warn!(
                    "{:?} picked unavailable pair ({i}, {}), skipped",
                    self.strategy,
                    i + 1
                );
            }
        }
        if claims.is_empty() {
            if let Some(i) = (0..list.slots.len().saturating_sub(1))
                .find(|&i| !list.slots[i].busy && !list.slots[i + 1].busy)
            {
                self.try_claim(list, i, &mut claims);
            }
        }
        claims
    }

    fn try_claim(&self, list: &mut SlotList<T>, i: usize, claims: &mut Vec<Claim<T>>) -> bool {
        let free = |k: usize| list.slots.get(k).is_some_and(|s| !s.busy);
        if !free(i) || !free(i + 1) {
            return false;
        }
        let (left, right) = (&list.slots[i], &list.slots[i + 1]);
        claims.push(Claim {
            ids: [left.id, right.id],
            lhs: Arc::clone(&left.view),
            rhs: Arc::clone(&right.view),
        });
        list.slots[i].busy = true;
        list.slots[i + 1].busy = true;
        true
    }

    fn run_pair<F>(&self, claim: Claim<T>, combine: &F)
    where
        F: Fn(&SharedView<T>, &SharedView<T>) -> Result<Matrix<T>> + Sync,
    {
        let Claim { ids, lhs, rhs } = claim;
        let outcome = run_task("reduce pair", || combine(&lhs, &rhs));
        drop((lhs, rhs));

        let mut list = self.list.lock();
        let spliced = outcome.and_then(|m| {
            let view: SharedView<T> = Arc::new(m);
            list.splice(ids[0], ids[1], view)
        });
        match spliced {
            Ok(()) => log::trace!("spliced slots {ids:?}, {} left", list.slots.len()),
            Err(failure) => {
                list.release(ids);
                list.failures.push(failure);
            }
        }
    }
}

impl<T> std::fmt::Debug for PairReducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairReducer")
            .field("operands", &self.list.lock().slots.len())
            .field("strategy", &self.strategy)
            .finish()
    }
}
