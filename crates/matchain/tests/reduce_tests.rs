use matchain::prelude::*;
use matchain::{LargestContraction, PairingStrategy, SlotInfo, Strided};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn filled(height: usize, width: usize, seed: i64) -> Matrix<i64> {
    let data = (0..height * width)
        .map(|k| (k as i64 * 3 + seed) % 5 - 2)
        .collect();
    Matrix::from_vec(height, width, data).unwrap()
}

fn naive_mul(a: &Matrix<i64>, b: &Matrix<i64>) -> Matrix<i64> {
    let (h, k, w) = (a.height(), a.width(), b.width());
    let mut out = vec![0i64; h * w];
    for i in 0..h {
        for j in 0..w {
            for p in 0..k {
                out[i * w + j] += a.get(i, p) * b.get(p, j);
            }
        }
    }
    Matrix::from_vec(h, w, out).unwrap()
}

/// Operands `d[0] x d[1], d[1] x d[2], ...`.
fn chain_operands(dims: &[usize]) -> Vec<Matrix<i64>> {
    dims.windows(2)
        .enumerate()
        .map(|(s, d)| filled(d[0], d[1], s as i64))
        .collect()
}

fn product_of(ms: &[Matrix<i64>]) -> ProductChain<i64> {
    let mut chain = (&ms[0]).try_mul(&ms[1]).unwrap();
    for m in &ms[2..] {
        chain.push(m).unwrap();
    }
    chain
}

fn sequential(ms: &[Matrix<i64>]) -> Matrix<i64> {
    ms[1..].iter().fold(ms[0].clone(), |acc, m| naive_mul(&acc, m))
}

/// Records every selection and checks it against the busy markers it saw.
#[derive(Debug, Default)]
struct Probe {
    calls: Mutex<Vec<(Vec<SlotInfo>, Vec<usize>)>>,
}

impl PairingStrategy for Probe {
    fn select(&self, slots: &[SlotInfo]) -> Vec<usize> {
        let picks = LargestContraction.select(slots);
        let mut taken = vec![false; slots.len()];
        for &i in &picks {
            assert!(!slots[i].busy && !slots[i + 1].busy, "picked busy pair {i}");
            assert!(!taken[i] && !taken[i + 1], "overlapping pair {i}");
            taken[i] = true;
            taken[i + 1] = true;
        }
        self.calls.lock().unwrap().push((slots.to_vec(), picks.clone()));
        picks
    }
}

/// Proposes overlapping and out-of-range pairs.
#[derive(Debug)]
struct Rogue;

impl PairingStrategy for Rogue {
    fn select(&self, slots: &[SlotInfo]) -> Vec<usize> {
        vec![0, 0, 1, 1, 2, slots.len(), 99]
    }
}

/// Never proposes anything.
#[derive(Debug)]
struct Idle;

impl PairingStrategy for Idle {
    fn select(&self, _slots: &[SlotInfo]) -> Vec<usize> {
        Vec::new()
    }
}

#[test]
fn test_greedy_pairs_widest_contraction_first() {
    init_logs();
    let ms = chain_operands(&[3, 5, 2, 8, 4, 6, 3]);
    let probe = Arc::new(Probe::default());
    let chain = product_of(&ms).with_strategy(probe.clone());
    assert_eq!(chain.len(), 6);
    assert_eq!(chain.materialize().unwrap(), sequential(&ms));

    let calls = probe.calls.lock().unwrap();
    // widths 5, 2, 8, 4, 6, 3: width 8 first, then 6, then 5
    assert_eq!(calls[0].1, vec![2, 4, 0]);
    // three operands left with widths 2, 4, 3
    assert_eq!(
        calls[1].0.iter().map(|s| s.size).collect::<Vec<_>>(),
        vec![2, 4, 3]
    );
    assert_eq!(calls[1].1, vec![1]);
    assert_eq!(calls.len(), 2);
    for (slots, _) in calls.iter() {
        assert!(slots.iter().all(|s| !s.busy));
    }
}

#[test]
fn test_long_chain_never_picks_overlapping_pairs() {
    let dims: Vec<usize> = (0..17).map(|k| 2 + k % 5).collect();
    let ms = chain_operands(&dims);
    let probe = Arc::new(Probe::default());
    let got = product_of(&ms)
        .with_strategy(probe.clone())
        .materialize()
        .unwrap();
    assert_eq!(got, sequential(&ms));
    assert!(!probe.calls.lock().unwrap().is_empty());
}

#[test]
fn test_rogue_picks_are_rejected() {
    init_logs();
    let ms = chain_operands(&[4, 3, 6, 2, 5, 3, 4]);
    let got = product_of(&ms)
        .with_strategy(Arc::new(Rogue))
        .materialize()
        .unwrap();
    assert_eq!(got, sequential(&ms));
}

#[test]
fn test_idle_strategy_still_progresses() {
    let ms = chain_operands(&[2, 3, 4, 3, 2, 5]);
    let got = product_of(&ms)
        .with_strategy(Arc::new(Idle))
        .materialize()
        .unwrap();
    assert_eq!(got, sequential(&ms));

    let sums: Vec<Matrix<i64>> = (0..5).map(|s| filled(3, 3, s)).collect();
    let mut chain = (&sums[0]).try_add(&sums[1]).unwrap();
    for m in &sums[2..] {
        chain.push(m).unwrap();
    }
    let got = chain.with_strategy(Arc::new(Idle)).materialize().unwrap();
    let expect: Vec<i64> = (0..9)
        .map(|k| sums.iter().map(|m| m.as_slice()[k]).sum())
        .collect();
    assert_eq!(got.as_slice(), &expect[..]);
}

#[test]
fn test_strided_sum_over_odd_operand_count() {
    let ms: Vec<Matrix<i64>> = (0..7).map(|s| filled(5, 4, s)).collect();
    let mut chain = (&ms[0]).try_add(&ms[1]).unwrap();
    for m in &ms[2..] {
        chain.push(m).unwrap();
    }
    let got = chain.with_strategy(Arc::new(Strided)).materialize().unwrap();
    let expect: Vec<i64> = (0..20)
        .map(|k| ms.iter().map(|m| m.as_slice()[k]).sum())
        .collect();
    assert_eq!(got.as_slice(), &expect[..]);
}

#[test]
fn test_large_operands_use_blocked_pairs() {
    // 120 x 120 results cross the default block, tiles run in parallel
    let ms = chain_operands(&[120, 120, 120, 120, 120]);
    let got = product_of(&ms).materialize().unwrap();
    assert_eq!(got, sequential(&ms));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn product_chain_is_order_independent(
        dims in prop::collection::vec(1usize..7, 3..9),
        block in 1usize..4,
    ) {
        let ms = chain_operands(&dims);
        let got = product_of(&ms)
            .with_config(Config::default().with_block(block))
            .materialize()
            .unwrap();
        prop_assert_eq!(got, sequential(&ms));
    }

    #[test]
    fn sum_chain_matches_elementwise(
        height in 1usize..6,
        width in 1usize..6,
        count in 2usize..9,
    ) {
        let ms: Vec<Matrix<i64>> = (0..count)
            .map(|s| filled(height, width, s as i64))
            .collect();
        let mut chain = (&ms[0]).try_add(&ms[1]).unwrap();
        for m in &ms[2..] {
            chain.push(m).unwrap();
        }
        let got = chain.materialize().unwrap();
        let expect: Vec<i64> = (0..height * width)
            .map(|k| ms.iter().map(|m| m.as_slice()[k]).sum())
            .collect();
        prop_assert_eq!(got.as_slice(), &expect[..]);
    }
}
