use matchain::prelude::*;
use matchain::{Error, Handoff, Shape};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn grid() -> Matrix<i64> {
    Matrix::from_rows(&[[1, 2, 3], [4, 5, 6], [7, 8, 9], [10, 11, 12]]).unwrap()
}

#[test]
fn test_matrix_constructors() {
    let m = grid();
    assert_eq!(m.shape(), Shape::dynamic(4, 3));
    assert_eq!(m.to_rows()[2], vec![7, 8, 9]);
    assert!(Matrix::<i64>::fixed(2, 2).shape().is_static());
    assert_eq!(Matrix::<f32>::try_zeros(3, 2).unwrap().as_slice(), &[0.0; 6]);
    assert!(matches!(
        Matrix::from_vec(2, 2, vec![1i64, 2, 3]),
        Err(Error::BufferLength {
            len: 3,
            height: 2,
            width: 2
        })
    ));

    let sized = m.clone().into_sized(4, 3).unwrap();
    assert!(sized.shape().is_static());
    assert_eq!(sized, m);
    assert!(matches!(
        m.into_sized(3, 4),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_transpose_writes_through() {
    let mut m = grid();
    {
        let mut t = (&mut m).transpose();
        assert_eq!(t.shape().dims(), (3, 4));
        assert_eq!(t.get(2, 1), 6);
        t.set(2, 1, 60);
    }
    assert_eq!(m.get(1, 2), 60);
}

#[test]
fn test_window_reads_and_writes_sub_block() {
    let mut m = grid();
    let spec = WindowSpec::new(1, 3, 1, 3);
    {
        let w = (&m).window(spec).unwrap();
        assert_eq!(w.shape().dims(), (2, 2));
        assert_eq!(w.get_block(0, 2, 0, 2), vec![5, 6, 8, 9]);
    }
    {
        let mut w = (&mut m).window(spec).unwrap();
        w.set(1, 0, 80);
    }
    assert_eq!(m.get(2, 1), 80);

    let err = (&m).window(WindowSpec::new(0, 2, 2, 4)).unwrap_err();
    assert_eq!(
        err,
        Error::OutOfBounds {
            rows: (0, 2),
            cols: (2, 4),
            height: 4,
            width: 3,
        }
    );
}

#[test]
fn test_diagonal_views() {
    let mut m = grid();
    let d = (&m).diagonal();
    assert_eq!(d.shape().dims(), (3, 1));
    assert_eq!(d.get_block(0, 3, 0, 1), vec![1, 5, 9]);
    (&mut m).diagonal().set(1, 0, 0);
    assert_eq!(m.get(1, 1), 0);

    let row = Matrix::from_rows(&[[2i64, 3]]).unwrap();
    let spread = row.diagonal_matrix().unwrap();
    assert_eq!(spread.shape().dims(), (2, 2));
    assert_eq!(spread.to_matrix().unwrap().to_rows(), vec![vec![2, 0], vec![0, 3]]);
}

#[test]
fn test_diagonal_matrix_of_empty_vector() {
    let column = Matrix::<i64>::zeros(0, 1).diagonal_matrix().unwrap();
    assert_eq!(column.shape().dims(), (0, 0));
    assert!(column.to_matrix().unwrap().as_slice().is_empty());

    let row = Matrix::<i64>::zeros(1, 0).diagonal_matrix().unwrap();
    assert_eq!(row.shape().dims(), (0, 0));
    assert!(row.to_matrix().unwrap().to_rows().is_empty());

    let single = Matrix::from_rows(&[[7i64]]).unwrap().diagonal_matrix().unwrap();
    assert_eq!(single.to_matrix().unwrap().to_rows(), vec![vec![7]]);
}

#[test]
fn test_composed_views_in_a_chain() {
    // (m^T)[0..2, 0..2] + diag(m) spread, all deferred
    let m = grid();
    let top = m.clone().transpose().window(WindowSpec::new(0, 2, 0, 2)).unwrap();
    let spread = m
        .clone()
        .window(WindowSpec::new(0, 2, 0, 2))
        .unwrap()
        .diagonal()
        .diagonal_matrix()
        .unwrap();
    let got = (top + spread).materialize().unwrap();
    assert_eq!(got.to_rows(), vec![vec![2, 4], vec![2, 10]]);
}

#[test]
fn test_shared_views_alias_storage() {
    let m = grid();
    let a: matchain::SharedView<i64> = Arc::new(m.clone());
    let b = m.clone().shared();
    let got = a.try_add(b).unwrap().materialize().unwrap();
    assert_eq!(got.get(3, 2), 24);
    // the chain never wrote to the shared storage
    assert_eq!(m.get(3, 2), 12);
}

#[test]
fn test_handoff_delivers_once() {
    let cell = Handoff::new();
    assert!(!cell.is_written());
    assert_eq!(cell.put(1), Ok(()));
    assert_eq!(cell.put(2), Err(2));
    assert_eq!(cell.take(), Some(1));
    assert_eq!(cell.take(), None);
}

#[test]
fn test_handoff_take_blocks_until_put() {
    let cell = Handoff::new();
    let got = thread::scope(|s| {
        let consumer = s.spawn(|| cell.take());
        thread::sleep(Duration::from_millis(20));
        cell.put(String::from("ready")).unwrap();
        consumer.join().unwrap()
    });
    assert_eq!(got.as_deref(), Some("ready"));
}

#[test]
fn test_config_from_env_and_install() {
    std::env::set_var(matchain::config::BLOCK_ENV, "16");
    std::env::set_var(matchain::config::THREADS_ENV, "not-a-number");
    let config = Config::from_env();
    assert_eq!(config.block, 16);
    assert_eq!(config.threads, 0);
    std::env::remove_var(matchain::config::BLOCK_ENV);
    std::env::remove_var(matchain::config::THREADS_ENV);

    config.install();
    // the global pool can only be sized once per process
    assert!(!config.install());
}
