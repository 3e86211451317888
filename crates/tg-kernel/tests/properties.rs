//! Whole-dispatch properties of the tiled kernel: agreement with the naive
//! product, exact partition of C across lanes, and run-to-run determinism.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use tg_kernel::{
    DispatchConfig, Dim2, GemmBackend, GemmParams, LaneKernel, MatrixBuf, ReferenceBackend,
    TileShape, TiledCpuBackend, Tiling,
};

type Narrow = Tiling<1, 2, 2, 1, 1>;
type Wide = Tiling<4, 2, 1, 2, 2>;

/// A tile-multiple problem: (m, n, k, row pitch padding of A, B, C).
fn arb_problem<T: TileShape>() -> impl Strategy<Value = (usize, usize, usize, [usize; 3])> {
    (1usize..4, 1usize..4, 1usize..5, [0usize..3, 0usize..3, 0usize..3]).prop_map(
        |(gm, gn, gk, pad)| {
            (
                gm * T::TILE_M,
                gn * T::TILE_N,
                gk * T::TILE_K,
                [4 * pad[0], 4 * pad[1], 4 * pad[2]],
            )
        },
    )
}

fn matrix(rows: usize, cols: usize, pad: usize, values: &[f32]) -> MatrixBuf {
    let data: Vec<f32> = (0..rows * cols).map(|i| values[i % values.len()]).collect();
    MatrixBuf::from_rows_padded(&data, rows, cols, cols + pad).unwrap()
}

fn check_correct<T: LaneKernel>(
    (m, n, k, pad): (usize, usize, usize, [usize; 3]),
    values: &[f32],
    threads: usize,
) -> Result<(), TestCaseError> {
    let a = matrix(m, k, pad[0], values);
    let b = matrix(k, n, pad[1], &values.iter().rev().copied().collect::<Vec<_>>());
    let mut expected = MatrixBuf::zeros_with_stride(m, n, n + pad[2]).unwrap();
    let mut got = expected.clone();

    ReferenceBackend::new().sgemm(&a, &b, &mut expected).unwrap();
    TiledCpuBackend::<T>::new(DispatchConfig::default().with_threads(threads))
        .sgemm(&a, &b, &mut got)
        .unwrap();

    let eps = k as f32 * 1e-5 * a.max_abs().max(1.0) * b.max_abs().max(1.0);
    for (e, g) in expected.to_dense().iter().zip(got.to_dense()) {
        prop_assert!((e - g).abs() <= eps, "expected {}, got {}, eps {}", e, g, eps);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn narrow_tiling_matches_reference(
        problem in arb_problem::<Narrow>(),
        values in prop::collection::vec(-4.0f32..4.0, 1..32),
        threads in 1usize..4,
    ) {
        check_correct::<Narrow>(problem, &values, threads)?;
    }

    #[test]
    fn wide_tiling_matches_reference(
        problem in arb_problem::<Wide>(),
        values in prop::collection::vec(-4.0f32..4.0, 1..32),
        threads in 1usize..4,
    ) {
        check_correct::<Wide>(problem, &values, threads)?;
    }

    #[test]
    fn lanes_partition_the_output((m, n, _k, pad) in arb_problem::<Wide>()) {
        let stride_c_vec = (n + pad[2]) / 4;
        let mut hits = vec![0u32; m * stride_c_vec];
        let grid = Wide::grid(m, n);
        let wg = Wide::WORK_GROUP;
        for gy in 0..grid.y {
            for gx in 0..grid.x {
                for ly in 0..wg.y {
                    for lx in 0..wg.x {
                        let offsets =
                            Wide::output_offsets(Dim2::new(gx, gy), Dim2::new(lx, ly), stride_c_vec);
                        for off in offsets {
                            hits[off] += 1;
                        }
                    }
                }
            }
        }
        for r in 0..m {
            for c in 0..stride_c_vec {
                let expected = u32::from(c < n / 4);
                prop_assert_eq!(hits[r * stride_c_vec + c], expected, "row {} vec col {}", r, c);
            }
        }
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let (m, n, k) = (2 * Wide::TILE_M, Wide::TILE_N, 3 * Wide::TILE_K);
    let values: Vec<f32> = (0..97).map(|i| ((i * 31) % 17) as f32 / 3.0 - 2.5).collect();
    let a = matrix(m, k, 4, &values);
    let b = matrix(k, n, 0, &values);
    let backend = TiledCpuBackend::<Wide>::new(DispatchConfig::default().with_threads(2));

    let mut first = MatrixBuf::zeros(m, n).unwrap();
    backend.sgemm(&a, &b, &mut first).unwrap();
    for _ in 0..3 {
        let mut again = MatrixBuf::zeros(m, n).unwrap();
        backend.sgemm(&a, &b, &mut again).unwrap();
        let same = first
            .to_dense()
            .iter()
            .zip(again.to_dense())
            .all(|(x, y)| x.to_bits() == y.to_bits());
        assert!(same);
    }
}

#[test]
fn single_k_block_composes() {
    // K = TILE_K versus K = 3 * TILE_K computed as the sum of three
    // single-block products; small integers keep both exact.
    type T = Wide;
    let (m, n, blocks) = (T::TILE_M, T::TILE_N, 3);
    let k = blocks * T::TILE_K;
    let a_data: Vec<f32> = (0..m * k).map(|i| (i % 7) as f32 - 3.0).collect();
    let b_data: Vec<f32> = (0..k * n).map(|i| (i % 5) as f32 - 2.0).collect();
    let backend = TiledCpuBackend::<T>::new(DispatchConfig::single_threaded());

    let full = backend.matmul(&a_data, &b_data, m, k, n).unwrap();

    let mut summed = vec![0.0f32; m * n];
    for blk in 0..blocks {
        let lo = blk * T::TILE_K;
        let a_part: Vec<f32> = (0..m)
            .flat_map(|r| a_data[r * k + lo..r * k + lo + T::TILE_K].to_vec())
            .collect();
        let b_part = b_data[lo * n..(lo + T::TILE_K) * n].to_vec();
        let part = backend.matmul(&a_part, &b_part, m, T::TILE_K, n).unwrap();
        for (acc, v) in summed.iter_mut().zip(part) {
            *acc += v;
        }
    }
    assert_eq!(full, summed);
}

#[test]
fn raw_launch_on_minimal_buffers() {
    // The last row of C needs no padding: the dispatcher must cope with a
    // short final band.
    type T = Narrow;
    let (m, n, k) = (2 * T::TILE_M, T::TILE_N, T::TILE_K);
    let params = GemmParams::new(m, n, k).with_strides(k, n, 8);
    params.validate::<T>().unwrap();

    let a = matrix(m, k, 0, &[1.0, 2.0]);
    let b = matrix(k, n, 0, &[0.5]);
    let c_len = tg_kernel::params::required_len("C", m, n, params.stride_c).unwrap();
    params.check_buffers(a.len_scalars(), b.len_scalars(), c_len).unwrap();

    let mut c = vec![tg_kernel::Float4::splat(-1.0); c_len / 4];
    TiledCpuBackend::<T>::new(DispatchConfig::default().with_threads(2))
        .launch(&params, a.as_vec4(), b.as_vec4(), &mut c);

    for r in 0..m {
        let row_sum: f32 = (0..k).map(|p| a.get(r, p) * 0.5).sum();
        assert_abs_diff_eq!(c[r * 2].x(), row_sum, epsilon = 1e-5);
        if r + 1 < m {
            assert_eq!(c[r * 2 + 1], tg_kernel::Float4::splat(-1.0));
        }
    }
}
