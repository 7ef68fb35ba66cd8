mod common;

use banzhaf_core::{enumerate_exact, MonteCarloEstimator};

#[test]
fn sampled_index_converges_to_exact_enumeration() {
    let body = common::uneven_body();
    let exact = enumerate_exact(&body).unwrap().normalize().unwrap();
    let flat = body.flat();

    let coarse = MonteCarloEstimator::new(&flat, 2_000)
        .run_seeded(17)
        .normalize()
        .unwrap();
    let fine = MonteCarloEstimator::new(&flat, 200_000)
        .run_parallel(17, 4)
        .normalize()
        .unwrap();

    let coarse_err = coarse.max_abs_diff(&exact).unwrap();
    let fine_err = fine.max_abs_diff(&exact).unwrap();
    assert!(coarse_err < 0.05, "coarse error {coarse_err}");
    assert!(fine_err < 0.01, "fine error {fine_err}");
    assert!(fine_err < coarse_err, "{fine_err} !< {coarse_err}");
}

#[test]
fn exact_index_ranks_members_by_weight() {
    let body = common::uneven_body();
    let exact = enumerate_exact(&body).unwrap().normalize().unwrap();
    let weights = exact.weights();
    for pair in weights.windows(2) {
        assert!(pair[0] >= pair[1], "{weights:?}");
    }
    assert!((exact.sum() - 1.0).abs() < 1e-12);
}
