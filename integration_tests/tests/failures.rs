mod common;

use banzhaf_core::{
    estimate, BanzhafError, BlockAxis, BlockLayout, DemographicTable, EstimatorConfig,
    Granularity, Hierarchy, LayoutError, LookupDetail, Member, MemberTable,
};

fn race_config() -> EstimatorConfig {
    EstimatorConfig::default().with_mode(Granularity::SingleLevelBlocks)
}

#[test]
fn missing_member_aborts_before_any_trial() {
    let body = common::uneven_body();
    let table = DemographicTable::new().with_row(
        "M0",
        [("white_pct", 0.6), ("black_pct", 0.25), ("hisp_other_pct", 0.15)],
    );

    // a run this long only returns promptly if resolution fails first
    let config = race_config().with_trials(u64::MAX);
    let err = estimate(&body, &table, &config).unwrap_err();
    assert_eq!(
        err,
        BanzhafError::DataLookup {
            member: "M1".to_string(),
            detail: LookupDetail::MissingMember,
        }
    );
}

#[test]
fn missing_category_names_the_column() {
    let body = Hierarchy::new(vec![Member::new("A", 1)]).unwrap();
    let table = DemographicTable::new().with_row("A", [("white_pct", 0.6), ("black_pct", 0.4)]);

    let err = estimate(&body, &table, &race_config()).unwrap_err();
    assert_eq!(
        err,
        BanzhafError::DataLookup {
            member: "A".to_string(),
            detail: LookupDetail::MissingCategory("hisp_other_pct".to_string()),
        }
    );
}

#[test]
fn shares_that_do_not_sum_to_one_are_rejected() {
    let body = Hierarchy::new(vec![Member::new("A", 1)]).unwrap();
    let table = DemographicTable::new().with_row(
        "A",
        [("white_pct", 0.5), ("black_pct", 0.2), ("hisp_other_pct", 0.1)],
    );

    match estimate(&body, &table, &race_config()).unwrap_err() {
        BanzhafError::ShareSumInvariant {
            member,
            axis,
            expected,
            found,
        } => {
            assert_eq!(member, "A");
            assert_eq!(axis, "race");
            assert_eq!(expected, 1.0);
            assert!((found - 0.8).abs() < 1e-9);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn repeated_category_never_yields_duplicate_units() {
    let body = Hierarchy::new(vec![
        Member::new("A", 1),
        Member::new("B", 1),
        Member::new("C", 1),
    ])
    .unwrap();
    let table = DemographicTable::new()
        .with_row("A", [("x", 0.5)])
        .with_row("B", [("x", 0.5)])
        .with_row("C", [("x", 0.5)]);
    let layout = BlockLayout::new(vec![BlockAxis::new("race", ["x", "x"])]);

    let err = body.members_with_blocks(&layout, &table, 1e-6).unwrap_err();
    assert_eq!(
        err,
        BanzhafError::InvalidLayout(LayoutError::DuplicateCategory {
            axis: "race".to_string(),
            category: "x".to_string(),
        })
    );
}

#[test]
fn flat_mode_ignores_the_demographic_table() {
    let body = common::uneven_body();
    let config = EstimatorConfig::default().with_trials(500);
    assert!(estimate(&body, &DemographicTable::new(), &config).is_ok());
}

#[test]
fn zero_trials_is_degenerate() {
    let body = MemberTable::builtin().into_hierarchy().unwrap();
    let config = EstimatorConfig::default().with_trials(0);
    let err = estimate(&body, &DemographicTable::new(), &config).unwrap_err();
    assert_eq!(err, BanzhafError::DegenerateRun { trials: 0 });
    assert!(err.is_degenerate());
}

#[test]
fn weightless_body_is_degenerate() {
    let body = Hierarchy::new(vec![Member::new("A", 0), Member::new("B", 0)]).unwrap();
    let config = EstimatorConfig::default().with_trials(1_000).with_workers(2);
    let err = estimate(&body, &DemographicTable::new(), &config).unwrap_err();
    assert_eq!(err, BanzhafError::DegenerateRun { trials: 1_000 });
}

#[test]
fn duplicate_members_are_rejected() {
    let err = Hierarchy::new(vec![Member::new("A", 1), Member::new("A", 2)]).unwrap_err();
    assert_eq!(err, BanzhafError::DuplicateMember("A".to_string()));
}
