use banzhaf_core::{estimate, DemographicTable, EstimatorConfig, MemberTable, UnitId};

#[test]
fn builtin_college_ranks_california_first() -> anyhow::Result<()> {
    let body = MemberTable::builtin().into_hierarchy()?;
    let config = EstimatorConfig::builtin()
        .with_trials(20_000)
        .with_seed(2020)
        .with_workers(4);

    let result = estimate(&body, &DemographicTable::new(), &config)?;
    assert_eq!(result.index.len(), 51);
    assert!((result.index.sum() - 1.0).abs() < 1e-9);

    let ranked = result.index.ranked();
    assert_eq!(ranked[0].0, &UnitId::member("CA"));
    assert_eq!(ranked[1].0, &UnitId::member("TX"));
    Ok(())
}

#[test]
fn small_states_carry_more_power_per_person() -> anyhow::Result<()> {
    let body = MemberTable::builtin().into_hierarchy()?;
    let config = EstimatorConfig::builtin().with_trials(20_000).with_seed(9);
    let result = estimate(&body, &DemographicTable::new(), &config)?;

    let per_person = result.per_person().expect("builtin table has populations");
    let value = |id: &str| {
        let position = result
            .index
            .units()
            .iter()
            .position(|unit| unit == &UnitId::member(id))
            .expect("state is present");
        per_person[position].expect("state has a population")
    };
    assert!(value("WY") > 2.0 * value("CA"));
    Ok(())
}
