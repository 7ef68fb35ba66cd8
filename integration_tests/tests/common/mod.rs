#![allow(dead_code)]

use std::path::PathBuf;

use banzhaf_core::{BlockLayout, DemographicTable, Hierarchy, Member};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Ten members with uneven weights, small enough to enumerate exactly.
pub fn uneven_body() -> Hierarchy {
    let weights = [9, 7, 6, 5, 5, 4, 3, 2, 2, 1];
    Hierarchy::new(
        weights
            .iter()
            .enumerate()
            .map(|(idx, &weight)| Member::new(format!("M{idx}"), weight).with_population(1_000))
            .collect(),
    )
    .expect("member ids are unique")
}

/// Every category of every axis gets an equal share for every member.
pub fn uniform_table(body: &Hierarchy, layout: &BlockLayout) -> DemographicTable {
    let mut table = DemographicTable::new();
    for member in body.members() {
        for axis in layout.axes() {
            let share = 1.0 / axis.categories.len() as f64;
            for category in &axis.categories {
                table.insert(member.id.as_str(), category.as_str(), share);
            }
        }
    }
    table
}

/// The same race mix for every member, with one outright majority group.
pub fn majority_race_table(body: &Hierarchy) -> DemographicTable {
    let mut table = DemographicTable::new();
    for member in body.members() {
        table = table.with_row(
            &member.id,
            [("white_pct", 0.6), ("black_pct", 0.25), ("hisp_other_pct", 0.15)],
        );
    }
    table
}
