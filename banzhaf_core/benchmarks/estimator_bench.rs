use banzhaf_core::{
    enumerate_exact, seeded, BlockLayout, DemographicTable, Granularity, Hierarchy, Member,
    MemberTable, MonteCarloEstimator,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Uniform shares for every category of every axis of `layout`.
fn uniform_table(body: &Hierarchy, layout: &BlockLayout) -> DemographicTable {
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

fn bench_granularities(c: &mut Criterion) {
    let body = MemberTable::builtin()
        .into_hierarchy()
        .expect("builtin member table");
    let mut group = c.benchmark_group("estimator_trials");
    group.sample_size(20);

    for mode in [
        Granularity::Flat,
        Granularity::SingleLevelBlocks,
        Granularity::MultiLevelBlocks,
    ] {
        let layout = mode.default_layout();
        let table = uniform_table(&body, &layout);
        let resolved = body
            .members_with_blocks(&layout, &table, 1e-6)
            .expect("uniform shares resolve");
        group.bench_with_input(BenchmarkId::new("1000_trials", mode), &resolved, |b, resolved| {
            let estimator = MonteCarloEstimator::new(resolved, 1_000);
            b.iter(|| estimator.run(&mut seeded(7)));
        });
    }
    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_enumeration");
    for members in [8usize, 12, 16] {
        let body = Hierarchy::new(
            (0..members)
                .map(|idx| Member::new(format!("M{idx}"), (idx as u64 % 5) + 1))
                .collect(),
        )
        .expect("unique ids");
        group.bench_with_input(BenchmarkId::from_parameter(members), &body, |b, body| {
            b.iter(|| enumerate_exact(body).expect("within enumeration cap"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_granularities, bench_enumeration);
criterion_main!(benches);
