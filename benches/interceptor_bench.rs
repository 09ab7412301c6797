use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynamic_tablename::interceptor::{find_table_refs, DynamicTableNameInterceptor};
use dynamic_tablename::tenant::{TableNameResolver, TenantConfig, TenantPrefixResolver};
use std::hint::black_box;
use std::sync::Arc;

fn lincoln() -> Arc<TenantConfig> {
    Arc::new(TenantConfig::new(
        Some("lincoln".to_string()),
        ["score", "exam", "attendance"],
    ))
}

fn statements() -> Vec<(&'static str, &'static str)> {
    vec![
        ("point_select", "SELECT id, score FROM score WHERE id = ?"),
        ("shared_only", "SELECT id, name FROM student WHERE id = ?"),
        (
            "three_way_join",
            "SELECT st.name, su.name, sc.score FROM score sc \
             JOIN student st ON st.id = sc.student_id \
             JOIN subject su ON su.id = sc.subject_id \
             ORDER BY st.id, su.id",
        ),
        (
            "insert",
            "INSERT INTO score (id, student_id, subject_id, score) VALUES (?, ?, ?, ?)",
        ),
    ]
}

fn bench_resolve(c: &mut Criterion) {
    let resolver = TenantPrefixResolver::new(lincoln());
    let mut group = c.benchmark_group("resolve");

    group.bench_function("eligible", |b| {
        b.iter(|| resolver.resolve(black_box(""), black_box("score")))
    });
    group.bench_function("ineligible", |b| {
        b.iter(|| resolver.resolve(black_box(""), black_box("student")))
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_table_refs");

    for (name, sql) in statements() {
        group.throughput(Throughput::Bytes(sql.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| find_table_refs(black_box(sql)))
        });
    }

    group.finish();
}

fn bench_rewrite(c: &mut Criterion) {
    let interceptor = DynamicTableNameInterceptor::for_tenant(lincoln());
    let mut group = c.benchmark_group("rewrite");

    for (name, sql) in statements() {
        group.throughput(Throughput::Bytes(sql.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| interceptor.rewrite(black_box(sql)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_scan, bench_rewrite);
criterion_main!(benches);
