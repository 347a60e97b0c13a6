use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use lelnovo::{diff, search, AliasTable, Catalog, CatalogBuilder, NumSpec, Part, SearchOptions};

const BRANDS: [&str; 4] = ["thinkpadx1", "thinkpadt", "yoga", "legion"];

/// 4 brands x 8 lines x 64 parts, with prices offset by `shift`.
fn make_catalog(shift: f64) -> Catalog {
    let mut builder = CatalogBuilder::new("us/en", "https://www.lenovo.com/us/en");
    for brand in BRANDS {
        for line in 0..8u32 {
            let line_id = format!("{brand}{line}");
            for i in 0..64u32 {
                let cpu = if i % 2 == 0 { "Intel Core i7-1165G7" } else { "AMD Ryzen 7 5800U" };
                let part = Part::new(format!("{line_id}P{i:03}"), format!("{brand} gen {line}"))
                    .with_spec("status", "Available")
                    .with_spec("processor", cpu)
                    .with_spec("description", "a long marketing paragraph ".repeat(8))
                    .with_num_spec("price", NumSpec::new(900.0 + f64::from(i) * 10.0 + shift, "$"))
                    .with_num_spec("memory", NumSpec::new(f64::from(8 << (i % 3)), "GB"));
                builder = builder.part(brand, line_id.clone(), part);
            }
        }
    }
    builder.build()
}

fn bench_search(c: &mut Criterion) {
    let catalog = make_catalog(0.0);
    let aliases = AliasTable::default();
    let options = SearchOptions::default();

    let mut group = c.benchmark_group("search");
    group.throughput(Throughput::Elements(catalog.part_count() as u64));
    for query in ["yoga", "cpu:ryzen, price<1200", "ram>=16, price>", "x1, i7, price<=1500"] {
        group.bench_function(query, |b| {
            b.iter(|| search(black_box(&catalog), &aliases, &options, black_box(query)));
        });
    }
    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let old = make_catalog(0.0);
    let new = make_catalog(25.0);

    let mut group = c.benchmark_group("diff");
    group.throughput(Throughput::Elements(old.part_count() as u64));
    group.bench_function("identical", |b| b.iter(|| diff(black_box(&old), black_box(&old))));
    group.bench_function("every_price_changed", |b| {
        b.iter(|| diff(black_box(&new), black_box(&old)));
    });
    group.finish();
}

criterion_group!(benches, bench_search, bench_diff);
criterion_main!(benches);
