//! # Atomica Style Resolution Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | registry | owner lookup, exact and accelerator-tagged |
//! | resolver | suffix fallback: primary hit, secondary hit, base |
//! | context | full Context startup and teardown |

use std::time::Duration;

use at_compute::CapabilityRegistry;
use at_runtime::{BuildInfo, Channel, Context, Registries, SharedBuffer, World};
use at_styles::{StyleCategory, StyleRegistry, SuffixResolver, SuffixState};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Registry lookups
// ============================================================================

fn bench_registry_lookup(c: &mut Criterion) {
    let registry = StyleRegistry::standard();
    let mut group = c.benchmark_group("styles-registry-lookup");

    for (label, category, name) in [
        ("module", StyleCategory::Atom, "full"),
        ("builtin", StyleCategory::Atom, "atomic"),
        ("unknown", StyleCategory::Pair, "nonexistent-xyz"),
        ("accelerator_tag", StyleCategory::Pair, "lj/cut/kk"),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| black_box(registry.lookup(category, black_box(name))))
        });
    }
    group.finish();
}

// ============================================================================
// Suffix fallback
// ============================================================================

fn bench_suffix_resolution(c: &mut Criterion) {
    let registry = StyleRegistry::standard();
    let states = [
        ("disabled", SuffixState::disabled()),
        ("omp", SuffixState::single("omp").unwrap()),
        ("hybrid_omp_opt", SuffixState::hybrid("omp", "opt").unwrap()),
    ];
    let requests = ["lj/cut", "eam", "tersoff", "morse", "soft"];

    let mut group = c.benchmark_group("styles-suffix-resolution");
    group.throughput(Throughput::Elements(requests.len() as u64));
    for (label, state) in &states {
        let resolver = SuffixResolver::new(&registry, state);
        group.bench_with_input(BenchmarkId::new("pair", label), &requests, |b, requests| {
            b.iter(|| {
                for requested in requests {
                    black_box(resolver.resolve(StyleCategory::Pair, requested));
                }
            })
        });
    }
    group.finish();
}

// ============================================================================
// Context startup
// ============================================================================

fn bench_context_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("context-lifecycle");
    group.measurement_time(Duration::from_secs(10));

    let registries = Registries::new(CapabilityRegistry::all_available(), StyleRegistry::standard());
    let world = World::new(1, 0).unwrap();

    for (label, args) in [
        ("plain", &["-log", "none", "-nocite"][..]),
        ("thread_parallel", &["-log", "none", "-pk", "omp", "2", "-sf", "omp"][..]),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let screen = SharedBuffer::new();
                let mut argv = vec!["atomica_bench"];
                argv.extend_from_slice(args);
                let ctx = Context::builder(argv)
                    .registries(registries.clone())
                    .world(world.clone())
                    .screen(Channel::buffer(&screen))
                    .build_info(BuildInfo::without_git())
                    .build()
                    .unwrap();
                black_box(ctx.close())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_registry_lookup,
    bench_suffix_resolution,
    bench_context_lifecycle
);
criterion_main!(benches);
