use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hbb_core::{FourMomentum, delta_r, pair_mass};
use std::hint::black_box;

fn make_momenta(n: usize) -> Vec<FourMomentum> {
    // Deterministic spread over the detector acceptance.
    (0..n)
        .map(|i| {
            let x = i as f64;
            let eta = -2.5 + (x * 0.37) % 5.0;
            let phi = (x * 0.91) % std::f64::consts::TAU;
            FourMomentum::from_pt_eta_phi_m(25.0 + 3.0 * x, eta, phi, 4.0)
        })
        .collect()
}

fn bench_pairwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("kinematics_pairwise");

    for n in [4usize, 16, 64] {
        let moms = make_momenta(n);
        group.bench_with_input(BenchmarkId::new("delta_r_all_pairs", n), &moms, |b, moms| {
            b.iter(|| {
                let mut acc = 0.0;
                for a in moms {
                    for other in moms {
                        acc += delta_r(a, other);
                    }
                }
                black_box(acc)
            })
        });
        group.bench_with_input(BenchmarkId::new("pair_mass_all_pairs", n), &moms, |b, moms| {
            b.iter(|| {
                let mut acc = 0.0;
                for a in moms {
                    for other in moms {
                        acc += pair_mass(a, other);
                    }
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pairwise);
criterion_main!(benches);
