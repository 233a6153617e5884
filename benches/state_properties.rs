use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{arr1, Array1};
use pcsaft::parameter::{IdentifierOption, Parameter};
use pcsaft::pcsaft::{PcSaft, PcSaftParameters};
use std::sync::Arc;

/// Evaluate a property of the EoS given temperature, molar density and composition.
fn property<T, F: Fn(&PcSaft, f64, f64, &Array1<f64>) -> T>(
    (eos, property, t, rho, x): (&PcSaft, F, f64, f64, &Array1<f64>),
) -> T {
    property(eos, t, rho, x)
}

fn eos(substances: Vec<&str>) -> PcSaft {
    let parameters = PcSaftParameters::from_json(
        substances,
        "./tests/pcsaft/test_parameters.json",
        Some("./tests/pcsaft/binary_parameters.json"),
        IdentifierOption::Name,
    )
    .unwrap();
    PcSaft::new(Arc::new(parameters))
}

fn properties_pcsaft(c: &mut Criterion) {
    let eos = eos(vec!["methane", "propane", "butane"]);
    let t = 300.0;
    let rho = 8000.0;
    let x = arr1(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);

    let mut group = c.benchmark_group("state_properties_pcsaft_methane_propane_butane");
    group.bench_function("a", |b| {
        b.iter(|| property((&eos, PcSaft::residual_helmholtz_energy, t, rho, &x)))
    });
    group.bench_function("compressibility", |b| {
        b.iter(|| property((&eos, PcSaft::compressibility, t, rho, &x)))
    });
    group.bench_function("ln_phi", |b| {
        b.iter(|| property((&eos, PcSaft::ln_phi, t, rho, &x)))
    });
    group.bench_function("pressure", |b| {
        b.iter(|| property((&eos, PcSaft::pressure, t, rho, &x)))
    });
}

fn properties_pcsaft_polar_associating(c: &mut Criterion) {
    let eos = eos(vec!["water", "methanol", "acetone"]);
    let t = 320.0;
    let rho = 30000.0;
    let x = arr1(&[0.4, 0.3, 0.3]);

    let mut group = c.benchmark_group("state_properties_pcsaft_water_methanol_acetone");
    group.bench_function("compressibility", |b| {
        b.iter(|| property((&eos, PcSaft::compressibility, t, rho, &x)))
    });
    group.bench_function("ln_phi", |b| {
        b.iter(|| property((&eos, PcSaft::ln_phi, t, rho, &x)))
    });
}

fn properties_pcsaft_electrolyte(c: &mut Criterion) {
    let eos = eos(vec!["water", "sodium", "chloride"]);
    let t = 298.15;
    let rho = 53000.0;
    let x = arr1(&[0.96, 0.02, 0.02]);

    let mut group = c.benchmark_group("state_properties_pcsaft_water_nacl");
    group.bench_function("compressibility", |b| {
        b.iter(|| property((&eos, PcSaft::compressibility, t, rho, &x)))
    });
    group.bench_function("ln_phi", |b| {
        b.iter(|| property((&eos, PcSaft::ln_phi, t, rho, &x)))
    });
}

criterion_group!(
    bench,
    properties_pcsaft,
    properties_pcsaft_polar_associating,
    properties_pcsaft_electrolyte
);
criterion_main!(bench);
