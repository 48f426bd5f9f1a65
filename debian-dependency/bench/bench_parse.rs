use criterion::{criterion_group, criterion_main, Criterion};

const BUILD_DEPENDS: &str = "debhelper-compat (= 13), dh-sequence-python3, \
    python3-all-dev:any (>= 3.9), python3-setuptools, libssl-dev [!hurd-any], \
    cargo:native | cargo-web [linux-any kfreebsd-any] <!nocheck>, \
    python3-pytest <!nocheck>, python3-sphinx <!nodoc> <cross>, \
    libsystemd-dev [linux-any], ${misc:Depends}, ${shlibs:Depends}";

fn parse_dependency_benchmark(c: &mut Criterion) {
    c.bench_function("parse_build_depends", |b| {
        b.iter(|| {
            let _dep = debian_dependency::parse(BUILD_DEPENDS).unwrap();
        });
    });
}

criterion_group!(benches, parse_dependency_benchmark);
criterion_main!(benches);
