use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pascalite::prelude::*;

const FACTORIAL: &str = include_str!("../tests/factorial.pas");

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("compile factorial", |b| {
        b.iter(|| black_box(compile(black_box(FACTORIAL), &CompileConf::default())))
    });

    {
        let code = compile_str(FACTORIAL).unwrap();
        let mut vm = MepaVm::new(MepaConf::default());
        vm.load_code(&code);

        c.bench_function("run factorial", |b| {
            b.iter(|| {
                vm.push_input([black_box(20)]);
                black_box(vm.execute()).unwrap();
                vm.take_output()
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
