use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use diagnostic_pipeline::prelude::*;
use diagnostic_pipeline::utils::frame::{first_column_to_array1, frame_to_array2};

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");

    for n_rows in [569, 5000].iter() {
        let raw = SyntheticProvider::new(*n_rows, 42)
            .fetch()
            .unwrap()
            .to_frame(LABEL_COLUMN)
            .unwrap();

        for scale_fit in [ScaleFit::TrainPartition, ScaleFit::FullDataset] {
            let pre = DataPreprocessor::new(
                PreprocessingConfig::default().with_scale_fit(scale_fit),
                SchemaContract::default(),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", scale_fit), n_rows),
                &raw,
                |b, raw| b.iter(|| pre.process(black_box(raw)).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    let raw = SyntheticProvider::default().fetch().unwrap().to_frame(LABEL_COLUMN).unwrap();
    let pre = DataPreprocessor::new(PreprocessingConfig::default(), SchemaContract::default());
    let (parts, _) = pre.process(&raw).unwrap();
    let x = frame_to_array2(&parts.x_train).unwrap();
    let y = first_column_to_array1(&parts.y_train).unwrap();

    for max_iter in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("logistic_regression", max_iter), max_iter, |b, &max_iter| {
            b.iter(|| {
                let mut model = ModelConfig::default().with_max_iter(max_iter).build();
                model.fit(black_box(&x), black_box(&y)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_fit);
criterion_main!(benches);
