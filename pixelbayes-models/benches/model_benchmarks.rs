use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use pixelbayes_core::{Image, Pixel, PixelGrid};
use pixelbayes_models::{Corpus, FeatureTable, NaiveBayes};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const IMAGE_SIZE: usize = 28;
const LABELS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

fn random_grid(rng: &mut StdRng, size: usize) -> PixelGrid {
    PixelGrid::from_fn(size, size, |_, _| Pixel::ALL[rng.random_range(0..Pixel::ALL.len())])
}

fn make_corpus(images_per_label: usize, seed: u64) -> Corpus {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut corpus = Corpus::new();
    for &label in &LABELS {
        for _ in 0..images_per_label {
            let grid = random_grid(&mut rng, IMAGE_SIZE);
            corpus.push(Image::new(IMAGE_SIZE, label, grid).unwrap());
        }
    }
    corpus
}

fn bench_feature_table(c: &mut Criterion) {
    let corpus = make_corpus(100, 7);

    let mut group = c.benchmark_group("feature_table");
    group.bench_function("train_1000x28x28", |b| {
        b.iter_batched(
            FeatureTable::new,
            |mut table| {
                table.train(black_box(corpus.groups())).unwrap();
                black_box(table);
            },
            BatchSize::SmallInput,
        )
    });

    let mut table = FeatureTable::new();
    table.train(corpus.groups()).unwrap();
    let mut serialized = Vec::new();
    table.write_to(&mut serialized).unwrap();

    group.bench_function("write_28x28x10", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(serialized.len());
            table.write_to(&mut out).unwrap();
            black_box(out);
        })
    });
    group.bench_function("read_28x28x10", |b| {
        b.iter(|| {
            let loaded = FeatureTable::read_from(black_box(serialized.as_slice())).unwrap();
            black_box(loaded);
        })
    });
    group.finish();
}

fn bench_naive_bayes(c: &mut Criterion) {
    let training = make_corpus(100, 7);
    let held_out = make_corpus(20, 11);

    let mut model = NaiveBayes::new();
    model.fit(&training).unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let grid = random_grid(&mut rng, IMAGE_SIZE);

    c.bench_function("naive_bayes_predict_28x28_10_labels", |b| {
        b.iter(|| {
            let label = model.predict(black_box(&grid)).unwrap();
            black_box(label);
        })
    });

    c.bench_function("naive_bayes_accuracy_200_images", |b| {
        b.iter(|| {
            let accuracy = model.accuracy(black_box(&held_out)).unwrap();
            black_box(accuracy);
        })
    });
}

criterion_group!(benches, bench_feature_table, bench_naive_bayes);
criterion_main!(benches);
