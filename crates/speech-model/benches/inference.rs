//! Mock model generation benchmarks.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use speech_model::MockModel;
use tts_core::{GenerationOptions, SpeechModel, Voice};

fn bench_mock_generate(c: &mut Criterion) {
    let model = MockModel::default();
    let voice = Voice::from("v2/pt_speaker_0");
    let options = GenerationOptions::default();

    let mut group = c.benchmark_group("mock_generate");

    for words in [1, 10, 50].iter() {
        let sentence = "palavra ".repeat(*words);
        group.bench_with_input(BenchmarkId::from_parameter(words), &sentence, |b, s| {
            b.iter(|| model.generate(black_box(s), &voice, &options))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mock_generate);
criterion_main!(benches);
