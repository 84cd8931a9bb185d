use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fzprompt::{CandidateSource, CandidateStore, Ranker, SearchConfig, SearchController};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORDS: [&str; 12] = [
    "search", "find", "filter", "map", "reduce", "process", "handle", "execute", "user",
    "config", "index", "render",
];

// Path-like candidates, e.g. "src/handle/userConfig_42.rs"
fn generate_candidates(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let dir = WORDS[rng.gen_range(0..WORDS.len())];
            let head = WORDS[rng.gen_range(0..WORDS.len())];
            let tail = WORDS[rng.gen_range(0..WORDS.len())];
            format!("src/{}/{}{}_{}.rs", dir, head, capitalize(tail), i)
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Single ranking pass with different candidate counts
fn bench_rank_by_candidate_count(c: &mut Criterion) {
    let config = SearchConfig::default();
    let mut group = c.benchmark_group("rank_by_candidate_count");

    for count in [100, 1_000, 10_000].iter() {
        let store = CandidateStore::<String>::from_records(
            generate_candidates(*count, 7)
                .into_iter()
                .map(Into::into)
                .collect(),
        )
        .unwrap();
        let ranker = Ranker::new(&config);

        group.bench_with_input(format!("{}_candidates", count), count, |b, _| {
            b.iter(|| black_box(ranker.rank(black_box(&store), black_box("hucfg"))))
        });
    }

    group.finish();
}

// One ranking pass per keystroke, as a user types a query
fn bench_typing_session(c: &mut Criterion) {
    let candidates = generate_candidates(10_000, 42);
    let mut controller = SearchController::<String>::new(SearchConfig::default());
    controller.set_candidates(CandidateSource::from_static(candidates));

    c.bench_function("typing_session_10000", |b| {
        b.iter(|| {
            controller.update_query("");
            for ch in "usrcfg".chars() {
                controller.insert_char(ch);
            }
            black_box(controller.info())
        })
    });
}

// Literal tokens against fuzzy tokens
fn bench_exact_vs_fuzzy(c: &mut Criterion) {
    let config = SearchConfig::default();
    let store = CandidateStore::<String>::from_records(
        generate_candidates(10_000, 3)
            .into_iter()
            .map(Into::into)
            .collect(),
    )
    .unwrap();
    let ranker = Ranker::new(&config);
    let mut group = c.benchmark_group("exact_vs_fuzzy");

    group.bench_function("fuzzy", |b| {
        b.iter(|| black_box(ranker.rank(&store, black_box("handle"))))
    });
    group.bench_function("exact", |b| {
        b.iter(|| black_box(ranker.rank(&store, black_box("'handle"))))
    });
    group.bench_function("mixed", |b| {
        b.iter(|| black_box(ranker.rank(&store, black_box("'src usrcfg"))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_rank_by_candidate_count,
    bench_typing_session,
    bench_exact_vs_fuzzy
);
criterion_main!(benches);
