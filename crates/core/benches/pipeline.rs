use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use scribe_core::{GenerationDirective, PromptLanguage, PromptSynthesizer, extract_links, normalize};
use url::Url;

fn bench_extract_links(c: &mut Criterion) {
    let html = std::fs::read_to_string("tests/fixtures/bakery.html").unwrap();
    let large = html.repeat(200);
    let page = Url::parse("https://bageriet.dk/").unwrap();
    let denied = vec![".pdf".to_string()];

    let mut group = c.benchmark_group("extract_links");

    group.bench_with_input(BenchmarkId::new("small", "2KB"), &html, |b, html| {
        b.iter(|| extract_links(black_box(html), &page, &page, &denied))
    });

    group.bench_with_input(BenchmarkId::new("large", "400KB"), &large, |b, html| {
        b.iter(|| extract_links(black_box(html), &page, &page, &denied))
    });

    group.finish();
}

fn bench_synthesize(c: &mut Criterion) {
    let directive = GenerationDirective::builder()
        .keywords_input("bageri, surdejsbrød, kager")
        .locations_input("Aarhus, Aarhus C")
        .target_page("https://bageriet.dk/")
        .reference_links((0..50).map(|i| format!("https://bageriet.dk/side/{}", i)))
        .include_contact(true)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("synthesize");
    for language in [PromptLanguage::Danish, PromptLanguage::English] {
        let synthesizer = PromptSynthesizer::new(language);
        group.bench_function(format!("{:?}", language), |b| b.iter(|| synthesizer.synthesize(black_box(&directive))));
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let section = "## Friskt brød\n\nVi bager **hver morgen** med *økologisk* mel fra lokale møller.\n\n";
    let text = format!("# Bageri i Aarhus\n\n{}", section.repeat(100));

    c.bench_function("normalize", |b| b.iter(|| normalize(black_box(text.as_str()))));
}

criterion_group!(benches, bench_extract_links, bench_synthesize, bench_normalize);
criterion_main!(benches);
