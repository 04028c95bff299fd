use criterion::{Criterion, criterion_group, criterion_main};
use std::sync::Arc;
use tailwind_highlight::{
    ClassCache, ClassGenerator, Options, TailwindFormatter, Theme, Token, TokenType,
};

fn theme(background: &str, keyword: &str, string: &str) -> Arc<Theme> {
    Theme::builder("bench")
        .parse_entry(TokenType::Background, background)
        .unwrap()
        .parse_entry(TokenType::Keyword, keyword)
        .unwrap()
        .parse_entry(TokenType::LiteralString, string)
        .unwrap()
        .parse_entry(TokenType::Comment, "italic #6a737d")
        .unwrap()
        .build_arc()
}

fn tokens(lines: usize) -> Vec<Token> {
    let mut out = Vec::with_capacity(lines * 6);
    for i in 0..lines {
        out.push(Token::new(TokenType::Keyword, "let"));
        out.push(Token::new(TokenType::Text, " "));
        out.push(Token::new(TokenType::NameVariable, format!("value_{i}")));
        out.push(Token::new(TokenType::Operator, " = "));
        out.push(Token::new(TokenType::LiteralStringDouble, "\"<a & b>\""));
        out.push(Token::new(TokenType::CommentSingle, "; // done\n"));
    }
    out
}

fn render_benchmark(c: &mut Criterion) {
    let light = theme("bg:#ffffff #24292e", "bold #d73a49", "#032f62");
    let dark = theme("bg:#0d1117 #c9d1d9", "#ff7b72", "#a5d6ff");
    let tokens = tokens(1000);

    let formatter = TailwindFormatter::new(
        Options::default()
            .line_numbers(true)
            .highlight_lines(vec![10..=20, 500..=510]),
    )
    .with_dark_theme(dark);

    c.bench_function("render 1000 lines", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(256 * 1024);
            formatter.format(&mut out, &light, &tokens).unwrap();
            std::hint::black_box(out);
        })
    });
}

fn class_mapping_benchmark(c: &mut Criterion) {
    let light = theme("bg:#ffffff #24292e", "bold #d73a49", "#032f62");
    let dark = theme("bg:#0d1117 #c9d1d9", "#ff7b72", "#a5d6ff");

    c.bench_function("compute class mapping", |b| {
        let generator = ClassGenerator::default();
        b.iter(|| std::hint::black_box(generator.mapping(&light, &dark)))
    });

    c.bench_function("cached class mapping", |b| {
        let cache = ClassCache::default();
        b.iter(|| std::hint::black_box(cache.get(&light, Some(&dark))))
    });
}

criterion_group!(benches, render_benchmark, class_mapping_benchmark);
criterion_main!(benches);
