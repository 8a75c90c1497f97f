//! Parser benchmarks.
//!
//! Run with: `cargo bench --package molec-par`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use molec_lex::{Lexer, Token};
use molec_par::{Parser, Program, TokenWithSpan};
use molec_util::Handler;

fn parse_source(source: &str) -> Program {
    let mut handler = Handler::new();
    let tokens = {
        let mut lexer = Lexer::new(source, &mut handler);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let span = lexer.token_span();
            if token == Token::Eof {
                break;
            }
            tokens.push(TokenWithSpan::new(token, span));
        }
        tokens
    };
    let mut parser = Parser::from_tokens(tokens, &handler);
    parser.parse_program()
}

fn bench_parser_global(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_global");

    let source = "let x: u32 = 42;";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("let_global", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_expression(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_expression");

    let source = "fn f() => u32 { return 1 + 2 * 3 - 4 / 5 % 6 ^^ 7 & 8 | 9 ^ 10 << 1 >> 1; }";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("precedence_chain", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_control_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_control_flow");

    let source = r#"
        fn fibonacci(n: u32) => u32 {
            if n < 2 {
                return n;
            }
            let mut a: u32 = 0;
            let mut b: u32 = 1;
            let mut i: u32 = 2;
            while i <= n {
                let next: u32 = a + b;
                a = b;
                b = next;
                i += 1;
            }
            return b;
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("fibonacci", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_match");

    let source = r#"
        fn classify(n: u32) => u32 {
            match n {
                0 => { return 0; }
                1, 2, 3 => { return 1; }
                n > 100 => { return 2; }
                else => { return 3; }
            }
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("classify", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_whole_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_program");

    let source = r#"
        extern print_u32(n: u32);

        let counter: u32 = 0;

        fn const scale(x: f64, factor: f64) => f64 {
            return x * factor;
        }

        fn main() => u32 {
            let mut total: u32 = 0;
            let mut i: u32 = 0;
            while i < 100 {
                total += i;
                i += 1;
            }
            print_u32(total);
            return 0;
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("program", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

criterion_group!(
    benches,
    bench_parser_global,
    bench_parser_expression,
    bench_parser_control_flow,
    bench_parser_match,
    bench_parser_whole_program
);
criterion_main!(benches);
