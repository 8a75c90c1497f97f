//! Parser edge cases: empty input, recovery, deep nesting, boundary syntax.

use crate::{Parser, Program, Stmt, TokenWithSpan};
use molec_lex::{Lexer, Token};
use molec_util::Handler;

fn parse_source(source: &str) -> (Program, Handler) {
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
    let program = parser.parse_program();
    (program, handler)
}

#[test]
fn test_edge_empty_source() {
    let (program, handler) = parse_source("");
    assert!(!handler.has_errors());
    assert!(program.globals.is_empty());
    assert!(program.functions.is_empty());
    assert!(program.externs.is_empty());
}

#[test]
fn test_edge_whitespace_only() {
    let (program, handler) = parse_source("   \n\t  \n  ");
    assert!(!handler.has_errors());
    assert!(program.functions.is_empty());
}

#[test]
fn test_edge_comments_only() {
    let (program, handler) = parse_source("// a file of nothing but comments\n// more\n");
    assert!(!handler.has_errors());
    assert!(program.functions.is_empty());
}

#[test]
fn test_edge_deeply_nested_parens() {
    let source = "fn f() => u32 { return ((((((((((1)))))))))); }";
    let (program, handler) = parse_source(source);
    assert!(!handler.has_errors());
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_deeply_nested_if_else() {
    let mut source = String::from("fn f() => u32 { ");
    for _ in 0..20 {
        source.push_str("if x { ");
    }
    source.push_str("return 1;");
    for _ in 0..20 {
        source.push_str(" }");
    }
    source.push_str(" }");
    let (program, handler) = parse_source(&source);
    assert!(!handler.has_errors());
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_many_binary_operators_chain() {
    let source = "fn f() => u32 { return 1 + 2 - 3 * 4 / 5 % 6 ^^ 7 & 8 | 9 ^ 10 << 1 >> 1; }";
    let (program, handler) = parse_source(source);
    assert!(!handler.has_errors());
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_chained_calls_and_indexing() {
    let source = "fn f() => u32 { return a(1)(2)[0][1]; }";
    let (program, handler) = parse_source(source);
    assert!(!handler.has_errors());
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_recovers_after_malformed_global_and_continues() {
    let source = "let ===; let y: u32 = 1; fn main() => u32 { return 0; }";
    let (program, handler) = parse_source(source);
    assert!(handler.has_errors());
    assert_eq!(program.globals.len(), 1);
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_recovers_inside_block_after_bad_statement() {
    let source = "fn f() => u32 { !@#; return 1; }";
    let (program, handler) = parse_source(source);
    assert!(handler.has_errors());
    assert_eq!(program.functions.len(), 1);
    match &program.functions[0].body.last() {
        Some(Stmt::Return(Some(_), _)) => {}
        other => panic!("expected trailing return to survive recovery, got {:?}", other),
    }
}

#[test]
fn test_edge_unterminated_block_reports_error_not_panic() {
    let (_, handler) = parse_source("fn f() => u32 { return 1;");
    assert!(handler.has_errors());
}

#[test]
fn test_edge_empty_function_body() {
    let (program, handler) = parse_source("fn noop() { }");
    assert!(!handler.has_errors());
    assert!(program.functions[0].body.is_empty());
}

#[test]
fn test_edge_empty_match_arms() {
    let (program, handler) = parse_source("fn f() => u32 { match x { } return 0; } ");
    assert!(!handler.has_errors());
    match &program.functions[0].body[0] {
        Stmt::Match(_, arms, _) => assert!(arms.is_empty()),
        other => panic!("expected match, got {:?}", other),
    }
}

#[test]
fn test_edge_lambda_call_no_args() {
    let (program, handler) = parse_source("fn f() => u32 { return g@(); }");
    assert!(!handler.has_errors());
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_string_and_char_literals() {
    let (program, handler) = parse_source(r#"fn f() { let s: &str = "hi\n"; let c: char = 'x'; }"#);
    assert!(!handler.has_errors());
    assert_eq!(program.functions[0].body.len(), 2);
}

#[test]
fn test_edge_multiple_externs_and_globals_interleaved() {
    let source = "extern a(); let x: u32 = 1; extern b(); let y: u32 = 2; fn main() => u32 { return 0; }";
    let (program, handler) = parse_source(source);
    assert!(!handler.has_errors());
    assert_eq!(program.externs.len(), 2);
    assert_eq!(program.globals.len(), 2);
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_nested_function_call_as_condition() {
    let (program, handler) = parse_source("fn f() => u32 { if g(h(1)) { return 1; } return 0; }");
    assert!(!handler.has_errors());
    assert_eq!(program.functions.len(), 1);
}

#[test]
fn test_edge_garbage_at_top_level_does_not_loop_forever() {
    let (_, handler) = parse_source("@@@ $$$ ### let x: u32 = 1;");
    assert!(handler.has_errors());
}
