//! Semantic-checker edge cases: boundary syntax, recovery, and the rules
//! that are easy to get backwards (purity, return-coverage, `main`).

#[cfg(test)]
mod tests {
    use crate::Checker;
    use molec_lex::{Lexer, Token};
    use molec_par::{Parser, TokenWithSpan};
    use molec_util::Handler;

    fn check_source(source: &str) -> Handler {
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
        let program = Parser::from_tokens(tokens, &handler).parse_program();
        let mut checker = Checker::new(&handler);
        checker.check_program(&program);
        handler
    }

    #[test]
    fn test_edge_empty_program_has_no_main() {
        let handler = check_source("");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_main_returning_u32_is_ok() {
        let handler = check_source("fn main() => u32 { return 0; }");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_main_returning_wrong_type_is_an_error() {
        let handler = check_source("fn main() => bool { return true; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_variable_named_main_is_rejected_at_global_scope() {
        let handler = check_source("let main: u32 = 1;\nfn main() { return; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_variable_named_main_is_rejected_locally() {
        let handler = check_source("fn main() { let main: u32 = 1; return; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_extern_named_main_is_rejected() {
        let handler = check_source("extern main() => u32;\nfn main() { return; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_forward_reference_between_functions_is_ok() {
        let handler = check_source(
            "fn a() -> u32 { return b(); }\nfn b() -> u32 { return 1; }\nfn main() { return; }",
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_while_never_covers_by_itself() {
        let handler = check_source("fn f() -> u32 { while true { return 1; } }\nfn main() { return; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_match_without_else_does_not_cover() {
        let handler = check_source(
            "fn f(x: u32) -> u32 { match x { 1 => { return 1; } } }\nfn main() { return; }",
        );
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_match_with_else_and_every_arm_covering_is_ok() {
        let handler = check_source(
            "fn f(x: u32) -> u32 { match x { 1 => { return 1; } else => { return 0; } } }\nfn main() { return; }",
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_deeply_nested_if_else_covering_every_branch_is_ok() {
        let source = "fn f(x: u32) -> u32 {\n\
                       if x == 1 { return 1; }\n\
                       else { if x == 2 { return 2; } else { return 0; } }\n\
                       }\nfn main() { return; }";
        let handler = check_source(source);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_const_fn_nested_block_still_sees_its_own_params() {
        let handler = check_source(
            "const fn f(x: u32) -> u32 { if x == 0 { return x; } else { return x; } }\nfn main() { return; }",
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_const_fn_inside_while_reading_global_is_still_a_violation() {
        let handler = check_source(
            "let g: u32 = 1;\nconst fn f() -> u32 { while true { return g; } }\nfn main() { return; }",
        );
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_nested_function_is_not_a_thing_globals_can_shadow_params() {
        // a global and a same-named parameter in a different function don't
        // collide — each function body is its own rib chain.
        let handler = check_source(
            "let x: u32 = 1;\nfn f(x: u32) -> u32 { return x; }\nfn main() { return; }",
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_reference_and_deref_type_mismatch() {
        let handler = check_source("fn main() { let r: &u32 = 1; return; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_mut_ref_to_immutable_var_is_rejected() {
        let handler = check_source("fn main() { let x: u32 = 1; let r: &mut u32 = &mut x; return; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_lambda_call_hole_produces_narrower_function_type() {
        let handler = check_source(
            "fn add(a: u32, b: u32) -> u32 { return a + b; }\n\
             fn main() { let f: fn(u32) => u32 = add@(1, _); return; }",
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_edge_duplicate_global_is_an_error() {
        let handler = check_source("let x: u32 = 1;\nlet x: u32 = 2;\nfn main() { return; }");
        assert!(handler.has_errors());
    }
}
