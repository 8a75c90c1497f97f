//! Edge case tests for molec-lex

#[cfg(test)]
mod tests {
    use crate::{Lexer, Token};
    use molec_util::{Handler, Symbol};

    fn lex_all(source: &str) -> Vec<Token> {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new(source, &mut handler);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_source() {
        assert!(lex_all("").is_empty());
    }

    #[test]
    fn test_edge_single_char_ident() {
        let t = lex_all("x");
        assert_eq!(t[0], Token::Ident(Symbol::intern("x")));
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(10000);
        let mut handler = Handler::new();
        let source = format!("let {} = 1;", name);
        let mut lexer = Lexer::new(&source, &mut handler);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        assert!(tokens.contains(&Token::Ident(Symbol::intern(&name))));
        assert!(handler.has_errors());
    }

    #[test]
    fn test_edge_keywords_not_idents() {
        let t = lex_all("fn let if");
        assert_eq!(t[0], Token::Fn);
        assert_eq!(t[1], Token::Let);
        assert_eq!(t[2], Token::If);
    }

    #[test]
    fn test_edge_main_is_not_a_keyword() {
        let t = lex_all("fn main");
        assert_eq!(t[0], Token::Fn);
        assert_eq!(t[1], Token::Ident(Symbol::intern("main")));
    }

    #[test]
    fn test_edge_no_hex_binary_octal_syntax() {
        // '0' followed by 'x'/'b'/'o' is two separate tokens: a decimal
        // integer then an identifier. There is no prefixed-radix syntax.
        let t = lex_all("0xFF");
        assert_eq!(t[0], Token::U32Literal(0));
        assert_eq!(t[1], Token::Ident(Symbol::intern("xFF")));
    }

    #[test]
    fn test_edge_empty_string() {
        let t = lex_all("\"\"");
        if let Token::StringLiteral(s) = &t[0] {
            assert_eq!(s.as_str(), "");
        } else {
            panic!("expected a string literal");
        }
    }

    #[test]
    fn test_edge_all_operators() {
        let t = lex_all("+ - * / % == != < > <= >= && || !");
        assert!(t.contains(&Token::Plus));
        assert!(t.contains(&Token::EqEq));
        assert!(t.contains(&Token::AmpAmp));
        assert!(t.contains(&Token::PipePipe));
    }

    #[test]
    fn test_edge_all_delimiters() {
        let t = lex_all("( ) { } [ ] , ; : =>");
        assert!(t.contains(&Token::LParen));
        assert!(t.contains(&Token::FatArrow));
    }

    #[test]
    fn test_edge_no_thin_arrow() {
        // '-' followed by '>' is not a token: it is Minus then Gt.
        let t = lex_all("x -> y");
        assert!(t.contains(&Token::Minus));
        assert!(t.contains(&Token::Gt));
    }

    #[test]
    fn test_edge_nested_delimiters() {
        let t = lex_all("((()))");
        assert_eq!(t.iter().filter(|x| **x == Token::LParen).count(), 3);
    }

    #[test]
    fn test_edge_case_sensitivity() {
        let t = lex_all("Fn fn");
        assert_eq!(t[0], Token::Ident(Symbol::intern("Fn")));
        assert_eq!(t[1], Token::Fn);
    }

    #[test]
    fn test_edge_bools() {
        let t = lex_all("true false");
        assert_eq!(t[0], Token::True);
        assert_eq!(t[1], Token::False);
    }

    #[test]
    fn test_edge_at() {
        assert!(lex_all("@").contains(&Token::At));
    }

    #[test]
    fn test_edge_underscore_placeholder() {
        assert_eq!(lex_all("_"), vec![Token::Underscore]);
    }

    #[test]
    fn test_edge_underscore_prefixed_ident_is_an_identifier() {
        assert_eq!(lex_all("_x"), vec![Token::Ident(Symbol::intern("_x"))]);
    }

    #[test]
    fn test_edge_tilde() {
        assert!(lex_all("~").contains(&Token::Tilde));
    }

    #[test]
    fn test_edge_no_exponent_syntax() {
        // '1e10' is an integer literal '1' followed by identifier 'e10'.
        let t = lex_all("1e10");
        assert_eq!(t[0], Token::U32Literal(1));
        assert_eq!(t[1], Token::Ident(Symbol::intern("e10")));
    }

    #[test]
    fn test_edge_leading_dot_float() {
        assert_eq!(lex_all(".5"), vec![Token::F64Literal(0.5)]);
    }

    #[test]
    fn test_edge_exponent_operator_vs_bitwise_xor() {
        let t = lex_all("a ^ b ^^ c");
        assert_eq!(t[1], Token::Caret);
        assert_eq!(t[3], Token::CaretCaret);
    }

    #[test]
    fn test_edge_all_type_keywords() {
        let t = lex_all("u32 i32 f64 bool char str");
        assert_eq!(
            t,
            vec![
                Token::TyU32,
                Token::TyI32,
                Token::TyF64,
                Token::TyBool,
                Token::TyChar,
                Token::TyStr,
            ]
        );
    }

    // ==================== ERROR CASES ====================

    #[test]
    fn test_err_unterminated_string() {
        let mut h = Handler::new();
        let _ = Lexer::new("\"unterminated", &mut h).next_token();
        assert!(h.has_errors());
    }

    #[test]
    fn test_err_empty_char() {
        let mut h = Handler::new();
        let t = Lexer::new("''", &mut h).next_token();
        assert!(matches!(t, Token::CharLiteral(_) | Token::Invalid(_)));
        assert!(h.has_errors());
    }

    #[test]
    fn test_err_unterminated_char() {
        let mut h = Handler::new();
        let _ = Lexer::new("'x", &mut h).next_token();
        assert!(h.has_errors());
    }

    #[test]
    fn test_err_invalid_chars() {
        let mut h = Handler::new();
        let mut lex = Lexer::new("#", &mut h);
        while lex.next_token() != Token::Eof {}
        assert!(h.has_errors());
    }

    #[test]
    fn test_err_mixed_valid_invalid() {
        let mut h = Handler::new();
        let mut lex = Lexer::new("let x = # 1;", &mut h);
        while lex.next_token() != Token::Eof {}
        assert!(h.has_errors());
    }

    #[test]
    fn test_err_unterminated_block_comment() {
        let mut h = Handler::new();
        let mut lex = Lexer::new("/* never closed", &mut h);
        while lex.next_token() != Token::Eof {}
        assert!(h.has_errors());
    }

    #[test]
    fn test_edge_consecutive_increment_operators() {
        // '+++' lexes as '++' then '+', not three separate '+' tokens.
        assert_eq!(lex_all("+++"), vec![Token::PlusPlus, Token::Plus]);
    }

    #[test]
    fn test_edge_whitespace_variations() {
        let t = lex_all("let\tx\n=\n1");
        assert!(t.contains(&Token::Let));
        assert!(t.contains(&Token::U32Literal(1)));
    }

    #[test]
    fn test_edge_leading_zeros_are_kept() {
        assert_eq!(lex_all("007"), vec![Token::U32Literal(7)]);
    }

    #[test]
    fn test_edge_crlf_round_trip_through_reader() {
        let normalized = crate::reader::normalize_newlines("let x = 1;\r\nlet y = 2;\r\n");
        let t = lex_all(&normalized);
        assert_eq!(t.iter().filter(|x| **x == Token::Let).count(), 2);
    }
}
