#[cfg(test)]
mod scanner_tests {
    use jdb_eval::error::EvalError;
    use jdb_eval::scanner::*;
    use jdb_eval::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn first_error(source: &str) -> EvalError {
        Scanner::new(source)
            .find_map(Result::err)
            .expect("expected a lex error")
    }

    #[test]
    fn test_scanner_01_separators() {
        assert_token_sequence(
            "([{}]);,.@?:...",
            &[
                (TokenType::LPAREN, "("),
                (TokenType::LBRACK, "["),
                (TokenType::LCURLY, "{"),
                (TokenType::RCURLY, "}"),
                (TokenType::RBRACK, "]"),
                (TokenType::RPAREN, ")"),
                (TokenType::SEMI, ";"),
                (TokenType::COMMA, ","),
                (TokenType::DOT, "."),
                (TokenType::AT, "@"),
                (TokenType::QUESTION, "?"),
                (TokenType::COLON, ":"),
                (TokenType::ELLIPSIS, "..."),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_longest_operator_wins() {
        assert_token_sequence(
            ">>>= >>> >>= >> >= > <<= << <= < ++ += + -- -= - && &= & || |= | != !",
            &[
                (TokenType::BIT_SHIFT_RIGHT_ASSIGN, ">>>="),
                (TokenType::BIT_SHIFT_RIGHT, ">>>"),
                (TokenType::SHIFT_RIGHT_ASSIGN, ">>="),
                (TokenType::SHIFT_RIGHT, ">>"),
                (TokenType::GREATER_OR_EQUAL, ">="),
                (TokenType::GREATER_THAN, ">"),
                (TokenType::SHIFT_LEFT_ASSIGN, "<<="),
                (TokenType::SHIFT_LEFT, "<<"),
                (TokenType::LESS_OR_EQUAL, "<="),
                (TokenType::LESS_THAN, "<"),
                (TokenType::INC, "++"),
                (TokenType::PLUS_ASSIGN, "+="),
                (TokenType::PLUS, "+"),
                (TokenType::DEC, "--"),
                (TokenType::MINUS_ASSIGN, "-="),
                (TokenType::MINUS, "-"),
                (TokenType::LOGICAL_AND, "&&"),
                (TokenType::AND_ASSIGN, "&="),
                (TokenType::AND, "&"),
                (TokenType::LOGICAL_OR, "||"),
                (TokenType::OR_ASSIGN, "|="),
                (TokenType::OR, "|"),
                (TokenType::NOT_EQUAL, "!="),
                (TokenType::LOGICAL_NOT, "!"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_numeric_literals() {
        assert_token_sequence(
            "0x1F 0XffL 017 0 42 42L 1.5 1. .5 1e10 2.5E-3 2f 3.0d",
            &[
                (TokenType::HEX_LITERAL, "0x1F"),
                (TokenType::HEX_LITERAL, "0XffL"),
                (TokenType::OCTAL_LITERAL, "017"),
                (TokenType::DECIMAL_LITERAL, "0"),
                (TokenType::DECIMAL_LITERAL, "42"),
                (TokenType::DECIMAL_LITERAL, "42L"),
                (TokenType::FLOATING_POINT_LITERAL, "1.5"),
                (TokenType::FLOATING_POINT_LITERAL, "1."),
                (TokenType::FLOATING_POINT_LITERAL, ".5"),
                (TokenType::FLOATING_POINT_LITERAL, "1e10"),
                (TokenType::FLOATING_POINT_LITERAL, "2.5E-3"),
                (TokenType::FLOATING_POINT_LITERAL, "2f"),
                (TokenType::FLOATING_POINT_LITERAL, "3.0d"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_char_and_string_literals() {
        assert_token_sequence(
            r#"'a' '\n' 'A' '\101' "s\"t" """#,
            &[
                (TokenType::CHARACTER_LITERAL, "'a'"),
                (TokenType::CHARACTER_LITERAL, r"'\n'"),
                (TokenType::CHARACTER_LITERAL, r"'A'"),
                (TokenType::CHARACTER_LITERAL, r"'\101'"),
                (TokenType::STRING_LITERAL, r#""s\"t""#),
                (TokenType::STRING_LITERAL, r#""""#),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_keywords_and_identifiers() {
        assert_token_sequence(
            "instanceof this super new int void class true false null $x _y count2 thisIs",
            &[
                (TokenType::INSTANCEOF, "instanceof"),
                (TokenType::THIS, "this"),
                (TokenType::SUPER, "super"),
                (TokenType::NEW, "new"),
                (TokenType::INT, "int"),
                (TokenType::VOID, "void"),
                (TokenType::CLASS, "class"),
                (TokenType::TRUE, "true"),
                (TokenType::FALSE, "false"),
                (TokenType::NULL, "null"),
                (TokenType::IDENT, "$x"),
                (TokenType::IDENT, "_y"),
                (TokenType::IDENT, "count2"),
                (TokenType::IDENT, "thisIs"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_06_comments_and_positions() {
        let tokens: Vec<Token> = Scanner::new("a /* one\n two */ +\n  // trailing\n b")
            .collect::<Result<_, _>>()
            .unwrap();

        let summary: Vec<(TokenType, usize, usize)> = tokens
            .iter()
            .map(|t| (t.token_type, t.line, t.column))
            .collect();

        assert_eq!(
            summary,
            vec![
                (TokenType::IDENT, 1, 1),
                (TokenType::PLUS, 2, 9),
                (TokenType::IDENT, 4, 2),
                (TokenType::EOF, 4, 3),
            ]
        );
    }

    #[test]
    fn test_scanner_07_single_eof_and_fused() {
        let mut scanner = Scanner::new("x");

        assert_eq!(scanner.next().unwrap().unwrap().token_type, TokenType::IDENT);
        assert_eq!(scanner.next().unwrap().unwrap().token_type, TokenType::EOF);
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());

        let empty: Vec<_> = Scanner::new("").collect();
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.#(\\";
        let results: Vec<_> = Scanner::new(source).collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '#'
        // 3: LPAREN '('
        // 4: Error for '\'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LPAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(ToString::to_string)
            .collect();

        assert_eq!(errors, vec!["line 1:3 Unexpected character: #", "line 1:5 Unexpected character: \\"]);

        fn assert_token_matches(
            result: &Result<Token, EvalError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_malformed_literals() {
        let cases = [
            ("09", "Invalid octal literal"),
            ("0x", "Malformed hex literal"),
            ("1e+", "missing exponent digits"),
            ("\"abc", "Unterminated string literal"),
            ("\"ab\ncd\"", "Unterminated string literal"),
            ("''", "Empty character literal"),
            ("'ab'", "Unterminated character literal"),
            (r"'\q'", "Illegal escape character"),
            ("/* open", "Unterminated"),
        ];

        for (source, message) in cases {
            let err = first_error(source);

            assert!(
                matches!(err, EvalError::Lex { .. }),
                "{}: expected lex error, got {:?}",
                source,
                err
            );
            assert!(
                err.to_string().contains(message),
                "{}: '{}' does not mention '{}'",
                source,
                err,
                message
            );
        }
    }
}
