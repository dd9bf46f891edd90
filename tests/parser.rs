#[cfg(test)]
mod parser_tests {
    use jdb_eval::ast_printer::AstPrinter;
    use jdb_eval::error::EvalError;
    use jdb_eval::expr::Expr;
    use jdb_eval::parser::*;
    use jdb_eval::scanner::*;
    use jdb_eval::token::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        Scanner::new(source)
            .collect::<Result<Vec<_>, _>>()
            .expect("source should lex")
    }

    fn parse(source: &str) -> Result<Expr, EvalError> {
        let tokens = tokens(source);
        let mut parser = Parser::new(&tokens);

        parser.parse()
    }

    fn assert_prints(source: &str, expected: &str) {
        match parse(source) {
            Ok(expr) => assert_eq!(AstPrinter.print(&expr), expected, "source: {}", source),
            Err(e) => panic!("{}: unexpected parse error: {}", source, e),
        }
    }

    fn parse_error(source: &str) -> String {
        match parse(source) {
            Ok(expr) => panic!("{}: expected an error, parsed {:?}", source, expr),
            Err(e) => {
                assert!(e.is_syntax(), "{}: not a syntax error: {:?}", source, e);
                e.to_string()
            }
        }
    }

    fn recovered(source: &str) -> Vec<String> {
        let tokens = tokens(source);
        let mut parser = Parser::recovering(&tokens);

        assert!(parser.parse().is_err(), "{}: recovering parse should fail", source);

        parser.diagnostics().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_binary_precedence() {
        assert_prints("1+2*3", "(+ 1 (* 2 3))");
        assert_prints("1 * 2 + 3", "(+ (* 1 2) 3)");
        assert_prints("a - b - c", "(- (- a b) c)");
        assert_prints("1 << 2 + 3", "(<< 1 (+ 2 3))");
        assert_prints("a < b == c >= d", "(== (< a b) (>= c d))");
        assert_prints(
            "a || b && c | d ^ e & f == g",
            "(|| a (&& b (| c (^ d (& e (== f g))))))",
        );
    }

    #[test]
    fn test_assignment_and_ternary_are_right_associative() {
        assert_prints("a = b = 1", "(= a (= b 1))");
        assert_prints("x += y -= 2", "(+= x (-= y 2))");
        assert_prints("m >>>= 1", "(>>>= m 1)");
        assert_prints("a ? b : c ? d : e", "(?: a b (?: c d e))");
        assert_prints("x = c ? 1 : 2", "(= x (?: c 1 2))");
    }

    #[test]
    fn test_unary_and_increment_forms() {
        assert_prints("-a * !b", "(* (- a) (! b))");
        assert_prints("~x", "(~ x)");
        assert_prints("- -x", "(- (- x))");
        assert_prints("x++", "(postfix increment x)");
        assert_prints("--x", "(prefix decrement x)");
        assert_prints("a.b--", "(postfix decrement (. a b))");
    }

    #[test]
    fn test_selectors_and_calls() {
        assert_prints("a.b.c(1, x)[2]", "([] (call (. (. a b) c) 1 x) 2)");
        assert_prints("a.b.m()", "(call (. (. a b) m))");
        assert_prints("m(1)", "(call m 1)");
        assert_prints("arr[i + 1]", "([] arr (+ i 1))");
        assert_prints("this.count", "(. this count)");
        assert_prints("super.toString()", "(call (. super toString))");
    }

    #[test]
    fn test_casts_are_disambiguated_by_lookahead() {
        assert_prints("(int) x", "(cast int x)");
        assert_prints("(int) -x", "(cast int (- x))");
        assert_prints("(int[]) o", "(cast int[] o)");
        assert_prints("(String) s", "(cast String s)");
        assert_prints("(java.util.List) o", "(cast java.util.List o)");
        assert_prints("(Foo) !b", "(cast Foo (! b))");
        assert_prints("(a) + b", "(+ (group a) b)");
        assert_prints("(a) - 1", "(- (group a) 1)");
        assert_prints("(a)", "(group a)");
        assert_prints("(a + b) * c", "(* (group (+ a b)) c)");
    }

    #[test]
    fn test_constructs_that_only_parse() {
        assert_prints("x instanceof java.lang.String", "(instanceof x java.lang.String)");
        assert_prints("new Foo(1)", "(new Foo 1)");
        assert_prints("new java.util.ArrayList()", "(new java.util.ArrayList)");
        assert_prints("new int[3][]", "(new-array int[][] 3)");
        assert_prints("new int[] {1, 2}", "(new-array int[] {1 2})");
        assert_prints("new int[][] {{1}, {}}", "(new-array int[][] {{1} {}})");
        assert_prints("int.class", "(class int)");
        assert_prints("void.class", "(class void)");
        assert_prints("String[].class", "(class String[])");
        assert_prints("Foo.class", "(. Foo class)");
        assert_prints("Outer.this", "(. Outer this)");
        assert_prints("o.new Inner(1)", "(. o (new Inner 1))");
    }

    #[test]
    fn test_literals_keep_source_text() {
        assert_prints("0x1FL", "0x1FL");
        assert_prints("017", "017");
        assert_prints("1.5e3f", "1.5e3f");
        assert_prints("'\\n'", "'\\n'");
        assert_prints("\"a b\"", "\"a b\"");
        assert_prints("null", "null");
    }

    #[test]
    fn test_tree_serializes_to_json() {
        let expr = parse("a.b + 1").expect("should parse");

        let json = serde_json::to_value(&expr).expect("tree should serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "Binary": {
                    "op": "Plus",
                    "left": { "Dot": { "target": { "Ident": "a" }, "member": { "Ident": "b" } } },
                    "right": { "Literal": { "kind": "Decimal", "text": "1" } }
                }
            })
        );
    }

    #[test]
    fn test_strict_errors() {
        assert_eq!(
            parse_error("1 +"),
            "line 1:4 no viable alternative at input '<EOF>'"
        );
        assert_eq!(
            parse_error("a b"),
            "line 1:3 extraneous input 'b' expecting <EOF>"
        );
        assert_eq!(parse_error("(a"), "line 1:3 missing ')' at '<EOF>'");
        assert_eq!(parse_error("f(1,"), "line 1:5 no viable alternative at input '<EOF>'");
        assert!(parse_error("a.;").contains("no viable alternative at input '.;'"));
        assert!(parse_error("new int").contains("missing '['"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_error(""), "line 1:1 no viable alternative at input '<EOF>'");
        assert!(Parser::new(&[]).parse().is_err());
    }

    #[test]
    fn test_too_many_arguments() {
        let source = format!("f({})", vec!["1"; 256].join(", "));

        assert!(parse_error(&source).contains("Cannot have more than 255 arguments"));

        let source = format!("f({})", vec!["1"; 255].join(", "));
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn test_recovery_deletes_extraneous_token() {
        assert_eq!(
            recovered("(a b)"),
            vec!["line 1:4 extraneous input 'b' expecting ')'"]
        );
    }

    #[test]
    fn test_recovery_reports_every_problem() {
        assert_eq!(
            recovered("(a b"),
            vec![
                "line 1:4 missing ')' at 'b'",
                "line 1:4 extraneous input 'b' expecting <EOF>",
            ]
        );

        let diagnostics = recovered("1 + ) * 2 ]");
        assert!(diagnostics.len() >= 2, "{:?}", diagnostics);
        assert!(diagnostics[0].contains("no viable alternative at input ')'"));
    }

    #[test]
    fn test_recovering_parser_returns_first_diagnostic() {
        let tokens = tokens("(a b");
        let mut parser = Parser::recovering(&tokens);

        match parser.parse() {
            Err(EvalError::Parse { message, line, column }) => {
                assert_eq!((line, column), (1, 4));
                assert_eq!(message, "missing ')' at 'b'");
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert_eq!(parser.into_diagnostics().len(), 2);
    }

    #[test]
    fn test_strict_parser_collects_nothing() {
        let tokens = tokens("1 + + ");
        let mut parser = Parser::new(&tokens);

        assert!(parser.parse().is_err());
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn test_clean_input_has_no_diagnostics() {
        let tokens = tokens("a.b[0] + f(1)");
        let mut parser = Parser::recovering(&tokens);

        assert!(parser.parse().is_ok());
        assert!(parser.diagnostics().is_empty());
    }
}
