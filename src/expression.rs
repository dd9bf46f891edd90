//! Entry point: one [`ExpressionParser`] per expression text.
//!
//! The text is compiled on first use and the tree is kept, so evaluating the
//! same instance again (a breakpoint condition hit in a loop, say) walks the
//! cached tree without scanning or parsing again.
//!
//! ```rust,no_run
//! use jdb_eval::expression::ExpressionParser;
//! use jdb_eval::memory::Memory;
//! use jdb_eval::mirror::MirrorEvaluator;
//!
//! # fn main() -> jdb_eval::error::Result<()> {
//! let memory = Memory::from_json(&std::fs::read_to_string("snapshot.json")?)?;
//! let evaluator = MirrorEvaluator::new(&memory);
//!
//! let mut parser = ExpressionParser::new_instance("count * 2 + 1");
//! println!("{}", parser.evaluate(&evaluator)?);
//! # Ok(())
//! # }
//! ```

use crate::error::{EvalError, Result};
use crate::evaluator::{Evaluator, Lvalue, RuntimeValue};
use crate::expr::Expr;
use crate::interpreter::Interpreter;
use crate::parser::{Diagnostic, Parser};
use crate::scanner::Scanner;
use crate::token::Token;

use log::{info, warn};

pub struct ExpressionParser {
    text: String,
    ast: Option<Expr>,
    compilations: usize,
    collect_diagnostics: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ExpressionParser {
    pub fn new_instance(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ast: None,
            compilations: 0,
            collect_diagnostics: false,
            diagnostics: Vec::new(),
        }
    }

    /// Builder form of [`set_collect_diagnostics`](Self::set_collect_diagnostics).
    pub fn collecting_diagnostics(mut self, collect: bool) -> Self {
        self.collect_diagnostics = collect;
        self
    }

    /// When on, syntax messages are kept in [`diagnostics`](Self::diagnostics)
    /// instead of being logged, and the parser recovers to report as many as
    /// it can.
    pub fn set_collect_diagnostics(&mut self, collect: bool) {
        self.collect_diagnostics = collect;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_parsed(&self) -> bool {
        self.ast.is_some()
    }

    /// How many times the text has been compiled.
    pub fn compilations(&self) -> usize {
        self.compilations
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The tree, compiling the text if that has not happened yet.  A failed
    /// compile leaves the instance unparsed.
    pub fn ast(&mut self) -> Result<&Expr> {
        let ast: Expr = match self.ast.take() {
            Some(ast) => ast,
            None => self.compile()?,
        };

        Ok(self.ast.insert(ast))
    }

    /// Evaluate and read the result.
    pub fn evaluate<E: Evaluator>(&mut self, evaluator: &E) -> Result<RuntimeValue<E>> {
        self.evaluate_value(evaluator)?.value()
    }

    /// Evaluate, returning the lvalue so the caller can also assign to it.
    pub fn evaluate_value<'e, E: Evaluator>(&mut self, evaluator: &'e E) -> Result<Lvalue<'e, E>> {
        let ast: &Expr = self.ast()?;

        Interpreter::new(evaluator).evaluate(ast)
    }

    fn compile(&mut self) -> Result<Expr> {
        self.compilations += 1;

        info!("Compiling expression '{}'", self.text);

        let (result, diagnostics) = compile(&self.text, self.collect_diagnostics);

        self.diagnostics = diagnostics;

        result
    }
}

fn compile(text: &str, collect: bool) -> (Result<Expr>, Vec<Diagnostic>) {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for token in Scanner::new(text) {
        match token {
            Ok(token) => tokens.push(token),

            Err(err) => {
                let diagnostic: Diagnostic = Diagnostic::from_error(&err);

                if !collect {
                    warn!("{}", diagnostic);
                    return (Err(diagnostic.into()), diagnostics);
                }

                diagnostics.push(diagnostic);
            }
        }
    }

    if !collect {
        return (Parser::new(&tokens).parse(), diagnostics);
    }

    let mut parser: Parser<'_> = Parser::recovering(&tokens);
    let parsed: Result<Expr> = parser.parse();

    diagnostics.extend(parser.into_diagnostics());

    let result: Result<Expr> = match diagnostics.first() {
        Some(first) => Err(EvalError::from(first.clone())),
        None => parsed,
    };

    (result, diagnostics)
}

/// Text of the assignment that stores `value` into the variable reached by
/// `path`, e.g. `["a", "b", "[2]", "c"]` gives `a.b[2].c=value`.
pub fn assignment_expression<S: AsRef<str>>(path: &[S], value: &str) -> String {
    let mut text = String::new();

    for (i, segment) in path.iter().map(AsRef::as_ref).enumerate() {
        if i > 0 && !segment.starts_with('[') {
            text.push('.');
        }

        text.push_str(segment);
    }

    text.push('=');
    text.push_str(value);

    text
}
