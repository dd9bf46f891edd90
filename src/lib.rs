pub mod ast_printer;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod expression;
pub mod interpreter;
pub mod lvalue;
pub mod memory;
pub mod mirror;
pub mod parser;
pub mod scanner;
pub mod snapshot;
pub mod token;
pub mod value;
