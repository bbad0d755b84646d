pub mod ast;
pub mod cache;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod lexer;
pub mod parser;
pub mod reference;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use cache::{CacheStats, EvaluationCache, DEFAULT_CACHE_CAPACITY};
pub use dependency::DependencyGraph;
pub use error::ExprError;
pub use evaluator::{evaluate, evaluate_expression};
pub use formula::{normalize, Formula, Segment};
pub use lexer::{Lexer, Token};
pub use parser::Parser;
pub use reference::parse_reference;
