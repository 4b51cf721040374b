pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod slack;

pub use ast::*;
pub use compiler::{CompileError, CompiledProgram, compile, compile_source};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use report::{ConstraintReport, Report, VariableReport};
pub use slack::{Equality, introduce_slack};
