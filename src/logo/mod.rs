//! Logo language interpreter and turtle graphics

pub mod canvas;
pub mod commands;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod style;
pub mod turtle;

pub use canvas::{Canvas, Rgb};
pub use error::{ParseError, RuntimeError};
pub use interpreter::{Interpreter, RunState, Value};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, Expr, Stmt};
pub use style::{TurtleStyle, STYLES};
pub use turtle::{Pose, Turtle};
