//! An animated Logo turtle-graphics interpreter.
//!
//! The pipeline is `logo::tokenize` -> `logo::parse` ->
//! [`logo::Interpreter`], which executes a program while animating an
//! off-screen turtle canvas. Hosts either call `execute` for a complete
//! synchronous run or drive `begin`/`advance` frame by frame and repaint
//! from [`logo::Turtle::frame`] between frames.

pub mod logo;
