//! Tree-walking Logo interpreter with generator-based execution
//!
//! Execution runs inside a genawaiter generator that yields once per
//! animation frame, so a host can repaint between frames and the whole run
//! still completes synchronously when driven to exhaustion. Two passes per
//! run: procedures are registered first (enabling forward references and
//! recursion), then the remaining top-level statements execute in source
//! order. Program-level failures never escape: lex/parse errors are traced
//! before anything draws, and a runtime error aborts the run and lands in
//! the trace.

use crate::logo::commands;
use crate::logo::error::RuntimeError;
use crate::logo::lexer::tokenize;
use crate::logo::parser::{parse, CmpOp, Expr, ExprKind, Stmt, StmtKind};
use crate::logo::style::TurtleStyle;
use crate::logo::turtle::{Motion, Turtle};
use async_recursion::async_recursion;
use genawaiter::rc::{Co, Gen};
use genawaiter::GeneratorState;
use rand::Rng;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const CALL_DEPTH_LIMIT: usize = 128;

/// A Logo value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "a number",
            Value::Str(_) => "a word",
            Value::Bool(_) => "a true/false value",
        }
    }

    fn as_number(&self, what: &str, line: usize) -> Result<f64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(RuntimeError::TypeMismatch {
                message: format!("{} needs a number, got {}", what, other.type_name()),
                line,
            }),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Value::Number(n) => fmt_num(*n),
            Value::Str(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
        }
    }
}

/// Format a number without a trailing ".0" for integral values.
pub fn fmt_num(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e10 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A registered TO/END procedure. Parameter names are stored uppercased.
#[derive(Clone, Debug)]
pub struct Procedure {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Why the interpreter yielded control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YieldReason {
    /// One animation frame elapsed; the host may repaint.
    Frame,
}

/// What `advance` observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Frame,
    Done,
}

type Scope = HashMap<String, Value>;

/// Internal interpreter state, shared between the generator and its owner.
pub struct InterpreterState {
    globals: Scope,
    procedures: HashMap<String, Procedure>,
    trace: Vec<String>,
    stop_requested: bool,
    call_depth: usize,
    pub turtle: Turtle,
}

impl InterpreterState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            globals: Scope::new(),
            procedures: HashMap::new(),
            trace: Vec::new(),
            stop_requested: false,
            call_depth: 0,
            turtle: Turtle::new(width, height),
        }
    }

    /// Fresh program state for a new run. The turtle persists across runs.
    fn reset(&mut self) {
        self.globals.clear();
        self.procedures.clear();
        self.trace.clear();
        self.stop_requested = false;
        self.call_depth = 0;
    }
}

/// Trait for resumable generators.
trait Resumable {
    fn resume_gen(&mut self) -> Option<YieldReason>;
}

struct GenWrapper<F: std::future::Future<Output = ()>> {
    gen: Gen<YieldReason, (), F>,
}

impl<F: std::future::Future<Output = ()>> Resumable for GenWrapper<F> {
    fn resume_gen(&mut self) -> Option<YieldReason> {
        match self.gen.resume() {
            GeneratorState::Yielded(y) => Some(y),
            GeneratorState::Complete(()) => None,
        }
    }
}

type BoxedGenerator = Box<dyn Resumable>;

/// The Logo interpreter. One execution is in flight per instance at a time;
/// starting a second run while one is active is rejected.
pub struct Interpreter {
    state: Rc<RefCell<InterpreterState>>,
    generator: Option<BoxedGenerator>,
}

impl Interpreter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(InterpreterState::new(width, height))),
            generator: None,
        }
    }

    /// Run a program to completion and return its trace. Never panics on
    /// program errors; they come back as `Error:` lines in the trace.
    pub fn execute(&mut self, source: &str) -> Vec<String> {
        if !self.begin(source) {
            return vec!["Error: a program is already running".to_string()];
        }
        while self.advance() == RunState::Frame {}
        self.take_trace()
    }

    /// Start a run without driving it. Returns false (and does nothing) if
    /// a run is already in flight. After a successful begin, call `advance`
    /// until it returns `Done`, repainting from the turtle between frames.
    pub fn begin(&mut self, source: &str) -> bool {
        if self.generator.is_some() {
            return false;
        }

        self.state.borrow_mut().reset();

        // ERROR tokens surface as parse errors, so the parser is the only
        // reporter and each bad lexeme is diagnosed once.
        let (program, parse_errors) = parse(tokenize(source));
        let errors: Vec<String> = parse_errors
            .iter()
            .map(|e| format!("Error: {}", e))
            .collect();

        // A malformed program never partially draws.
        if !errors.is_empty() {
            self.state.borrow_mut().trace = errors;
            return true;
        }

        // Pre-pass: register every procedure before anything executes.
        {
            let mut state = self.state.borrow_mut();
            for stmt in &program {
                if let StmtKind::Procedure { name, params, body } = &stmt.kind {
                    state.procedures.insert(
                        name.to_uppercase(),
                        Procedure {
                            params: params.iter().map(|p| p.to_uppercase()).collect(),
                            body: body.clone(),
                        },
                    );
                }
            }
        }

        let gen = create_execution_generator(self.state.clone(), program);
        self.generator = Some(Box::new(GenWrapper { gen }));
        true
    }

    /// Resume the in-flight run until its next animation frame or the end.
    pub fn advance(&mut self) -> RunState {
        match self.generator.as_mut().map(|g| g.resume_gen()) {
            Some(Some(YieldReason::Frame)) => RunState::Frame,
            Some(None) => {
                self.generator = None;
                RunState::Done
            }
            None => RunState::Done,
        }
    }

    pub fn is_running(&self) -> bool {
        self.generator.is_some()
    }

    /// Advisory cancellation, polled at statement and loop boundaries.
    pub fn request_stop(&mut self) {
        self.state.borrow_mut().stop_requested = true;
    }

    pub fn take_trace(&mut self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().trace)
    }

    pub fn set_style(&mut self, style: &'static TurtleStyle) {
        self.state.borrow_mut().turtle.set_style(style);
    }

    pub fn set_animation_duration(&mut self, ms: u32) {
        self.state.borrow_mut().turtle.set_duration_ms(ms);
    }

    pub fn with_turtle<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Turtle) -> R,
    {
        f(&self.state.borrow().turtle)
    }

    pub fn with_turtle_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Turtle) -> R,
    {
        f(&mut self.state.borrow_mut().turtle)
    }
}

fn create_execution_generator(
    state: Rc<RefCell<InterpreterState>>,
    program: Vec<Stmt>,
) -> Gen<YieldReason, (), impl std::future::Future<Output = ()>> {
    Gen::new(|co: Co<YieldReason>| async move {
        run_program(&co, &state, &program).await;
    })
}

/// Result of executing a statement.
enum StmtResult {
    Continue,
    Output(Value),
    Stopped,
    Error(RuntimeError),
}

/// Why expression evaluation could not produce a value.
enum Interrupt {
    Stopped,
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Error(err)
    }
}

impl From<Interrupt> for StmtResult {
    fn from(int: Interrupt) -> Self {
        match int {
            Interrupt::Stopped => StmtResult::Stopped,
            Interrupt::Error(e) => StmtResult::Error(e),
        }
    }
}

async fn run_program(co: &Co<YieldReason>, state: &Rc<RefCell<InterpreterState>>, program: &[Stmt]) {
    let scope = state.borrow().globals.clone();

    for stmt in program {
        if state.borrow().stop_requested {
            state.borrow_mut().trace.push("Stopped.".to_string());
            return;
        }

        let result = run_stmt(co, state, stmt, &scope).await;
        match result {
            StmtResult::Continue => {}
            StmtResult::Output(_) => {
                let err = RuntimeError::StrayOutput { line: stmt.line };
                state.borrow_mut().trace.push(format!("Error: {}", err));
                return;
            }
            StmtResult::Stopped => {
                state.borrow_mut().trace.push("Stopped.".to_string());
                return;
            }
            StmtResult::Error(err) => {
                state.borrow_mut().trace.push(format!("Error: {}", err));
                return;
            }
        }
    }
}

#[async_recursion(?Send)]
async fn run_stmt(
    co: &Co<YieldReason>,
    state: &Rc<RefCell<InterpreterState>>,
    stmt: &Stmt,
    scope: &Scope,
) -> StmtResult {
    match &stmt.kind {
        StmtKind::Command { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                match eval_expr(co, state, arg, scope).await {
                    Ok(v) => values.push(v),
                    Err(int) => return int.into(),
                }
            }
            trace_call(state, name, &values);
            match run_command(co, state, name, &values, stmt.line).await {
                Ok(()) => StmtResult::Continue,
                Err(int) => int.into(),
            }
        }

        StmtKind::Repeat { count, body } => {
            let n = match eval_expr(co, state, count, scope).await {
                Ok(v) => match v.as_number("REPEAT", stmt.line) {
                    Ok(n) => n,
                    Err(e) => return StmtResult::Error(e),
                },
                Err(int) => return int.into(),
            };
            if n < 0.0 || n.fract() != 0.0 {
                return StmtResult::Error(RuntimeError::BadRepeatCount { line: stmt.line });
            }

            // Each iteration reuses the enclosing scope.
            for _ in 0..(n as u64) {
                if state.borrow().stop_requested {
                    return StmtResult::Stopped;
                }
                for inner in body {
                    match run_stmt(co, state, inner, scope).await {
                        StmtResult::Continue => {}
                        other => return other,
                    }
                }
            }
            StmtResult::Continue
        }

        StmtKind::If { condition, body } => {
            let value = match eval_expr(co, state, condition, scope).await {
                Ok(v) => v,
                Err(int) => return int.into(),
            };
            let truthy = match value {
                Value::Bool(b) => b,
                Value::Number(n) => n != 0.0,
                other => {
                    return StmtResult::Error(RuntimeError::TypeMismatch {
                        message: format!("IF needs a true/false value, got {}", other.type_name()),
                        line: stmt.line,
                    })
                }
            };
            if truthy {
                for inner in body {
                    match run_stmt(co, state, inner, scope).await {
                        StmtResult::Continue => {}
                        other => return other,
                    }
                }
            }
            StmtResult::Continue
        }

        // Registered during the pre-pass; nothing to do in source order.
        StmtKind::Procedure { .. } => StmtResult::Continue,

        StmtKind::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                match eval_expr(co, state, arg, scope).await {
                    Ok(v) => values.push(v),
                    Err(int) => return int.into(),
                }
            }
            trace_call(state, name, &values);
            // A statement-position call discards any OUTPUT value.
            match call_procedure(co, state, name, values, stmt.line).await {
                Ok(_) => StmtResult::Continue,
                Err(int) => int.into(),
            }
        }

        StmtKind::Output { value } => match eval_expr(co, state, value, scope).await {
            Ok(v) => StmtResult::Output(v),
            Err(int) => int.into(),
        },
    }
}

fn trace_call(state: &Rc<RefCell<InterpreterState>>, name: &str, args: &[Value]) {
    let mut line = name.to_lowercase();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.display());
    }
    state.borrow_mut().trace.push(line);
}

/// Execute a user procedure: arguments were evaluated in the caller's
/// scope; the callee scope is a snapshot of the globals plus its bound
/// parameters, so nothing leaks back out.
#[async_recursion(?Send)]
async fn call_procedure(
    co: &Co<YieldReason>,
    state: &Rc<RefCell<InterpreterState>>,
    name: &str,
    args: Vec<Value>,
    line: usize,
) -> Result<Option<Value>, Interrupt> {
    let key = name.to_uppercase();
    let procedure = match state.borrow().procedures.get(&key).cloned() {
        Some(p) => p,
        None => {
            return Err(RuntimeError::UnknownProcedure {
                name: key,
                line,
            }
            .into())
        }
    };

    if args.len() != procedure.params.len() {
        return Err(RuntimeError::ArityMismatch {
            name: key,
            expected: procedure.params.len(),
            got: args.len(),
            line,
        }
        .into());
    }

    {
        let mut s = state.borrow_mut();
        if s.call_depth >= CALL_DEPTH_LIMIT {
            return Err(RuntimeError::RecursionLimit { line }.into());
        }
        s.call_depth += 1;
    }

    let mut callee_scope = state.borrow().globals.clone();
    for (param, value) in procedure.params.iter().zip(args) {
        callee_scope.insert(param.clone(), value);
    }

    let mut outcome = Ok(None);
    for stmt in &procedure.body {
        if state.borrow().stop_requested {
            outcome = Err(Interrupt::Stopped);
            break;
        }
        match run_stmt(co, state, stmt, &callee_scope).await {
            StmtResult::Continue => {}
            StmtResult::Output(v) => {
                outcome = Ok(Some(v));
                break;
            }
            StmtResult::Stopped => {
                outcome = Err(Interrupt::Stopped);
                break;
            }
            StmtResult::Error(e) => {
                outcome = Err(e.into());
                break;
            }
        }
    }

    state.borrow_mut().call_depth -= 1;
    outcome
}

/// Dispatch a canonical command to its turtle primitive, validating arity
/// and types against the fixed signature table.
async fn run_command(
    co: &Co<YieldReason>,
    state: &Rc<RefCell<InterpreterState>>,
    name: &str,
    args: &[Value],
    line: usize,
) -> Result<(), Interrupt> {
    let expected = commands::arity(name).unwrap_or(0);
    if args.len() != expected {
        return Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected,
            got: args.len(),
            line,
        }
        .into());
    }
    let num = |i: usize| args[i].as_number(name, line);

    match name {
        "FORWARD" => {
            let d = num(0)?;
            let motion = state.borrow_mut().turtle.forward(d);
            animate(co, state, motion).await;
        }
        "BACKWARD" => {
            let d = num(0)?;
            let motion = state.borrow_mut().turtle.backward(d);
            animate(co, state, motion).await;
        }
        "RIGHT" => {
            let d = num(0)?;
            let motion = state.borrow_mut().turtle.right(d);
            animate(co, state, motion).await;
        }
        "LEFT" => {
            let d = num(0)?;
            let motion = state.borrow_mut().turtle.left(d);
            animate(co, state, motion).await;
        }
        "SETHEADING" => {
            let h = num(0)?;
            let motion = state.borrow_mut().turtle.set_heading(h);
            animate(co, state, motion).await;
        }
        "SETX" => {
            let x = num(0)?;
            let motion = state.borrow_mut().turtle.set_x(x);
            animate(co, state, motion).await;
        }
        "SETY" => {
            let y = num(0)?;
            let motion = state.borrow_mut().turtle.set_y(y);
            animate(co, state, motion).await;
        }
        "SETPOS" => {
            let (x, y) = (num(0)?, num(1)?);
            let motion = state.borrow_mut().turtle.set_pos(x, y);
            animate(co, state, motion).await;
        }
        "HOME" => {
            let motion = state.borrow_mut().turtle.home();
            animate(co, state, motion).await;
        }
        "PENUP" => state.borrow_mut().turtle.pen_up(),
        "PENDOWN" => state.borrow_mut().turtle.pen_down(),
        "SHOWTURTLE" => state.borrow_mut().turtle.show(),
        "HIDETURTLE" => state.borrow_mut().turtle.hide(),
        "CLEARSCREEN" => state.borrow_mut().turtle.clear_screen(),
        "SETPENCOLOR" => {
            let (r, g, b) = (num(0)?, num(1)?, num(2)?);
            state.borrow_mut().turtle.set_pen_color(r, g, b);
        }
        "SETBACKGROUND" => {
            let (r, g, b) = (num(0)?, num(1)?, num(2)?);
            state.borrow_mut().turtle.set_background(r, g, b);
        }
        other => {
            return Err(RuntimeError::UnknownProcedure {
                name: other.to_string(),
                line,
            }
            .into())
        }
    }

    Ok(())
}

/// Drive a motion to completion, yielding one frame per tick so the host
/// can repaint. Instant mode (duration 0) never yields.
async fn animate(co: &Co<YieldReason>, state: &Rc<RefCell<InterpreterState>>, mut motion: Motion) {
    loop {
        let (done, instant) = {
            let mut s = state.borrow_mut();
            let done = s.turtle.tick(&mut motion);
            (done, s.turtle.duration_ms() == 0)
        };
        if instant {
            if done {
                return;
            }
            continue;
        }
        co.yield_(YieldReason::Frame).await;
        if done {
            return;
        }
    }
}

#[async_recursion(?Send)]
async fn eval_expr(
    co: &Co<YieldReason>,
    state: &Rc<RefCell<InterpreterState>>,
    expr: &Expr,
    scope: &Scope,
) -> Result<Value, Interrupt> {
    match &expr.kind {
        ExprKind::Number(n) => Ok(Value::Number(*n)),

        ExprKind::Variable(name) => {
            let key = name.to_uppercase();
            match scope.get(&key) {
                Some(v) => Ok(v.clone()),
                None => Err(RuntimeError::UndefinedVariable {
                    name: key,
                    line: expr.line,
                }
                .into()),
            }
        }

        ExprKind::Random(bound) => {
            let b = eval_expr(co, state, bound, scope)
                .await?
                .as_number("RANDOM", expr.line)?;
            if b < 1.0 || b.fract() != 0.0 {
                return Err(RuntimeError::BadRandomBound { line: expr.line }.into());
            }
            let r = rand::thread_rng().gen_range(0..b as i64);
            Ok(Value::Number(r as f64))
        }

        ExprKind::Binary { op, left, right } => {
            let l = eval_expr(co, state, left, scope)
                .await?
                .as_number("arithmetic", expr.line)?;
            let r = eval_expr(co, state, right, scope)
                .await?
                .as_number("arithmetic", expr.line)?;
            let result = match op {
                '+' => l + r,
                '-' => l - r,
                '*' => l * r,
                '/' => {
                    if r == 0.0 {
                        return Err(RuntimeError::DivisionByZero { line: expr.line }.into());
                    }
                    l / r
                }
                _ => {
                    return Err(RuntimeError::TypeMismatch {
                        message: format!("unknown operator '{}'", op),
                        line: expr.line,
                    }
                    .into())
                }
            };
            Ok(Value::Number(result))
        }

        ExprKind::Comparison { op, left, right } => {
            let l = eval_expr(co, state, left, scope).await?;
            let r = eval_expr(co, state, right, scope).await?;
            let result = match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => match op {
                    CmpOp::Lt => a < b,
                    CmpOp::Gt => a > b,
                    CmpOp::Eq => a == b,
                    CmpOp::Ne => a != b,
                },
                (Value::Str(a), Value::Str(b)) if matches!(op, CmpOp::Eq | CmpOp::Ne) => {
                    let eq = a.eq_ignore_ascii_case(b);
                    if *op == CmpOp::Eq {
                        eq
                    } else {
                        !eq
                    }
                }
                (Value::Bool(a), Value::Bool(b)) if matches!(op, CmpOp::Eq | CmpOp::Ne) => {
                    if *op == CmpOp::Eq {
                        a == b
                    } else {
                        a != b
                    }
                }
                _ => {
                    return Err(RuntimeError::TypeMismatch {
                        message: format!(
                            "cannot compare {} with {} using '{}'",
                            l.type_name(),
                            r.type_name(),
                            op.as_str()
                        ),
                        line: expr.line,
                    }
                    .into())
                }
            };
            Ok(Value::Bool(result))
        }

        ExprKind::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(co, state, arg, scope).await?);
            }
            match call_procedure(co, state, name, values, expr.line).await? {
                Some(v) => Ok(v),
                None => Err(RuntimeError::NoOutput {
                    name: name.to_uppercase(),
                    line: expr.line,
                }
                .into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp() -> Interpreter {
        Interpreter::new(300, 300)
    }

    fn run(src: &str) -> (Interpreter, Vec<String>) {
        let mut i = interp();
        let trace = i.execute(src);
        (i, trace)
    }

    fn pose_of(i: &Interpreter) -> (f64, f64, f64) {
        i.with_turtle(|t| (t.pose().x, t.pose().y, t.pose().heading))
    }

    fn errors_in(trace: &[String]) -> Vec<&String> {
        trace.iter().filter(|l| l.starts_with("Error:")).collect()
    }

    #[test]
    fn repeat_displaces_by_count() {
        for n in [0u32, 1, 7, 25] {
            let (i, trace) = run(&format!("REPEAT {} [ FD 1 ]", n));
            let (x, y, heading) = pose_of(&i);
            assert!(errors_in(&trace).is_empty());
            assert!(x.abs() < 1e-9);
            assert!((y - n as f64).abs() < 1e-9, "n = {}", n);
            assert_eq!(heading, 0.0);
        }
    }

    #[test]
    fn turns_normalize_heading() {
        let (i, _) = run("RT 370");
        assert!((pose_of(&i).2 - 10.0).abs() < 1e-9);

        let (i, _) = run("LT 10");
        assert!((pose_of(&i).2 - 350.0).abs() < 1e-9);
    }

    #[test]
    fn square_returns_to_start() {
        let (i, trace) = run("REPEAT 4 [ FD 100 RT 90 ]");
        assert!(errors_in(&trace).is_empty());
        let (x, y, heading) = pose_of(&i);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        assert!(heading.abs() < 1e-6);
    }

    #[test]
    fn random_stays_in_range() {
        // The trace records each evaluated SETHEADING argument.
        let (_, trace) = run("REPEAT 1000 [ SETH RANDOM 5 ]");
        let mut seen = std::collections::HashSet::new();
        let mut samples = 0;
        for line in &trace {
            if let Some(rest) = line.strip_prefix("setheading ") {
                let v: f64 = rest.parse().expect("numeric argument");
                assert!(v.fract() == 0.0);
                assert!((0.0..5.0).contains(&v), "out of range: {}", v);
                seen.insert(v as i64);
                samples += 1;
            }
        }
        assert_eq!(samples, 1000);
        assert!(seen.len() >= 2, "RANDOM 5 never varied");
    }

    #[test]
    fn random_one_is_always_zero() {
        let (_, trace) = run("REPEAT 50 [ SETH RANDOM 1 ]");
        for line in trace.iter().filter(|l| l.starts_with("setheading")) {
            assert_eq!(line.as_str(), "setheading 0");
        }
    }

    #[test]
    fn division_by_zero_aborts_the_run() {
        let (i, trace) = run("FD 1 / 0 FD 10");
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("division by zero"));
        // Nothing after the failing statement ran, and the failing FORWARD
        // itself never moved.
        assert!(!trace.iter().any(|l| l.starts_with("forward")));
        assert_eq!(pose_of(&i).1, 0.0);
    }

    #[test]
    fn forward_references_resolve() {
        let src = "FD 10 SQ 10\nTO SQ :S REPEAT 4 [ FD :S RT 90 ] END";
        let (i, trace) = run(src);
        assert!(errors_in(&trace).is_empty(), "trace: {:?}", trace);
        // The square brings the turtle back to where SQ started.
        assert!((pose_of(&i).1 - 10.0).abs() < 1e-6);
    }

    #[test]
    fn recursive_procedures_work() {
        let src = "TO SPIRAL :LEN IF :LEN < 20 [ FD :LEN RT 90 SPIRAL :LEN + 5 ] END\nSPIRAL 5";
        let (_, trace) = run(src);
        assert!(errors_in(&trace).is_empty(), "trace: {:?}", trace);
        let moves = trace.iter().filter(|l| l.starts_with("forward")).count();
        assert_eq!(moves, 3); // 5, 10, 15
    }

    #[test]
    fn runaway_recursion_is_reported() {
        let src = "TO LOOPY LOOPY END\nLOOPY";
        let (_, trace) = run(src);
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("nested"), "got: {}", errs[0]);
    }

    #[test]
    fn output_returns_a_value() {
        let src = "TO TWICE :N OUTPUT :N * 2 END\nFD TWICE 5";
        let (i, trace) = run(src);
        assert!(errors_in(&trace).is_empty(), "trace: {:?}", trace);
        assert!((pose_of(&i).1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn call_without_output_cannot_be_an_argument() {
        let src = "TO NOP FD 0 END\nFD NOP";
        let (_, trace) = run(src);
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("did not output"));
    }

    #[test]
    fn output_at_top_level_is_an_error() {
        let (_, trace) = run("OUTPUT 5");
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("inside a procedure"));
    }

    #[test]
    fn parameters_do_not_leak_out_of_calls() {
        let src = "TO P :X FD :X END\nP 5\nFD :X";
        let (i, trace) = run(src);
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains(":X has no value"));
        assert!((pose_of(&i).1 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn arity_mismatch_is_a_runtime_error() {
        let src = "TO P :X FD :X END\nP 1 2";
        let (_, trace) = run(src);
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("expects 1 inputs, got 2"));
    }

    #[test]
    fn unknown_procedure_is_reported() {
        let (_, trace) = run("WIBBLE 3");
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("I don't know how to WIBBLE"));
    }

    #[test]
    fn pen_color_channels_clamp_without_error() {
        let (i, trace) = run("SETPC 999 0 0 FD 10");
        assert!(errors_in(&trace).is_empty());
        let color = i.with_turtle(|t| t.pose().pen_color);
        assert_eq!(color, crate::logo::canvas::Rgb::new(255, 0, 0));
    }

    #[test]
    fn parse_errors_skip_execution_entirely() {
        let (i, trace) = run("FD 50\nREPEAT 3 [ FD 10");
        assert!(!errors_in(&trace).is_empty());
        // The valid FD 50 before the error must not have drawn.
        assert_eq!(pose_of(&i).1, 0.0);
        assert_eq!(i.with_turtle(|t| t.canvas().painted()), 0);
    }

    #[test]
    fn lex_errors_are_traced_with_position() {
        let (_, trace) = run("FD 10\n@@ 5");
        let errs = errors_in(&trace);
        assert!(errs.iter().any(|l| l.contains("line 2") && l.contains("@@")));
    }

    #[test]
    fn bad_lexeme_is_diagnosed_exactly_once() {
        let (_, trace) = run("@@ 5");
        let errs = errors_in(&trace);
        assert_eq!(errs.len(), 1, "trace: {:?}", trace);
        assert!(errs[0].contains("unrecognized token '@@'"));
    }

    #[test]
    fn extreme_coordinates_run_without_panicking() {
        let (i, trace) = run("SETX -3000000000 SETX 3000000000");
        assert!(errors_in(&trace).is_empty(), "trace: {:?}", trace);
        assert!((pose_of(&i).0 - 3000000000.0).abs() < 1e-3);

        // Drawing across the surface from far outside still lands strokes
        // only on the canvas.
        let (i, trace) = run("PU SETX -3000000000 PD SETX 3000000000 HT");
        assert!(errors_in(&trace).is_empty(), "trace: {:?}", trace);
        assert!(i.with_turtle(|t| t.canvas().painted()) > 0);
    }

    #[test]
    fn spanish_aliases_run_like_english() {
        let (i, trace) = run("REPITE 4 [ AV 100 GD 90 ]");
        assert!(errors_in(&trace).is_empty());
        let (x, y, _) = pose_of(&i);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn if_gates_its_body() {
        let (i, _) = run("IF 1 < 2 [ FD 5 ]");
        assert!((pose_of(&i).1 - 5.0).abs() < 1e-9);

        let (i, _) = run("IF 2 < 1 [ FD 5 ]");
        assert_eq!(pose_of(&i).1, 0.0);

        // Numeric condition: nonzero means true.
        let (i, _) = run("IF 3 [ FD 5 ]");
        assert!((pose_of(&i).1 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn clearscreen_resets_pose_and_surface() {
        let (i, trace) = run("FD 40 RT 45 PU CS");
        assert!(errors_in(&trace).is_empty());
        let (x, y, heading) = pose_of(&i);
        assert_eq!((x, y, heading), (0.0, 0.0, 0.0));
        assert!(i.with_turtle(|t| t.pose().pen_down));
        assert_eq!(i.with_turtle(|t| t.canvas().painted()), 0);
    }

    #[test]
    fn turtle_state_persists_across_runs() {
        let mut i = interp();
        i.execute("FD 5");
        i.execute("FD 5");
        assert!((pose_of(&i).1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn procedures_reset_between_runs() {
        let mut i = interp();
        let trace = i.execute("TO P FD 1 END\nP");
        assert!(errors_in(&trace).is_empty());
        let trace = i.execute("P");
        assert!(errors_in(&trace)
            .iter()
            .any(|l| l.contains("I don't know how to P")));
    }

    #[test]
    fn stop_request_halts_at_a_checkpoint() {
        let mut i = interp();
        i.set_animation_duration(64); // several frames per primitive
        assert!(i.begin("REPEAT 100000 [ FD 1 ]"));
        assert_eq!(i.advance(), RunState::Frame);
        assert_eq!(i.advance(), RunState::Frame);
        i.request_stop();
        while i.advance() == RunState::Frame {}
        let trace = i.take_trace();
        assert!(trace.iter().any(|l| l == "Stopped."));
        assert!(!i.is_running());
    }

    #[test]
    fn concurrent_begin_is_rejected() {
        let mut i = interp();
        i.set_animation_duration(64);
        assert!(i.begin("FD 100"));
        assert_eq!(i.advance(), RunState::Frame);
        assert!(!i.begin("FD 1"));
        i.request_stop();
        while i.advance() == RunState::Frame {}
    }

    #[test]
    fn trace_records_commands_in_order() {
        let (_, trace) = run("FD 10 RT 90 PU");
        assert_eq!(trace, vec!["forward 10", "right 90", "penup"]);
    }

    #[test]
    fn setpos_and_setxy_move_the_turtle() {
        let (i, trace) = run("SETPOS 30 40");
        assert!(errors_in(&trace).is_empty());
        let (x, y, _) = pose_of(&i);
        assert!((x - 30.0).abs() < 1e-9 && (y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn fmt_num_trims_integral_values() {
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(-3.0), "-3");
    }
}
