//! Logo runner
//!
//! Runs a Logo program and renders the finished canvas to the terminal
//! using half-block characters and 24-bit ANSI colors (no external TUI
//! libraries). With a nonzero --speed the run is animated: every frame
//! the scene is repainted in place before execution resumes.

use clap::Parser;
use logo_rs::logo::canvas::Rgb;
use logo_rs::logo::style;
use logo_rs::logo::turtle::FRAME_MS;
use logo_rs::logo::{Interpreter, RunState};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "logo-rs", about = "An animated Logo turtle-graphics interpreter", version)]
struct Cli {
    /// Logo source file to run
    file: PathBuf,

    /// Turtle style by name (classic, crimson, midnight, sunny)
    #[arg(long, default_value = "classic")]
    style: String,

    /// Milliseconds of animation per motion command; 0 runs instantly
    #[arg(long)]
    speed: Option<u32>,

    /// Animate at the style's suggested speed (overridden by --speed)
    #[arg(long)]
    animate: bool,

    /// Canvas size in pixels, WIDTHxHEIGHT
    #[arg(long, default_value = "160x120")]
    size: String,

    /// Suppress the canvas; print only the trace
    #[arg(long)]
    quiet: bool,
}

fn parse_size(size: &str) -> Option<(u32, u32)> {
    let (w, h) = size.split_once('x')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

/// Paint the scene with half blocks: each character cell covers two
/// vertically stacked pixels, upper as foreground, lower as background.
fn render(out: &mut impl Write, pixels: &[Rgb], width: u32, height: u32) -> io::Result<()> {
    for row in (0..height).step_by(2) {
        for col in 0..width {
            let top = pixels[(row * width + col) as usize];
            let bottom = if row + 1 < height {
                pixels[((row + 1) * width + col) as usize]
            } else {
                top
            };
            write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m\u{2580}",
                top.r, top.g, top.b, bottom.r, bottom.g, bottom.b
            )?;
        }
        writeln!(out, "\x1b[0m")?;
    }
    Ok(())
}

fn paint(out: &mut impl Write, interpreter: &Interpreter) -> io::Result<()> {
    let (pixels, w, h) =
        interpreter.with_turtle(|t| (t.frame(), t.canvas().width(), t.canvas().height()));
    render(out, &pixels, w, h)
}

fn print_trace(out: &mut impl Write, trace: &[String]) -> io::Result<bool> {
    let mut had_errors = false;
    for line in trace {
        if line.starts_with("Error:") {
            had_errors = true;
        }
        writeln!(out, "{}", line)?;
    }
    Ok(had_errors)
}

fn run() -> io::Result<i32> {
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.file)?;
    let (width, height) = match parse_size(&cli.size) {
        Some(dims) => dims,
        None => {
            eprintln!("invalid --size '{}', expected WIDTHxHEIGHT", cli.size);
            return Ok(2);
        }
    };
    let turtle_style = match style::find(&cli.style) {
        Some(s) => s,
        None => {
            eprintln!("unknown --style '{}'", cli.style);
            return Ok(2);
        }
    };

    let speed = cli.speed.unwrap_or(if cli.animate {
        turtle_style.speed_hint_ms
    } else {
        0
    });

    let mut interpreter = Interpreter::new(width, height);
    interpreter.set_style(turtle_style);
    interpreter.set_animation_duration(speed);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let rows = (height + 1) / 2;

    if speed > 0 && !cli.quiet {
        // Animated mode: repaint the scene in place between frames.
        write!(out, "\x1b[?25l")?;
        interpreter.begin(&source);
        let mut painted = false;
        while interpreter.advance() == RunState::Frame {
            if painted {
                write!(out, "\x1b[{}A", rows)?;
            }
            paint(&mut out, &interpreter)?;
            out.flush()?;
            painted = true;
            std::thread::sleep(Duration::from_millis(u64::from(FRAME_MS)));
        }
        if painted {
            write!(out, "\x1b[{}A", rows)?;
        }
        write!(out, "\x1b[?25h")?;
        paint(&mut out, &interpreter)?;
    } else {
        let trace = interpreter.execute(&source);
        if !cli.quiet {
            paint(&mut out, &interpreter)?;
        }
        let had_errors = print_trace(&mut out, &trace)?;
        return Ok(if had_errors { 1 } else { 0 });
    }

    let trace = interpreter.take_trace();
    let had_errors = print_trace(&mut out, &trace)?;
    Ok(if had_errors { 1 } else { 0 })
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
