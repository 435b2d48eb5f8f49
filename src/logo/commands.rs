//! Canonical command names, surface aliases, and command signatures
//!
//! Every surface spelling (short English forms and the Spanish set) maps to
//! one canonical name at lex time, so the parser and interpreter only ever
//! see canonical names. The tables are built once at process start and are
//! read-only afterwards.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Control words that travel as COMMAND tokens but get their own grammar
/// rules in the parser rather than a fixed-arity argument list.
pub const REPEAT: &str = "REPEAT";
pub const IF: &str = "IF";
pub const OUTPUT: &str = "OUTPUT";
pub const RANDOM: &str = "RANDOM";

/// Alias spelling -> canonical command name.
static COMMAND_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let pairs: &[(&str, &[&str])] = &[
        ("FORWARD", &["FORWARD", "FD", "AVANZA", "AV"]),
        ("BACKWARD", &["BACKWARD", "BACK", "BK", "RETROCEDE", "RE"]),
        ("RIGHT", &["RIGHT", "RT", "GIRADERECHA", "GD"]),
        ("LEFT", &["LEFT", "LT", "GIRAIZQUIERDA", "GI"]),
        ("PENUP", &["PENUP", "PU", "SUBELAPIZ", "SL"]),
        ("PENDOWN", &["PENDOWN", "PD", "BAJALAPIZ", "BL"]),
        ("CLEARSCREEN", &["CLEARSCREEN", "CS", "BORRAPANTALLA", "BP"]),
        ("HOME", &["HOME", "CASA"]),
        ("SETPENCOLOR", &["SETPENCOLOR", "SETPC", "PONCOLORLAPIZ", "PONCL"]),
        ("SETHEADING", &["SETHEADING", "SETH", "PONRUMBO"]),
        ("SETX", &["SETX", "PONX"]),
        ("SETY", &["SETY", "PONY"]),
        ("SETPOS", &["SETPOS", "SETXY", "PONPOS"]),
        ("SETBACKGROUND", &["SETBACKGROUND", "SETBG", "PONFONDO"]),
        ("SHOWTURTLE", &["SHOWTURTLE", "ST", "MUESTRATORTUGA", "MT"]),
        ("HIDETURTLE", &["HIDETURTLE", "HT", "OCULTATORTUGA", "OT"]),
        (REPEAT, &["REPEAT", "REPITE"]),
        (IF, &["IF", "SI"]),
        (OUTPUT, &["OUTPUT", "OP", "REPORTA"]),
        (RANDOM, &["RANDOM", "AZAR"]),
    ];
    for (canonical, aliases) in pairs {
        for alias in *aliases {
            m.insert(*alias, *canonical);
        }
    }
    m
});

/// TO/END keyword aliases -> canonical keyword.
static KEYWORD_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for alias in ["TO", "PARA"] {
        m.insert(alias, "TO");
    }
    for alias in ["END", "FIN"] {
        m.insert(alias, "END");
    }
    m
});

/// Canonical command -> number of numeric inputs. Control words (REPEAT, IF,
/// OUTPUT, RANDOM) are deliberately absent.
static SIGNATURES: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for name in ["FORWARD", "BACKWARD", "RIGHT", "LEFT", "SETHEADING", "SETX", "SETY"] {
        m.insert(name, 1);
    }
    for name in [
        "PENUP",
        "PENDOWN",
        "CLEARSCREEN",
        "HOME",
        "SHOWTURTLE",
        "HIDETURTLE",
    ] {
        m.insert(name, 0);
    }
    m.insert("SETPOS", 2);
    m.insert("SETPENCOLOR", 3);
    m.insert("SETBACKGROUND", 3);
    m
});

/// Resolve a surface spelling to its canonical command name.
pub fn lookup_command(word: &str) -> Option<&'static str> {
    COMMAND_ALIASES.get(word.to_uppercase().as_str()).copied()
}

/// Resolve a surface spelling to "TO" or "END".
pub fn lookup_keyword(word: &str) -> Option<&'static str> {
    KEYWORD_ALIASES.get(word.to_uppercase().as_str()).copied()
}

/// Number of arguments a canonical turtle command takes. None for the
/// control words.
pub fn arity(canonical: &str) -> Option<usize> {
    SIGNATURES.get(canonical).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical() {
        assert_eq!(lookup_command("fd"), Some("FORWARD"));
        assert_eq!(lookup_command("Avanza"), Some("FORWARD"));
        assert_eq!(lookup_command("FORWARD"), Some("FORWARD"));
        assert_eq!(lookup_command("bp"), Some("CLEARSCREEN"));
        assert_eq!(lookup_command("azar"), Some(RANDOM));
        assert_eq!(lookup_command("nonsense"), None);
    }

    #[test]
    fn keywords_resolve() {
        assert_eq!(lookup_keyword("para"), Some("TO"));
        assert_eq!(lookup_keyword("End"), Some("END"));
        assert_eq!(lookup_keyword("fd"), None);
    }

    #[test]
    fn signatures_cover_turtle_commands() {
        assert_eq!(arity("FORWARD"), Some(1));
        assert_eq!(arity("SETPOS"), Some(2));
        assert_eq!(arity("SETPENCOLOR"), Some(3));
        assert_eq!(arity("PENUP"), Some(0));
        assert_eq!(arity(REPEAT), None);
        assert_eq!(arity(RANDOM), None);
    }
}
