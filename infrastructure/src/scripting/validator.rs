//! Syntax checking without execution.
//!
//! Lua stops at the first syntax error. To report more than one, the
//! offending line is blanked (keeping the line count, so later positions
//! stay correct) and the source is compiled again. Only self-contained
//! lines are blanked: a line that opens or closes a block, or leaves a
//! bracket or long string open, would turn the rest of the source into
//! follow-on errors. Recovery stops at such a line, when the source
//! compiles, when the error stops moving forward, or after
//! [`MAX_DIAGNOSTICS`] errors.

use mlua::ChunkMode;
use mlua::prelude::*;
use regex::Regex;
use std::sync::OnceLock;
use wikiscript_domain::{Diagnostic, ValidationReport};

/// Upper bound on diagnostics reported for one source.
pub const MAX_DIAGNOSTICS: usize = 10;

fn position_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)^.*?:(\d+): (.*)$").ok())
        .as_ref()
}

/// Split a Lua syntax message (`name:3: unexpected symbol near '='`) into
/// line and text. Messages without a position are returned whole.
fn parse_message(message: &str) -> (Option<u32>, String) {
    let message = message.trim();
    match position_pattern().and_then(|p| p.captures(message)) {
        Some(caps) => (
            caps[1].parse().ok(),
            caps[2].trim().to_string(),
        ),
        None => (None, message.to_string()),
    }
}

/// Whether blanking `line` leaves the block structure around it intact.
fn is_self_contained(line: &str) -> bool {
    let Some(code) = code_only(line) else {
        return false;
    };

    let brackets: i32 = code
        .chars()
        .map(|c| match c {
            '(' | '{' | '[' => 1,
            ')' | '}' | ']' => -1,
            _ => 0,
        })
        .sum();
    let blocks: i32 = code
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map(|word| match word {
            "function" | "do" | "if" | "repeat" => 1,
            "end" | "until" => -1,
            _ => 0,
        })
        .sum();

    brackets == 0 && blocks == 0
}

/// `line` with strings and comments removed, or `None` when a string or
/// long comment is still open at the end of the line.
fn code_only(line: &str) -> Option<String> {
    let mut code = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if let Some(comment) = rest.strip_prefix("--") {
            match long_bracket(comment) {
                Some((open, close)) => rest = after(&comment[open..], &close)?,
                None => break,
            }
        } else if let Some((open, close)) = long_bracket(rest) {
            rest = after(&rest[open..], &close)?;
            code.push(' ');
        } else if c == '"' || c == '\'' {
            rest = after_quote(&rest[1..], c)?;
            code.push(' ');
        } else {
            code.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    Some(code)
}

/// Opening length and closing delimiter of a long bracket (`[[`, `[==[`)
/// at the start of `s`.
fn long_bracket(s: &str) -> Option<(usize, String)> {
    let rest = s.strip_prefix('[')?;
    let level = rest.bytes().take_while(|&b| b == b'=').count();
    rest[level..]
        .starts_with('[')
        .then(|| (level + 2, format!("]{}]", "=".repeat(level))))
}

fn after<'a>(s: &'a str, close: &str) -> Option<&'a str> {
    s.find(close).map(|at| &s[at + close.len()..])
}

fn after_quote(s: &str, quote: char) -> Option<&str> {
    let mut escaped = false;
    for (at, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(&s[at + 1..]);
        }
    }
    None
}

/// Compile `source` in a throwaway VM and collect its syntax errors.
pub fn validate(source: &str, display_name: &str) -> ValidationReport {
    let mut report = ValidationReport::new();
    let lua = match Lua::new_with(LuaStdLib::NONE, LuaOptions::default()) {
        Ok(lua) => lua,
        Err(e) => {
            report.push(Diagnostic::new(format!("validator unavailable: {}", e)));
            return report;
        }
    };

    let mut lines: Vec<&str> = source.split('\n').collect();
    let mut last_line = 0;

    while report.len() < MAX_DIAGNOSTICS {
        let text = lines.join("\n");
        let error = match lua
            .load(text.as_str())
            .set_name(format!("={}", display_name))
            .set_mode(ChunkMode::Text)
            .into_function()
        {
            Ok(_) => break,
            Err(e) => e,
        };

        let message = match &error {
            LuaError::SyntaxError { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let (line, text) = parse_message(&message);
        let diagnostic = Diagnostic::new(text);

        match line {
            Some(line) if line > last_line => {
                report.push(diagnostic.at_line(line));
                last_line = line;
                match lines.get_mut(line as usize - 1) {
                    Some(l) if !l.trim().is_empty() && is_self_contained(l) => *l = "",
                    _ => break,
                }
            }
            Some(_) => break,
            None => {
                report.push(diagnostic);
                break;
            }
        }
    }

    report
}
