//! Shell-style splitting and quoting of argument strings.
//!
//! Used by the settings form to turn the "Args" field into an argument vector
//! and back again when a custom task is edited.

use thiserror::Error;

#[cfg_attr(not(feature = "tui"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseArgsError {
    #[error("unclosed {0} quote")]
    UnclosedQuote(char),
    #[error("trailing backslash")]
    TrailingEscape,
}

/// Split `input` into arguments honouring single quotes, double quotes and
/// backslash escapes.
#[cfg_attr(not(feature = "tui"), allow(dead_code))]
pub fn parse_args(input: &str) -> Result<Vec<String>, ParseArgsError> {
    let mut args = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty argument) from no argument at all.
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            in_arg = true;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else {
                current.push(c);
            }
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
            in_arg = true;
            continue;
        }
        if c.is_whitespace() {
            if in_arg {
                args.push(std::mem::take(&mut current));
                in_arg = false;
            }
            continue;
        }
        current.push(c);
        in_arg = true;
    }

    if let Some(q) = quote {
        return Err(ParseArgsError::UnclosedQuote(q));
    }
    if escaped {
        return Err(ParseArgsError::TrailingEscape);
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Join arguments into one string, quoting the ones `parse_args` would split.
pub fn join_args(args: &[String]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let needs_quote = arg.is_empty()
            || arg
                .chars()
                .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
        if !needs_quote {
            out.push_str(arg);
            continue;
        }
        out.push('"');
        for c in arg.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_args_handles_quotes_and_escapes() {
        let cases: &[(&str, &[&str])] = &[
            ("simple command", &["simple", "command"]),
            ("echo \"hello world\"", &["echo", "hello world"]),
            ("echo 'hello world'", &["echo", "hello world"]),
            ("git commit -m \"fix: bug\"", &["git", "commit", "-m", "fix: bug"]),
            ("escaped \\\"quote\\\"", &["escaped", "\"quote\""]),
            ("mixed 'quotes' \"here\"", &["mixed", "quotes", "here"]),
            ("   leading and trailing spaces   ", &["leading", "and", "trailing", "spaces"]),
            ("-c 'echo hello'", &["-c", "echo hello"]),
            ("empty \"\" arg", &["empty", "", "arg"]),
            ("", &[]),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_args(input).unwrap(), strings(expected), "input: {input:?}");
        }
    }

    #[test]
    fn parse_args_rejects_unclosed_quote() {
        assert_eq!(
            parse_args("echo 'oops"),
            Err(ParseArgsError::UnclosedQuote('\''))
        );
        assert_eq!(parse_args("echo \\"), Err(ParseArgsError::TrailingEscape));
    }

    #[test]
    fn join_args_quotes_only_when_needed() {
        let cases: &[(&[&str], &str)] = &[
            (&["simple", "command"], "simple command"),
            (&["echo", "hello world"], "echo \"hello world\""),
            (&["git", "commit", "-m", "fix: bug"], "git commit -m \"fix: bug\""),
            (&["empty", ""], "empty \"\""),
            (&["has", "\"quote\""], "has \"\\\"quote\\\"\""),
        ];
        for (input, expected) in cases {
            assert_eq!(join_args(&strings(input)), *expected);
        }
    }

    #[test]
    fn joined_args_parse_back() {
        let args = strings(&["-c", "echo 'hi' \"there\"", "", "a\\b"]);
        assert_eq!(parse_args(&join_args(&args)).unwrap(), args);
    }
}
