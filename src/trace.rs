//! Token extraction from strace-style output.
//!
//! The fingerprinting core only needs an ordered list of tokens; it never
//! looks at raw trace text. This module is one way to get those tokens: it
//! reads `strace -f -tt` style lines and keeps each line's syscall name.
//!
//! ```text
//! 7577 20:30:38.703575 execve("/usr/bin/python3", [...], 0x7ffc...) = 0   -> execve
//! 7577 20:30:38.704012 brk(NULL)                                   = 0x55... -> brk
//! +++ exited with 0 +++                                                      -> (skipped)
//! ```

use std::io::BufRead;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::ngram::Token;

/// Anything that can produce an ordered token stream.
pub trait TokenSource {
    /// Consume the source and return its tokens in order.
    fn tokens(self) -> Result<Vec<Token>>;
}

impl TokenSource for Vec<Token> {
    fn tokens(self) -> Result<Vec<Token>> {
        Ok(self)
    }
}

fn leading_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([a-zA-Z0-9_]+)\(").expect("valid regex"))
}

fn prefixed_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*?\s+([a-zA-Z0-9_]+)\(").expect("valid regex"))
}

/// Syscall name of one trace line, if it has one.
///
/// The name is the identifier directly before `(`, either at the start of
/// the line or after the first whitespace-delimited prefix (pid, timestamp).
pub fn extract_syscall(line: &str) -> Option<&str> {
    leading_call()
        .captures(line)
        .or_else(|| prefixed_call().captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replace run-dependent values in a trace line with placeholders.
///
/// Hex literals become `<HEX>`, decimal runs `<NUM>`, double-quoted strings
/// `<STR>`, applied in that order.
pub fn normalize_line(line: &str) -> String {
    static HEX: OnceLock<Regex> = OnceLock::new();
    static NUM: OnceLock<Regex> = OnceLock::new();
    static STR: OnceLock<Regex> = OnceLock::new();

    let hex = HEX.get_or_init(|| Regex::new(r"0x[0-9a-fA-F]+").expect("valid regex"));
    let num = NUM.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));
    let string = STR.get_or_init(|| Regex::new(r#"".*?""#).expect("valid regex"));

    let line = hex.replace_all(line, "<HEX>");
    let line = num.replace_all(&line, "<NUM>");
    string.replace_all(&line, "<STR>").into_owned()
}

/// Streaming syscall tokens from a buffered reader, one per matching line.
#[derive(Debug)]
pub struct StraceTokens<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> StraceTokens<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for StraceTokens<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(name) = extract_syscall(&self.line) {
                        return Some(Ok(name.to_owned()));
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

impl<R: BufRead> TokenSource for StraceTokens<R> {
    fn tokens(self) -> Result<Vec<Token>> {
        self.collect()
    }
}

/// Read every syscall name from a trace.
///
/// # Errors
///
/// `Io` if reading fails.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<Token>> {
    let tokens = StraceTokens::new(reader).tokens()?;
    tracing::debug!(tokens = tokens.len(), "parsed trace");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = r#"7577 20:30:38.703575 execve("/usr/bin/python3", ["python3"], 0x7ffc9b7c1000 /* 20 vars */) = 0
7577 20:30:38.704012 brk(NULL)          = 0x55d0c3a4e000
7577 20:30:38.704230 mmap(NULL, 8192, PROT_READ|PROT_WRITE, MAP_PRIVATE|MAP_ANONYMOUS, -1, 0) = 0x7f2b1c000000
7577 20:30:38.704450 openat(AT_FDCWD, "/etc/ld.so.cache", O_RDONLY|O_CLOEXEC) = 3
7577 20:30:38.704601 close(3)           = 0
+++ exited with 0 +++
"#;

    #[test]
    fn extracts_name_after_prefix() {
        let line = r#"7577 20:30:38.703575 execve("/usr/bin/python3", ["python3"]) = 0"#;
        assert_eq!(extract_syscall(line), Some("execve"));
    }

    #[test]
    fn extracts_name_at_line_start() {
        assert_eq!(extract_syscall("brk(NULL) = 0x55d0c3a4e000"), Some("brk"));
    }

    #[test]
    fn skips_lines_without_call() {
        assert_eq!(extract_syscall("+++ exited with 0 +++"), None);
        assert_eq!(extract_syscall(""), None);
    }

    #[test]
    fn normalizes_volatile_values() {
        let line = r#"7577 20:30:38.703575 execve("/usr/bin/python3", 0x7ffc9b7c1000) = 0"#;
        assert_eq!(
            normalize_line(line),
            "<NUM> <NUM>:<NUM>:<NUM>.<NUM> execve(<STR>, <HEX>) = <NUM>"
        );
    }

    #[test]
    fn parses_sample_trace() {
        let tokens = parse_trace(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(tokens, vec!["execve", "brk", "mmap", "openat", "close"]);
    }

    #[test]
    fn vec_is_a_token_source() {
        let tokens = vec!["open".to_string(), "close".to_string()];
        assert_eq!(tokens.clone().tokens().unwrap(), tokens);
    }

    #[test]
    fn read_errors_surface() {
        struct Failing;
        impl std::io::Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            }
        }

        let result = parse_trace(std::io::BufReader::new(Failing));
        assert!(matches!(result, Err(crate::FingerprintError::Io(_))));
    }
}
