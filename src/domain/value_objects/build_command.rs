//! Build Command Value Object
//!
//! A single compiler invocation as an ordered list of tokens. Token 0 is the
//! executable. Flags may appear split (`--out-dir DIR`) or joined
//! (`--out-dir=DIR`); every lookup and removal handles both forms.

use std::fmt;

/// One compiler invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildCommand {
    args: Vec<String>,
}

impl BuildCommand {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    /// The executable, if the command is non-empty
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Value following the first occurrence of `flag`
    pub fn find_value(&self, flag: &str) -> Option<&str> {
        let joined = format!("{}=", flag);
        let mut tokens = self.args.iter();
        while let Some(token) = tokens.next() {
            if token == flag {
                return tokens.next().map(String::as_str);
            }
            if let Some(value) = token.strip_prefix(&joined) {
                return Some(value);
            }
        }
        None
    }

    /// Value of a `-C name=value` codegen option
    pub fn find_codegen(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}=", name);
        let mut tokens = self.args.iter();
        while let Some(token) = tokens.next() {
            let option = if token == "-C" || token == "--codegen" {
                tokens.next().map(String::as_str)
            } else {
                token.strip_prefix("-C")
            };
            if let Some(value) = option.and_then(|o| o.strip_prefix(&prefix)) {
                return Some(value);
            }
        }
        None
    }

    /// Remove `count` tokens starting at the first occurrence of `flag`.
    ///
    /// A joined `flag=value` token counts as the whole span. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, flag: &str, count: usize) -> bool {
        let joined = format!("{}=", flag);
        let Some(index) = self
            .args
            .iter()
            .position(|t| t == flag || t.starts_with(&joined))
        else {
            return false;
        };
        let span = if self.args[index] == flag { count.max(1) } else { 1 };
        let end = (index + span).min(self.args.len());
        self.args.drain(index..end);
        true
    }

    /// Remove every occurrence of `flag` and its arguments
    pub fn remove_all(&mut self, flag: &str, count: usize) {
        while self.remove(flag, count) {}
    }

    /// Remove every `-C name=...` codegen option, split or joined
    pub fn remove_codegen(&mut self, name: &str) {
        let prefix = format!("{}=", name);
        let is_target = |option: &str| option == name || option.starts_with(&prefix);

        let mut kept = Vec::with_capacity(self.args.len());
        let mut tokens = std::mem::take(&mut self.args).into_iter().peekable();
        while let Some(token) = tokens.next() {
            if token == "-C" || token == "--codegen" {
                if tokens.peek().map(|o| is_target(o.as_str())).unwrap_or(false) {
                    tokens.next();
                    continue;
                }
            } else if token.strip_prefix("-C").map(is_target).unwrap_or(false) {
                continue;
            }
            kept.push(token);
        }
        self.args = kept;
    }

    /// Remove every token (after the executable) for which `pred` holds
    pub fn remove_where(&mut self, pred: impl Fn(&str) -> bool) {
        let mut index = 0;
        self.args.retain(|token| {
            index += 1;
            index == 1 || !pred(token.as_str())
        });
    }

    /// Positional `.rs` inputs of the invocation
    pub fn source_inputs(&self) -> Vec<&str> {
        let mut inputs = Vec::new();
        let mut previous: Option<&str> = None;
        for token in self.args.iter().skip(1) {
            let takes_value = matches!(
                previous,
                Some("--extern" | "-L" | "--remap-path-prefix" | "-o" | "--out-dir")
            );
            if is_source_input(token) && !takes_value {
                inputs.push(token.as_str());
            }
            previous = Some(token.as_str());
        }
        inputs
    }

    /// Add `arg` to the end of the invocation
    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Add multiple args to the end of the invocation
    pub fn append<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
    }
}

/// Whether a token looks like a positional Rust source path
pub fn is_source_input(token: &str) -> bool {
    !token.starts_with('-') && token.ends_with(".rs")
}

impl From<Vec<String>> for BuildCommand {
    fn from(args: Vec<String>) -> Self {
        Self::new(args)
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}
