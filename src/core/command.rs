// src/core/command.rs

use std::fmt;

/// Quotes `value` so a POSIX shell reads it back as exactly one literal argument.
///
/// The whole value is wrapped in single quotes and every embedded `'` becomes
/// `'\''` (close, escaped quote, reopen). Nothing else is touched, so `$`,
/// backticks, globs and newlines all stay inert.
pub fn escape(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// A remote command line assembled from static program names and escaped arguments.
///
/// There is intentionally no way to append an unescaped dynamic string: programs,
/// flags and operators must be `&'static str`, everything else goes through [`escape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    line: String,
}

impl ShellCommand {
    /// Starts a command line with `program`.
    pub fn new(program: &'static str) -> Self {
        Self {
            line: program.to_string(),
        }
    }

    /// Appends a literal token, such as a flag or a subcommand.
    pub fn flag(mut self, flag: &'static str) -> Self {
        self.line.push(' ');
        self.line.push_str(flag);
        self
    }

    /// Appends a dynamic argument, escaped.
    pub fn arg(mut self, value: impl AsRef<str>) -> Self {
        self.line.push(' ');
        self.line.push_str(&escape(value.as_ref()));
        self
    }

    /// `cmd > path`
    pub fn write_to(mut self, path: impl AsRef<str>) -> Self {
        self.line.push_str(" > ");
        self.line.push_str(&escape(path.as_ref()));
        self
    }

    /// `cmd >> path`
    pub fn append_to(mut self, path: impl AsRef<str>) -> Self {
        self.line.push_str(" >> ");
        self.line.push_str(&escape(path.as_ref()));
        self
    }

    /// `cmd && next`
    pub fn and_then(mut self, next: Self) -> Self {
        self.line.push_str(" && ");
        self.line.push_str(&next.line);
        self
    }

    /// `cmd || next`
    pub fn or_else(mut self, next: Self) -> Self {
        self.line.push_str(" || ");
        self.line.push_str(&next.line);
        self
    }

    /// `cd <dir> && { cmd; }`. The group keeps `||` fallbacks from running
    /// outside `dir` when the `cd` itself fails.
    pub fn in_dir(self, dir: impl AsRef<str>) -> Self {
        let mut line = Self::new("cd").arg(dir).line;
        line.push_str(" && { ");
        line.push_str(&self.line);
        line.push_str("; }");
        Self { line }
    }

    /// The command line as it will be sent to the remote shell.
    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
