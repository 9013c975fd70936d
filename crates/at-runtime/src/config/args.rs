//! Cursor over single-dash command-line options.
//!
//! Option values run until the next argument that starts with `-`.

use crate::error::ConfigError;

pub(crate) struct ArgCursor<'a> {
    args: &'a [String],
    pos: usize,
}

impl<'a> ArgCursor<'a> {
    pub(crate) fn new(args: &'a [String]) -> Self {
        Self { args, pos: 0 }
    }

    pub(crate) fn next_option(&mut self) -> Option<&'a str> {
        let arg = self.args.get(self.pos)?;
        self.pos += 1;
        Some(arg.as_str())
    }

    /// Exactly one value.
    pub(crate) fn value(&mut self, option: &str) -> Result<&'a str, ConfigError> {
        match self.args.get(self.pos) {
            Some(v) if !is_option(v) => {
                self.pos += 1;
                Ok(v.as_str())
            }
            _ => Err(ConfigError::MissingValue {
                option: option.to_string(),
            }),
        }
    }

    /// Every value up to the next option; at least one.
    pub(crate) fn values(&mut self, option: &str) -> Result<Vec<String>, ConfigError> {
        let rest = self.rest();
        if rest.is_empty() {
            return Err(ConfigError::MissingValue {
                option: option.to_string(),
            });
        }
        Ok(rest)
    }

    /// Every value up to the next option; possibly none.
    pub(crate) fn rest(&mut self) -> Vec<String> {
        let start = self.pos;
        while self.args.get(self.pos).is_some_and(|a| !is_option(a)) {
            self.pos += 1;
        }
        self.args[start..self.pos].to_vec()
    }
}

fn is_option(arg: &str) -> bool {
    arg.starts_with('-')
}
