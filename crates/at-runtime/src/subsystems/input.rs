//! Command input.

use std::any::Any;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use parking_lot::Mutex;
use serde_json::json;
use shared_types::{Subsystem, SubsystemError, SubsystemKind};
use tracing::warn;

use crate::config::{EchoMode, InputSource};
use crate::container::BuildScope;
use crate::output::Channel;

/// Reads input commands from stdin or the `-in` file.
pub struct CommandInput {
    source: InputSource,
    echo: EchoMode,
    /// Channels each command is echoed to, chosen by `echo`.
    echo_to: Vec<Channel>,
    variables: BTreeMap<String, Vec<String>>,
    file: Option<Mutex<BufReader<File>>>,
}

impl CommandInput {
    /// The `-in` file is opened here; a missing file fails construction.
    pub(crate) fn build(scope: &BuildScope<'_>) -> Result<Self, SubsystemError> {
        let file = match &scope.config.input {
            InputSource::Stdin => None,
            InputSource::File(path) => {
                let file = File::open(path).map_err(|e| {
                    SubsystemError::initialization(
                        SubsystemKind::Input,
                        format!("Cannot open input script {}: {}", path.display(), e),
                    )
                })?;
                Some(Mutex::new(BufReader::new(file)))
            }
        };
        let echo = scope.config.echo;
        let (screen, log) = match echo {
            EchoMode::None => (None, None),
            EchoMode::Screen => (scope.screen, None),
            EchoMode::Log => (None, scope.log),
            EchoMode::Both => (scope.screen, scope.log),
        };
        Ok(Self {
            source: scope.config.input.clone(),
            echo,
            echo_to: [screen, log].into_iter().flatten().cloned().collect(),
            variables: scope.config.variables.clone(),
            file,
        })
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn echo(&self) -> EchoMode {
        self.echo
    }

    /// Values predefined with `-var`.
    pub fn variable(&self, name: &str) -> Option<&[String]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Next non-blank line with comments stripped, or `None` at end of input.
    /// The command is echoed to the channels `-echo` selected.
    pub fn next_command(&self) -> io::Result<Option<String>> {
        loop {
            let mut line = String::new();
            let read = match &self.file {
                Some(file) => file.lock().read_line(&mut line)?,
                None => io::stdin().lock().read_line(&mut line)?,
            };
            if read == 0 {
                return Ok(None);
            }
            let command = line.split('#').next().unwrap_or_default().trim();
            if !command.is_empty() {
                self.echo_command(command);
                return Ok(Some(command.to_string()));
            }
        }
    }

    fn echo_command(&self, command: &str) {
        for channel in &self.echo_to {
            if let Err(e) = channel.emit(&format!("{command}\n")) {
                warn!("[Input] Cannot echo to {}: {}", channel.label(), e);
            }
        }
    }
}

impl std::fmt::Debug for CommandInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInput")
            .field("source", &self.source)
            .field("echo", &self.echo)
            .finish()
    }
}

impl Subsystem for CommandInput {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Input
    }

    fn describe(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "source": self.source,
            "echo": self.echo,
            "variables": self.variables.len(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
