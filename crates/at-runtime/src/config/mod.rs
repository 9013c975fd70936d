//! # Startup Configuration
//!
//! Parses the command line into a [`StartupConfig`]. Parsing only checks
//! syntax; whether the requested backends exist is decided when the Context
//! activates them.
//!
//! ```text
//! atomica -in in.melt -log none -echo screen -pk omp 2 neigh yes -sf omp
//! atomica -k on t 2 -sf kk -nocite
//! atomica -h
//! ```

mod args;

use std::collections::BTreeMap;
use std::path::PathBuf;

use at_styles::SuffixState;
use serde::Serialize;

use crate::error::ConfigError;
use args::ArgCursor;

/// Executable name used when the argument list is empty.
pub const DEFAULT_EXE_NAME: &str = "atomica";
/// Largest world a `-partition` layout may describe.
pub const MAX_PARTITION_RANKS: usize = 1 << 20;
/// Log file written when `-log` is not given.
pub const DEFAULT_LOG_FILE: &str = "log.atomica";

/// Where input commands are echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EchoMode {
    None,
    Screen,
    Log,
    Both,
}

impl EchoMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "none" => Ok(EchoMode::None),
            "screen" => Ok(EchoMode::Screen),
            "log" => Ok(EchoMode::Log),
            "both" => Ok(EchoMode::Both),
            other => Err(ConfigError::InvalidValue {
                option: "-echo".into(),
                value: other.into(),
                expected: "none, screen, log or both",
            }),
        }
    }
}

/// Target of the screen or log channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutputTarget {
    /// Stdout for the screen, [`DEFAULT_LOG_FILE`] for the log.
    Default,
    None,
    Path(PathBuf),
}

impl OutputTarget {
    fn parse(value: &str) -> Self {
        match value {
            "none" => OutputTarget::None,
            path => OutputTarget::Path(PathBuf::from(path)),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OutputTarget::None)
    }
}

/// Source of input commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn is_stdin(&self) -> bool {
        matches!(self, InputSource::Stdin)
    }
}

/// One `-pk <style> <args...>` directive, applied before construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDirective {
    pub style: String,
    pub args: Vec<String>,
}

/// Parsed startup options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupConfig {
    /// `argv[0]`.
    pub exe_name: String,
    pub input: InputSource,
    pub screen: OutputTarget,
    pub log: OutputTarget,
    pub echo: EchoMode,
    /// Build the citation collector.
    pub cite: bool,
    pub help: bool,
    pub suffix: SuffixState,
    /// `Some(args)` after `-k on args...`.
    pub accelerator: Option<Vec<String>>,
    pub packages: Vec<PackageDirective>,
    /// Ranks per partition; empty means a single partition.
    pub partitions: Vec<usize>,
    /// `-var name value...`; a repeated name keeps the last values.
    pub variables: BTreeMap<String, Vec<String>>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            exe_name: DEFAULT_EXE_NAME.to_string(),
            input: InputSource::Stdin,
            screen: OutputTarget::Default,
            log: OutputTarget::Default,
            echo: EchoMode::Log,
            cite: true,
            help: false,
            suffix: SuffixState::disabled(),
            accelerator: None,
            packages: Vec::new(),
            partitions: Vec::new(),
            variables: BTreeMap::new(),
        }
    }
}

impl StartupConfig {
    /// Parse a full argument vector, including the executable name.
    pub fn parse<I, S>(argv: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut config = Self::default();
        let Some((exe, rest)) = argv.split_first() else {
            return Ok(config);
        };
        config.exe_name = exe.clone();

        let mut cursor = ArgCursor::new(rest);
        while let Some(option) = cursor.next_option() {
            match option {
                "-echo" | "-e" => config.echo = EchoMode::parse(cursor.value(option)?)?,
                "-help" | "-h" => config.help = true,
                "-in" | "-i" => config.input = InputSource::File(cursor.value(option)?.into()),
                "-kokkos" | "-k" => match cursor.value(option)? {
                    "on" => config.accelerator = Some(cursor.rest()),
                    "off" => config.accelerator = None,
                    other => {
                        return Err(ConfigError::InvalidValue {
                            option: option.into(),
                            value: other.into(),
                            expected: "on or off",
                        })
                    }
                },
                "-log" | "-l" => config.log = OutputTarget::parse(cursor.value(option)?),
                "-nocite" | "-nc" => config.cite = false,
                "-package" | "-pk" => {
                    let mut values = cursor.values(option)?;
                    let style = values.remove(0);
                    config.packages.push(PackageDirective {
                        style,
                        args: values,
                    });
                }
                "-partition" | "-p" => {
                    for spec in cursor.values(option)? {
                        let (count, size) = parse_partition(&spec)?;
                        let total: usize = config.partitions.iter().sum();
                        if total + count * size > MAX_PARTITION_RANKS {
                            return Err(partition_error(&spec));
                        }
                        config.partitions.extend(std::iter::repeat(size).take(count));
                    }
                }
                "-screen" | "-sc" => config.screen = OutputTarget::parse(cursor.value(option)?),
                "-suffix" | "-sf" => config.suffix = parse_suffix(&mut cursor, option)?,
                "-var" | "-v" => {
                    let mut values = cursor.values(option)?;
                    let name = values.remove(0);
                    config.variables.insert(name, values);
                }
                other => return Err(ConfigError::UnknownOption(other.to_string())),
            }
        }
        Ok(config)
    }

    /// Number of `-pk` directives given on the command line.
    pub fn num_package(&self) -> usize {
        self.packages.len()
    }
}

fn parse_suffix(cursor: &mut ArgCursor<'_>, option: &str) -> Result<SuffixState, ConfigError> {
    let first = cursor.value(option)?;
    if first == "hybrid" {
        let primary = cursor.value(option)?;
        let secondary = cursor.value(option)?;
        Ok(SuffixState::hybrid(primary, secondary)?)
    } else {
        Ok(SuffixState::single(first)?)
    }
}

fn partition_error(spec: &str) -> ConfigError {
    ConfigError::InvalidValue {
        option: "-partition".into(),
        value: spec.into(),
        expected: "NxM or M with positive integers",
    }
}

/// `NxM` is N partitions of M ranks; `M` is one partition of M ranks.
/// Returns `(count, size)`; the layout may span at most
/// [`MAX_PARTITION_RANKS`] ranks.
fn parse_partition(spec: &str) -> Result<(usize, usize), ConfigError> {
    let positive = |s: &str| s.parse::<usize>().ok().filter(|n| *n > 0);

    let (count, size) = match spec.split_once('x') {
        Some((count, size)) => (positive(count), positive(size)),
        None => (Some(1), positive(spec)),
    };
    match (count, size) {
        (Some(count), Some(size))
            if count
                .checked_mul(size)
                .is_some_and(|ranks| ranks <= MAX_PARTITION_RANKS) =>
        {
            Ok((count, size))
        }
        _ => Err(partition_error(spec)),
    }
}
