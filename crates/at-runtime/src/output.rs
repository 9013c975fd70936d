//! Output channels and the fixed text the Context prints.
//!
//! The banner prefix ([`BANNER_PREFIX`]), the summary prefix
//! ([`SUMMARY_PREFIX`]) and the help header ([`HELP_HEADER`]) are stable;
//! tooling greps process output for them.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use at_styles::{ModuleSet, StyleCategory, StyleRegistry};
use parking_lot::Mutex;

use crate::build_info::BuildInfo;
use crate::config::StartupConfig;

pub const BANNER_PREFIX: &str = "ATOMICA (";
pub const SUMMARY_PREFIX: &str = "Total wall time: ";
pub const HELP_HEADER: &str = "\nAtomica Parallel Simulation Engine - ";

/// A named text sink. Clones share the same underlying writer.
#[derive(Clone)]
pub struct Channel {
    label: String,
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Channel {
    pub fn stdout() -> Self {
        Self::from_writer("stdout", io::stdout())
    }

    /// Create or truncate `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(
            path.display().to_string(),
            BufWriter::new(file),
        ))
    }

    pub fn buffer(buffer: &SharedBuffer) -> Self {
        Self::from_writer("buffer", buffer.clone())
    }

    pub fn from_writer(label: impl Into<String>, sink: impl Write + Send + 'static) -> Self {
        Self {
            label: label.into(),
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Write `text` and flush.
    pub fn emit(&self, text: &str) -> io::Result<()> {
        let mut sink = self.sink.lock();
        sink.write_all(text.as_bytes())?;
        sink.flush()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("label", &self.label).finish()
    }
}

/// In-memory sink that can be read back while a Context writes to it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Facts the banner reports besides the version.
#[derive(Debug, Clone, Default)]
pub struct BannerFacts {
    pub threads: Option<usize>,
    pub accelerator: bool,
    pub suffix: Option<String>,
    pub partitions: usize,
}

pub fn banner(info: &BuildInfo, facts: &BannerFacts) -> String {
    let mut text = format!("{BANNER_PREFIX}{})\n", info.version);
    if info.has_git_info() {
        let _ = writeln!(
            text,
            "  Git info ({} / {})",
            info.git_branch, info.git_descriptor
        );
    }
    if let Some(threads) = facts.threads {
        let _ = writeln!(text, "  using {threads} thread-parallel worker(s) per rank");
    }
    if facts.accelerator {
        text.push_str("  accelerator backend active\n");
    }
    if let Some(suffix) = &facts.suffix {
        let _ = writeln!(text, "  style suffix: {suffix}");
    }
    if facts.partitions > 1 {
        let _ = writeln!(text, "  running on {} partitions", facts.partitions);
    }
    text
}

/// `Total wall time: H:MM:SS`
pub fn summary(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{SUMMARY_PREFIX}{}:{:02}:{:02}\n",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

const OPTIONS: &[(&str, &str)] = &[
    ("-echo none/screen/log/both", "echo input commands (-e)"),
    ("-help", "print this help message (-h)"),
    ("-in filename", "read input from file, not stdin (-i)"),
    ("-kokkos on/off ...", "turn the accelerator on or off (-k)"),
    ("-log none/filename", "where to send log output (-l)"),
    ("-nocite", "disable the citation collector (-nc)"),
    ("-package style ...", "invoke a package command before construction (-pk)"),
    ("-partition size1 size2 ...", "assign partition sizes (-p)"),
    ("-screen none/filename", "where to send screen output (-sc)"),
    ("-suffix omp/kk/hybrid a b", "style suffix to apply (-sf)"),
    ("-var varname value", "set index style variable (-v)"),
];

pub fn help(
    info: &BuildInfo,
    config: &StartupConfig,
    styles: &StyleRegistry,
    modules: &ModuleSet,
) -> String {
    let mut text = format!("{HELP_HEADER}{}\n\n", info.version);
    let _ = writeln!(
        text,
        "Usage example: {} -var t 300 -echo screen -in in.melt\n",
        config.exe_name
    );
    text.push_str("List of command line options supported by this binary:\n\n");
    for (option, meaning) in OPTIONS {
        let _ = writeln!(text, "{option:<30} : {meaning}");
    }

    text.push_str("\nInstalled modules:\n\n");
    if modules.is_empty() {
        text.push_str("(none)\n");
    } else {
        let _ = writeln!(text, "{}", modules.iter().collect::<Vec<_>>().join(" "));
    }

    text.push_str("\nParticle kinds supplied by optional modules:\n\n");
    for (name, module) in styles.styles(StyleCategory::Atom) {
        let _ = writeln!(text, "{name:<16} {module}");
    }
    text
}
