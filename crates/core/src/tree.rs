//! Pre-order ASCII tree rendering of a directory.
//!
//! Entries are sorted by name, dot-prefixed and excluded file names are
//! dropped, and connectors are assigned on that filtered list. Excluded
//! directories are skipped after connector assignment, so a trailing
//! excluded directory still holds the `└── ` slot and the visible entry
//! before it is drawn with `├── `.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use projtree_utils::is_hidden;

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};

pub const HEADER: &str = "Project Structure";

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

/// Counts of printed lines by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub directories: usize,
    pub files: usize,
}

// ---------------------------------------------------------------------------
// TreePrinter
// ---------------------------------------------------------------------------

pub struct TreePrinter {
    config: TreeConfig,
}

impl TreePrinter {
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Lazily walk `root`, yielding one formatted line per visible entry.
    pub fn lines(&self, root: &Path) -> TreeLines<'_> {
        self.lines_with_prefix(root, "")
    }

    /// Like [`TreePrinter::lines`], with every line starting with `prefix`.
    pub fn lines_with_prefix(&self, root: &Path, prefix: &str) -> TreeLines<'_> {
        let mut lines = TreeLines {
            config: &self.config,
            stack: Vec::new(),
            pending: None,
            stats: TreeStats::default(),
        };

        match lines.open_frame(root.to_path_buf(), prefix.to_string()) {
            Ok(frame) => lines.stack.push(frame),
            Err(e) => lines.pending = Some(e),
        }

        lines
    }

    /// Write the tree below `root` to `out`, one line at a time.
    pub fn write_tree<W: Write>(&self, root: &Path, mut out: W) -> Result<TreeStats> {
        let mut lines = self.lines(root);

        for line in lines.by_ref() {
            writeln!(out, "{}", line?).map_err(TreeError::Write)?;
        }

        out.flush().map_err(TreeError::Write)?;
        Ok(lines.stats())
    }

    /// Write the header, a blank line, then the tree.
    pub fn write_report<W: Write>(&self, root: &Path, mut out: W) -> Result<TreeStats> {
        writeln!(out, "{HEADER}\n").map_err(TreeError::Write)?;
        self.write_tree(root, out)
    }

    /// Render the full report into a string.
    pub fn render(&self, root: &Path) -> Result<String> {
        let mut buf = Vec::new();
        self.write_report(root, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

// ---------------------------------------------------------------------------
// TreeLines
// ---------------------------------------------------------------------------

/// One directory being walked.
struct Frame {
    dir: PathBuf,
    canonical: Option<PathBuf>,
    names: Vec<OsString>,
    idx: usize,
    prefix: String,
}

/// Lazy pre-order iterator over tree lines.
///
/// Yields at most one `Err`, after which the walk is over.
pub struct TreeLines<'a> {
    config: &'a TreeConfig,
    stack: Vec<Frame>,
    pending: Option<TreeError>,
    stats: TreeStats,
}

impl TreeLines<'_> {
    /// Lines yielded so far, by kind.
    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    fn open_frame(&self, dir: PathBuf, prefix: String) -> Result<Frame> {
        let names = self.visible_names(&dir)?;
        debug!(dir = %dir.display(), entries = names.len(), "listed directory");

        Ok(Frame {
            canonical: fs::canonicalize(&dir).ok(),
            dir,
            names,
            idx: 0,
            prefix,
        })
    }

    /// Sorted names of `dir`, minus hidden and excluded-file names.
    fn visible_names(&self, dir: &Path) -> Result<Vec<OsString>> {
        let read_dir = fs::read_dir(dir).map_err(|source| TreeError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut names = Vec::new();

        for entry in read_dir {
            let entry = entry.map_err(|source| TreeError::ReadEntry {
                path: dir.to_path_buf(),
                source,
            })?;
            names.push(entry.file_name());
        }

        names.sort();
        names.retain(|name| {
            let display = name.to_string_lossy();
            !is_hidden(&display) && !matches_name(self.config, name, TreeConfig::is_excluded_file)
        });
        Ok(names)
    }

    fn on_ancestor_chain(&self, dir: &Path) -> bool {
        let Ok(canonical) = fs::canonicalize(dir) else {
            return false;
        };

        self.stack
            .iter()
            .any(|f| f.canonical.as_deref() == Some(canonical.as_path()))
    }
}

/// Exclusion lists hold UTF-8 names, so a non-UTF-8 name never matches.
fn matches_name(config: &TreeConfig, name: &OsStr, check: fn(&TreeConfig, &str) -> bool) -> bool {
    name.to_str().is_some_and(|n| check(config, n))
}

impl Iterator for TreeLines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.pending.take() {
                self.stack.clear();
                return Some(Err(e));
            }

            let frame = self.stack.last_mut()?;

            if frame.idx >= frame.names.len() {
                self.stack.pop();
                continue;
            }

            let idx = frame.idx;
            frame.idx += 1;

            let is_last = idx + 1 == frame.names.len();
            let connector = if is_last { CORNER } else { BRANCH };
            let os_name = frame.names[idx].clone();
            let path = frame.dir.join(&os_name);
            let name = os_name.to_string_lossy();

            if !path.is_dir() {
                self.stats.files += 1;
                return Some(Ok(format!("{}{connector}{name}", frame.prefix)));
            }

            if matches_name(self.config, &os_name, TreeConfig::is_excluded_dir) {
                trace!(dir = %path.display(), "skipping excluded directory");
                continue;
            }

            let line = format!("{}{connector}{name}/", frame.prefix);
            let child_prefix = format!("{}{}", frame.prefix, if is_last { BLANK } else { PIPE });
            self.stats.directories += 1;

            if self.on_ancestor_chain(&path) {
                warn!(dir = %path.display(), "not descending into directory cycle");
                return Some(Ok(line));
            }

            match self.open_frame(path, child_prefix) {
                Ok(child) => self.stack.push(child),
                // Reported on the next call, after this directory's own line.
                Err(e) => self.pending = Some(e),
            }

            return Some(Ok(line));
        }
    }
}
