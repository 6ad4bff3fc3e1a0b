//! Per-run counters. Logged and printed, never persisted.

use std::fmt;

/// Counters of the fetch and placement engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Plain files written plus archives processed (one per archive).
    pub downloaded: usize,
    /// Archive entries dropped by a discard rule or matched by no rule.
    pub ignored: usize,
    /// Files written out of archives.
    pub copied: usize,
}

/// Counters of the asset pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub wiped: usize,
    pub combined: usize,
    pub generated: usize,
    pub compile_errors: usize,
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} copied from archives, {} ignored",
            self.downloaded, self.copied, self.ignored
        )
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} paths wiped, {} files combined, {} css files generated, {} errors",
            self.wiped, self.combined, self.generated, self.compile_errors
        )
    }
}
