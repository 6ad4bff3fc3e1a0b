//! Fetch & placement engine.
//!
//! Walks the `download` table in declaration order. Plain entries become one file;
//! archive entries are expanded by [`archive::extract`]. The first failure aborts the
//! run; files already written are left in place.

pub mod archive;

use regex::Regex;
use std::fs;
use std::path::Path;

use crate::config::{DownloadTarget, OrderedMap};
use crate::error::{GrablibError, Result};
use crate::fetch::Fetch;
use crate::path_resolver::PathResolver;
use crate::report::DownloadReport;

/// Pattern applied to the URL of a plain download to find its file name.
pub const URL_FILENAME_PATTERN: &str = r"/(?P<filename>[^/]+)$";

pub struct Downloader<'a, F: Fetch> {
    resolver: PathResolver,
    download: &'a OrderedMap<String, DownloadTarget>,
    fetcher: F,
    url_filename: Regex,
    report: DownloadReport,
}

impl<'a, F: Fetch> Downloader<'a, F> {
    pub fn new(
        download_root: &Path,
        download: &'a OrderedMap<String, DownloadTarget>,
        fetcher: F,
    ) -> Self {
        Self {
            resolver: PathResolver::new(download_root),
            download,
            fetcher,
            url_filename: Regex::new(URL_FILENAME_PATTERN).expect("static pattern"),
            report: DownloadReport::default(),
        }
    }

    /// Counters so far; meaningful after a failed run too.
    pub fn report(&self) -> DownloadReport {
        self.report
    }

    pub fn run(&mut self) -> Result<DownloadReport> {
        tracing::info!(root = %self.resolver.root().display(), "downloading files");
        let download = self.download;
        for (key, target) in download.iter() {
            let url = self.fetcher.expand(key);
            let outcome = match target {
                DownloadTarget::File(template) => self.process_file(&url, template),
                DownloadTarget::Archive(rules) => self.process_archive(&url, rules),
            };
            outcome.map_err(|source| GrablibError::Entry {
                url: url.clone(),
                target: target.describe(),
                source: Box::new(source),
            })?;
        }
        tracing::info!(downloaded = self.report.downloaded, "download finished");
        Ok(self.report)
    }

    fn process_file(&mut self, url: &str, template: &str) -> Result<()> {
        let dest = self.resolver.resolve(url, template, &self.url_filename)?;
        tracing::info!(
            "downloading: {} > {}",
            url,
            dest.strip_prefix(self.resolver.root()).unwrap_or(&dest).display()
        );
        let content = self.fetcher.get(url)?;
        write_file(&dest, &content)?;
        self.report.downloaded += 1;
        Ok(())
    }

    fn process_archive(
        &mut self,
        url: &str,
        rules: &OrderedMap<String, crate::config::EntryTarget>,
    ) -> Result<()> {
        let rules = archive::ArchiveRules::compile(rules)?;
        tracing::info!("downloading zip: {}", url);
        let content = self.fetcher.get(url)?;
        let outcome = archive::extract(url, &content, &rules, &self.resolver)?;
        tracing::info!("{} files copied from zip archive", outcome.copied);
        self.report.copied += outcome.copied;
        self.report.ignored += outcome.ignored;
        self.report.downloaded += 1;
        Ok(())
    }
}

/// Creates parent directories and writes `data`, replacing any existing file.
pub(crate) fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GrablibError::io(parent, e))?;
    }
    fs::write(path, data).map_err(|e| GrablibError::io(path, e))
}

#[cfg(test)]
mod tests;
