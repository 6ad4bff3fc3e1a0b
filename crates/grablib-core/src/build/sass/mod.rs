//! Style compilation stage.
//!
//! Walks an input tree and compiles every non-partial `.scss`, `.sass` and `.css`
//! file into the same relative location under the output directory.
//!
//! - Debug: the input tree is first copied to `<out>/.src` and compiled from there,
//!   in expanded style, with a `.map` next to every `.css`.
//! - Production: compiled straight from the input tree, compressed, then minified.
//!
//! A failing file is recorded and the walk goes on; the caller decides what a
//! non-empty error list means.

mod compiler;

pub use compiler::{CompiledStyle, GrassCompiler, OutputStyle, StyleCompiler};

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::download::write_file;
use crate::error::{GrablibError, Result};
use crate::minify::Minify;

/// Name of the staging copy of the input tree in debug builds.
pub const STAGING_DIR: &str = ".src";

const STYLE_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

/// One file that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDiagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// Result of compiling one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SassReport {
    pub generated: usize,
    pub errors: Vec<StyleDiagnostic>,
}

pub struct SassGenerator<'a> {
    in_dir: PathBuf,
    out_dir: PathBuf,
    debug: bool,
    compiler: &'a dyn StyleCompiler,
    minifier: &'a dyn Minify,
}

impl<'a> SassGenerator<'a> {
    pub fn new(
        in_dir: &Path,
        out_dir: &Path,
        debug: bool,
        compiler: &'a dyn StyleCompiler,
        minifier: &'a dyn Minify,
    ) -> Self {
        Self {
            in_dir: in_dir.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            debug,
            compiler,
            minifier,
        }
    }

    /// Directory compiled from: the staging copy in debug builds, else the input.
    pub fn src_dir(&self) -> PathBuf {
        if self.debug {
            self.out_dir.join(STAGING_DIR)
        } else {
            self.in_dir.clone()
        }
    }

    pub fn run(&self) -> Result<SassReport> {
        let start = std::time::Instant::now();
        if !self.in_dir.is_dir() {
            return Err(GrablibError::io(
                &self.in_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "style input is not a directory"),
            ));
        }

        let src_dir = self.src_dir();
        if self.debug {
            self.seed_staging(&src_dir)?;
        }

        let mut report = SassReport::default();
        let map_comment = Regex::new(r"/\*# sourceMappingURL=.*? \*/").expect("static pattern");
        let walker = WalkDir::new(&src_dir).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(src_dir.as_path()).to_path_buf();
                GrablibError::io(path, e.into())
            })?;
            if entry.file_type().is_file() {
                self.process_file(entry.path(), &src_dir, &map_comment, &mut report)?;
            }
        }

        let ms = start.elapsed().as_secs_f64() * 1000.0;
        if report.errors.is_empty() {
            tracing::info!("{} css files generated in {:.0}ms, 0 errors", report.generated, ms);
        } else {
            tracing::error!(
                "{} css files generated in {:.0}ms, {} errors",
                report.generated,
                ms,
                report.errors.len()
            );
        }
        Ok(report)
    }

    /// Replaces `<out>/.src` with a fresh copy of the input tree.
    fn seed_staging(&self, staging: &Path) -> Result<()> {
        if staging.exists() {
            fs::remove_dir_all(staging).map_err(|e| GrablibError::io(staging, e))?;
        }
        fs::create_dir_all(staging).map_err(|e| GrablibError::io(staging, e))?;
        for entry in WalkDir::new(&self.in_dir) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.in_dir.as_path()).to_path_buf();
                GrablibError::io(path, e.into())
            })?;
            let rel = match entry.path().strip_prefix(&self.in_dir) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel,
                _ => continue,
            };
            let target = staging.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| GrablibError::io(&target, e))?;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| GrablibError::io(&target, e))?;
            }
        }
        Ok(())
    }

    fn process_file(
        &self,
        file: &Path,
        src_dir: &Path,
        map_comment: &Regex,
        report: &mut SassReport,
    ) -> Result<()> {
        let is_style = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| STYLE_EXTENSIONS.contains(&e));
        if !is_style {
            return Ok(());
        }
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.starts_with('_') {
            // partial, only reachable through imports
            return Ok(());
        }

        let rel = file.strip_prefix(src_dir).unwrap_or(file);
        let css_path = self.out_dir.join(rel).with_extension("css");
        let map_path = self.debug.then(|| css_path.with_extension("map"));
        tracing::info!(
            "{} ▶ {}",
            rel.display(),
            css_path.strip_prefix(&self.out_dir).unwrap_or(&css_path).display()
        );

        let style = if self.debug {
            OutputStyle::Expanded
        } else {
            OutputStyle::Compressed
        };
        let compiled = self
            .compiler
            .compile(file, style, map_path.as_deref())
            .and_then(|out| {
                if self.debug {
                    Ok(out)
                } else {
                    let css = self.minifier.style(&out.css)?;
                    Ok(CompiledStyle { css, ..out })
                }
            });
        let compiled = match compiled {
            Ok(c) => c,
            Err(message) => {
                tracing::error!("\"{}\", compile error: {}", file.display(), message);
                report.errors.push(StyleDiagnostic {
                    path: file.to_path_buf(),
                    message,
                });
                return Ok(());
            }
        };

        let mut css = compiled.css;
        if let (Some(map_path), Some(map)) = (&map_path, &compiled.source_map) {
            let map_name = map_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let comment = format!("/*# sourceMappingURL={} */", map_name);
            css = map_comment
                .replace_all(&css, regex::NoExpand(&comment))
                .into_owned();
            write_file(map_path, map.as_bytes())?;
        }
        write_file(&css_path, css.as_bytes())?;
        report.generated += 1;
        Ok(())
    }
}
