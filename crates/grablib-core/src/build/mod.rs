//! Asset pipeline: wipe, then cat, then sass, each only when configured.

pub mod cat;
pub mod sass;
pub mod wipe;

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::config::{BuildSpec, GrablibConfig};
use crate::error::{GrablibError, Result};
use crate::minify::{AssetMinifier, Minify};
use crate::report::BuildReport;
use sass::{GrassCompiler, SassGenerator, StyleCompiler};

/// Source prefixes meaning "relative to the download root".
pub const DOWNLOAD_PREFIX_PATTERN: &str = r"^(?:DOWNLOAD|DL)/";

/// Resolves source paths named in the build section.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    download_root: Option<PathBuf>,
    base: PathBuf,
    prefix: Regex,
}

impl SourcePaths {
    /// `base` anchors plain relative sources, normally the config file's directory.
    pub fn new(download_root: Option<PathBuf>, base: PathBuf) -> Self {
        Self {
            download_root,
            base,
            prefix: Regex::new(DOWNLOAD_PREFIX_PATTERN).expect("static pattern"),
        }
    }

    pub fn resolve(&self, src: &str) -> Result<PathBuf> {
        match self.prefix.find(src) {
            Some(m) => {
                let root = self
                    .download_root
                    .as_ref()
                    .ok_or_else(|| GrablibError::NoDownloadRoot {
                        src: src.to_string(),
                    })?;
                Ok(root.join(&src[m.end()..]))
            }
            None => Ok(self.base.join(src)),
        }
    }
}

/// Runs the configured build stages in order.
pub struct Builder<'a> {
    build_root: PathBuf,
    spec: &'a BuildSpec,
    sources: SourcePaths,
    debug: bool,
    minifier: Box<dyn Minify + 'a>,
    compiler: Box<dyn StyleCompiler + 'a>,
    report: BuildReport,
}

impl<'a> Builder<'a> {
    pub fn new(
        build_root: &Path,
        download_root: Option<&Path>,
        spec: &'a BuildSpec,
        debug: bool,
    ) -> Result<Self> {
        let base = std::env::current_dir().map_err(|e| GrablibError::io(".", e))?;
        Ok(Self {
            build_root: build_root.to_path_buf(),
            spec,
            sources: SourcePaths::new(download_root.map(Path::to_path_buf), base),
            debug,
            minifier: Box::new(AssetMinifier),
            compiler: Box::new(GrassCompiler),
            report: BuildReport::default(),
        })
    }

    /// Builder for the `build` section of a loaded config, or `None` when there is
    /// none. Plain sources are anchored to the config's directory, like the roots.
    pub fn for_config(cfg: &'a GrablibConfig, debug: bool) -> Result<Option<Self>> {
        let Some(spec) = cfg.build.as_ref() else {
            return Ok(None);
        };
        let root = cfg.build_root.as_deref().ok_or_else(|| GrablibError::Config {
            path: cfg.base_dir.clone().unwrap_or_default(),
            message: "`build` is set but `build_root` is missing".to_string(),
        })?;
        let mut builder = Self::new(root, cfg.download_root.as_deref(), spec, debug)?;
        if let Some(base) = &cfg.base_dir {
            builder = builder.with_source_base(base);
        }
        Ok(Some(builder))
    }

    /// Anchor for sources without a download prefix.
    pub fn with_source_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.sources.base = base.into();
        self
    }

    pub fn with_minifier(mut self, minifier: impl Minify + 'a) -> Self {
        self.minifier = Box::new(minifier);
        self
    }

    pub fn with_compiler(mut self, compiler: impl StyleCompiler + 'a) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Counters so far; meaningful after a failed run too.
    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn run(&mut self) -> Result<BuildReport> {
        let spec = self.spec;
        if let Some(globs) = &spec.wipe {
            wipe::wipe(&self.build_root, globs.as_slice(), &mut self.report)?;
        }

        if let Some(cat) = &spec.cat {
            let minifier = (!self.debug).then_some(self.minifier.as_ref());
            cat::concatenate(cat, &self.sources, &self.build_root, minifier, &mut self.report)?;
        }

        if let Some(sass) = &spec.sass {
            for (dest, src) in sass.iter() {
                let in_dir = self.sources.resolve(src)?;
                let out_dir = crate::path_resolver::within_root(&self.build_root, dest)?;
                let outcome = SassGenerator::new(
                    &in_dir,
                    &out_dir,
                    self.debug,
                    self.compiler.as_ref(),
                    self.minifier.as_ref(),
                )
                .run()?;
                self.report.generated += outcome.generated;
                self.report.compile_errors += outcome.errors.len();
                if !outcome.errors.is_empty() {
                    return Err(GrablibError::StyleFailed {
                        errors: outcome.errors.len(),
                        generated: outcome.generated,
                    });
                }
            }
        }

        Ok(self.report)
    }
}
