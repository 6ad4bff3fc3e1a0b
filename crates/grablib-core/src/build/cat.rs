//! Concatenation stage.
//!
//! Each destination is built from its sources in declaration order. Every source is
//! read, run through its replacements, minified when it is an unminified script and
//! minification is on, and appended after a banner naming it.

use regex::Regex;
use std::fs;
use std::path::Path;

use super::SourcePaths;
use crate::config::{CatSource, OrderedMap};
use crate::download::write_file;
use crate::error::{GrablibError, Result};
use crate::minify::{wants_script_minify, Minify};
use crate::path_resolver::within_root;
use crate::report::BuildReport;

/// Concatenates every destination of `cat`. `minifier` is `None` in debug builds.
pub fn concatenate(
    cat: &OrderedMap<String, Vec<CatSource>>,
    sources: &SourcePaths,
    build_root: &Path,
    minifier: Option<&dyn Minify>,
    report: &mut BuildReport,
) -> Result<()> {
    let start = std::time::Instant::now();
    let mut total = 0;

    for (dest, srcs) in cat.iter() {
        let mut content = String::new();
        for src in srcs {
            let path = sources.resolve(&src.src)?;
            let text = read_source(&path, src, minifier)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            content.push_str(&banner(&name, &text));
            tracing::debug!("  appending {}", name);
        }

        if srcs.is_empty() {
            tracing::warn!("no files found to form \"{}\"", dest);
            continue;
        }
        let dest_path = within_root(build_root, dest)?;
        write_file(&dest_path, content.as_bytes())?;
        total += srcs.len();
        report.combined += srcs.len();
        tracing::info!("{} files combined to form \"{}\"", srcs.len(), dest);
    }

    tracing::info!(
        "{} files concatenated in {:.0}ms",
        total,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// `/* === name === */` followed by the content without surrounding blank lines.
pub fn banner(name: &str, content: &str) -> String {
    format!("/* === {} === */\n{}\n", name, content.trim_matches('\n'))
}

fn read_source(path: &Path, src: &CatSource, minifier: Option<&dyn Minify>) -> Result<String> {
    let mut text = fs::read_to_string(path).map_err(|e| GrablibError::io(path, e))?;

    for (pattern, replacement) in src.replace.iter() {
        let re = Regex::new(pattern).map_err(|source| GrablibError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        let template = replacement_template(replacement);
        text = re.replace_all(&text, template.as_str()).into_owned();
    }

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match minifier {
        Some(m) if wants_script_minify(name) => m.script(&text).map_err(|message| {
            GrablibError::Minify {
                path: path.to_path_buf(),
                message,
            }
        }),
        _ => Ok(text),
    }
}

/// Translates a replacement written with `\1` and `\g<name>` group references into
/// `regex` expansion syntax. Every other `$` is literal.
pub fn replacement_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while group.len() < 2 {
                        match chars.peek() {
                            Some(d) if d.is_ascii_digit() => {
                                group.push(*d);
                                chars.next();
                            }
                            _ => break,
                        }
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                Some('g') => {
                    let rest: String = chars.clone().skip(1).collect();
                    let name = rest
                        .strip_prefix('<')
                        .and_then(|r| r.split_once('>'))
                        .map(|(name, _)| name.to_string());
                    match name {
                        Some(name) if !name.is_empty() => {
                            // 'g', '<', name, '>'
                            for _ in 0..name.chars().count() + 3 {
                                chars.next();
                            }
                            out.push_str(&format!("${{{}}}", name));
                        }
                        _ => out.push('\\'),
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('r') => {
                    chars.next();
                    out.push('\r');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}
