//! Style compiler backed by grass.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Output style of a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// Human readable, used for debug builds.
    Expanded,
    Compressed,
}

/// Compiled CSS and, when a map path was requested, its source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStyle {
    pub css: String,
    pub source_map: Option<String>,
}

/// Compiles one style file. Imports are resolved relative to `path`.
pub trait StyleCompiler {
    fn compile(
        &self,
        path: &Path,
        style: OutputStyle,
        map_path: Option<&Path>,
    ) -> Result<CompiledStyle, String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrassCompiler;

impl StyleCompiler for GrassCompiler {
    fn compile(
        &self,
        path: &Path,
        style: OutputStyle,
        map_path: Option<&Path>,
    ) -> Result<CompiledStyle, String> {
        let grass_style = match style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        };
        let options = grass::Options::default().style(grass_style);
        let mut css = grass::from_path(path, &options).map_err(|e| e.to_string())?;

        let source_map = match map_path {
            Some(map_path) => {
                if !css.ends_with('\n') {
                    css.push('\n');
                }
                css.push_str(&format!("/*# sourceMappingURL={} */\n", map_path.display()));
                Some(source_map(path, map_path)?)
            }
            None => None,
        };
        Ok(CompiledStyle { css, source_map })
    }
}

/// Source map v3 document.
///
/// grass has no source map support, so this only records which file produced the
/// output; `mappings` is empty.
#[derive(Debug, Serialize)]
struct SourceMap {
    version: u8,
    file: String,
    sources: Vec<String>,
    names: Vec<String>,
    mappings: String,
}

fn source_map(source: &Path, map_path: &Path) -> Result<String, String> {
    let css_name = map_path
        .with_extension("css")
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let map_dir = map_path.parent().unwrap_or_else(|| Path::new(""));
    let map = SourceMap {
        version: 3,
        file: css_name,
        sources: vec![relative_path(map_dir, source)],
        names: Vec::new(),
        mappings: String::new(),
    };
    serde_json::to_string_pretty(&map).map_err(|e| e.to_string())
}

/// `to` expressed relative to the directory `from`, with `/` separators.
pub(crate) fn relative_path(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for part in &to_parts[common..] {
        rel.push(part.as_os_str());
    }
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn relative_paths() {
        assert_eq!(
            relative_path(Path::new("/b/css"), Path::new("/b/css/.src/a.scss")),
            ".src/a.scss"
        );
        assert_eq!(
            relative_path(Path::new("/b/css/sub"), Path::new("/b/css/.src/sub/a.scss")),
            "../.src/sub/a.scss"
        );
    }

    #[test]
    fn expanded_compile_with_map() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("style.scss");
        fs::write(&src, "$c: red;\n.a { .b { color: $c; } }\n").unwrap();
        let map_path = dir.path().join("out/style.map");

        let out = GrassCompiler
            .compile(&src, OutputStyle::Expanded, Some(&map_path))
            .unwrap();
        assert!(out.css.contains(".a .b {\n  color: red;\n}"));
        assert!(out.css.contains("sourceMappingURL="));

        let map: serde_json::Value = serde_json::from_str(&out.source_map.unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "style.css");
        assert_eq!(map["sources"][0], "../style.scss");
    }

    #[test]
    fn compressed_compile_has_no_map() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("style.scss");
        fs::write(&src, ".a {\n  color: red;\n}\n").unwrap();
        let out = GrassCompiler
            .compile(&src, OutputStyle::Compressed, None)
            .unwrap();
        assert_eq!(out.css.trim_end(), ".a{color:red}");
        assert!(out.source_map.is_none());
    }

    #[test]
    fn compile_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bad.scss");
        fs::write(&src, ".a { color: $missing; }\n").unwrap();
        let err = GrassCompiler
            .compile(&src, OutputStyle::Expanded, None)
            .unwrap_err();
        assert!(err.contains("Undefined variable"));
    }
}
