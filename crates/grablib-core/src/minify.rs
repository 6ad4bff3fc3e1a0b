//! Script and style minifiers.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both are treated as opaque text
//! transforms; a failure only concerns the file being processed.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Text minifier used by the cat and sass stages.
pub trait Minify {
    fn script(&self, source: &str) -> Result<String, String>;
    fn style(&self, source: &str) -> Result<String, String>;
}

/// Default minifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetMinifier;

impl Minify for AssetMinifier {
    /// Parses as a classic script so top-level names stay global and survive
    /// compression; names are not mangled since concatenated files share one scope.
    fn script(&self, source: &str) -> Result<String, String> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::script()).parse();
        if let Some(err) = ret.errors.first() {
            return Err(err.to_string());
        }
        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: None,
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code)
    }

    fn style(&self, source: &str) -> Result<String, String> {
        let stylesheet =
            StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;
        Ok(result.code)
    }
}

/// Names like `app.js` get minified; `app.min.js` and anything else pass through.
pub fn wants_script_minify(file_name: &str) -> bool {
    file_name.ends_with(".js") && !file_name.ends_with(".min.js")
}
