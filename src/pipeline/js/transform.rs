//! Transpile and print a bundled script with oxc.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::syntax::es_target::ESTarget;
use oxc::transformer::{EngineTargets, HelperLoaderMode, TransformOptions, Transformer};

/// Helper calls emitted when a lowering needs runtime support.
const HELPER_OBJECT: &str = "babelHelpers.";

#[derive(Debug, Clone)]
pub struct Emitted {
    pub code: String,
    /// Source map JSON, development only.
    pub map: Option<String>,
}

/// How the transpiled program is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Compressed and mangled.
    Minified,
    /// Readable, with a source map over the bundle.
    Mapped,
}

/// Lower `source` to `target` and print it.
///
/// `path` names the bundle in diagnostics and in the source map.
pub fn transpile(source: &str, path: &Path, target: &str, output: Output) -> Result<Emitted> {
    let name = path.display();
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(error) = ret.errors.first() {
        bail!("{name}: {error}");
    }
    let mut program = ret.program;

    let mut options =
        TransformOptions::from_target(target).map_err(|e| anyhow!("{name}: target {target}: {e}"))?;
    options.helper_loader.mode = HelperLoaderMode::External;

    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let transformed = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if let Some(error) = transformed.errors.first() {
        bail!("{name}: {error}");
    }

    let emitted = match output {
        Output::Minified => {
            let es_target =
                ESTarget::from_str(target).map_err(|e| anyhow!("{name}: target {target}: {e}"))?;
            let options = MinifierOptions {
                mangle: Some(MangleOptions::default()),
                compress: Some(CompressOptions {
                    target: EngineTargets::from_target(&es_target.to_string())
                        .map_err(|e| anyhow!("{name}: target {target}: {e}"))?,
                    ..CompressOptions::smallest()
                }),
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
            Emitted { code, map: None }
        }
        Output::Mapped => {
            let file = path
                .file_name()
                .map_or_else(|| PathBuf::from("bundle.js"), PathBuf::from);
            let ret = Codegen::new()
                .with_options(CodegenOptions {
                    source_map_path: Some(file),
                    ..CodegenOptions::default()
                })
                .build(&program);
            Emitted {
                code: ret.code,
                map: ret.map.map(|map| map.to_json_string()),
            }
        }
    };

    if emitted.code.contains(HELPER_OBJECT) {
        bail!(
            "{name}: lowering to {target} needs runtime helpers; raise `build.js.target` in kiln.toml"
        );
    }
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "(function () {\n  const greet = (name) => `hello ${name}`;\n  const value = window.user ?? \"anon\";\n  console.log(greet(value));\n})();\n";

    #[test]
    fn test_minified_is_smaller() {
        let path = Path::new("main.js");
        let min = transpile(SOURCE, path, "es2020", Output::Minified).unwrap();
        let readable = transpile(SOURCE, path, "es2020", Output::Mapped).unwrap();
        assert!(min.code.len() < readable.code.len());
        assert!(min.map.is_none());
        assert!(!min.code.contains("\n  "));
    }

    #[test]
    fn test_mapped_output_has_source_map() {
        let out = transpile(SOURCE, Path::new("main.js"), "es2020", Output::Mapped).unwrap();
        let map = out.map.unwrap();
        assert!(map.contains("\"mappings\""));
        assert!(out.code.contains("greet"));
    }

    #[test]
    fn test_lowers_nullish_coalescing() {
        let out = transpile(SOURCE, Path::new("main.js"), "es2019", Output::Mapped).unwrap();
        assert!(!out.code.contains("??"));
    }

    #[test]
    fn test_syntax_error_names_file() {
        let err = transpile("let = ;", Path::new("broken.js"), "es2020", Output::Mapped).unwrap_err();
        assert!(err.to_string().contains("broken.js"));
    }
}
