//! `css` / `scss`: one bundle written as `style.css` and `style.min.css`.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::config::{ClassEntry, SiteConfig};
use crate::core::AssetClass;
use crate::pipeline::css::{self, CssOptions, CssOutput};
use crate::pipeline::scss;
use crate::utils::path::write_output;

use super::TaskReport;

const READABLE: &str = "style.css";
const MINIFIED: &str = "style.min.css";

pub fn run(config: &SiteConfig, entry: &ClassEntry) -> TaskReport {
    let task = entry.class.name();
    let mut report = TaskReport::new(task);
    let sources = entry.expand(config.get_root());
    let Some(first) = sources.first() else {
        return report;
    };

    match build(config, entry, &sources) {
        Ok(written) => report.written = written,
        Err(e) => report.fail(first.clone(), format!("{e:#}")),
    }
    report
}

fn build(config: &SiteConfig, entry: &ClassEntry, sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mode = config.mode();
    let source = match entry.class {
        AssetClass::Scss => sources
            .iter()
            .map(|path| scss::compile(path))
            .collect::<Result<Vec<_>>>()?
            .join("\n"),
        AssetClass::Styles => css::bundle(sources)?,
        other => bail!("{other} is not a stylesheet class"),
    };

    // plain css: production only; sass: always
    let rewrite = config.build.css.webp
        && config.build.images.webp
        && (entry.class == AssetClass::Scss || mode.is_production());
    let options = CssOptions {
        browsers: css::browsers(&config.build.css.targets),
        webp: rewrite,
        source_maps: mode.source_maps,
    };

    let name = sources
        .first()
        .and_then(|p| p.file_name())
        .map_or_else(|| READABLE.to_string(), |n| n.to_string_lossy().into_owned());
    let pair = css::process(&source, &name, &options)?;

    let mut written = Vec::with_capacity(4);
    write_sheet(&entry.dest, READABLE, pair.readable, &mut written)?;
    write_sheet(&entry.dest, MINIFIED, pair.minified, &mut written)?;
    Ok(written)
}

fn write_sheet(dest: &Path, file: &str, sheet: CssOutput, written: &mut Vec<PathBuf>) -> Result<()> {
    let path = dest.join(file);
    match sheet.map {
        Some(map) => {
            let map_name = format!("{file}.map");
            let map_path = dest.join(&map_name);
            write_output(&path, css::with_map_comment(&sheet.code, &map_name))?;
            write_output(&map_path, map)?;
            written.push(path);
            written.push(map_path);
        }
        None => {
            write_output(&path, &sheet.code)?;
            written.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixture;
    use std::fs;

    fn run_class(config: &SiteConfig, class: AssetClass) -> TaskReport {
        run(config, config.registry.get(class).unwrap())
    }

    fn css_site(toml: &str) -> (tempfile::TempDir, SiteConfig) {
        let (dir, config) = fixture::project(toml);
        let root = config.get_root();
        fixture::write(root, "src/css/_base.css", ".box { user-select: none; }\n");
        fixture::write(
            root,
            "src/css/style.css",
            "@import \"_base.css\";\n.hero { background: url(../img/hero.jpg); }\n",
        );
        (dir, config)
    }

    #[test]
    fn test_development_outputs_with_maps() {
        let (_dir, config) = css_site("[build.css.targets]\nsafari = \"8\"\n");
        let report = run_class(&config, AssetClass::Styles);
        assert!(report.is_ok(), "{:?}", report.failures);

        let dest = config.get_root().join("dist/css");
        let mut written = report.written.clone();
        written.sort();
        assert_eq!(
            written,
            vec![
                dest.join("style.css"),
                dest.join("style.css.map"),
                dest.join("style.min.css"),
                dest.join("style.min.css.map"),
            ]
        );

        let css = fs::read_to_string(dest.join("style.css")).unwrap();
        assert!(!css.contains("@import"));
        assert!(css.contains("-webkit-user-select"));
        assert!(css.ends_with("/*# sourceMappingURL=style.css.map */\n"));
        // development skips the webp variant for plain css
        assert!(!css.contains(".webp"));
    }

    #[test]
    fn test_production_minified_and_without_maps() {
        let (_dir, config) = css_site(fixture::production());
        let report = run_class(&config, AssetClass::Styles);
        assert!(report.is_ok(), "{:?}", report.failures);
        assert_eq!(report.written.len(), 2);

        let dest = config.get_root().join("dist/css");
        let readable = fs::read_to_string(dest.join("style.css")).unwrap();
        let minified = fs::read_to_string(dest.join("style.min.css")).unwrap();
        assert!(minified.len() <= readable.len());
        assert!(!dest.join("style.css.map").exists());
        assert!(readable.contains(".webp .hero"));
    }

    #[test]
    fn test_scss_variant() {
        let (_dir, config) = fixture::project("[build]\nstylesheet = \"scss\"\n");
        let root = config.get_root();
        fixture::write(root, "src/scss/_vars.scss", "$c: #123456;\n");
        fixture::write(
            root,
            "src/scss/main.scss",
            "@import 'vars';\n.nav { a { color: $c; background: url(a.png); } }\n",
        );

        let report = run_class(&config, AssetClass::Scss);
        assert!(report.is_ok(), "{:?}", report.failures);
        let css = fs::read_to_string(root.join("dist/css/style.css")).unwrap();
        assert!(css.contains(".nav a"));
        assert!(css.contains(".webp .nav a"));
        assert!(root.join("dist/css/style.min.css").exists());
    }

    #[test]
    fn test_syntax_error_is_one_failure() {
        let (_dir, config) = fixture::project("");
        fixture::write(config.get_root(), "src/css/style.css", "@import 'missing.css';\n");
        let report = run_class(&config, AssetClass::Styles);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("missing.css"));
        assert!(report.written.is_empty());
    }
}
