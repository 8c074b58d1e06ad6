//! `html`: includes, WebP `<picture>` rewrite, minification.

use std::path::Path;

use rayon::prelude::*;

use crate::config::{ClassEntry, SiteConfig};
use crate::pipeline::html;
use crate::utils::format_size;
use crate::utils::path::write_output;

use super::{FileOutcome, TaskReport, output_for};

struct Page {
    outcome: FileOutcome,
    before: u64,
    after: u64,
}

pub fn run(config: &SiteConfig, entry: &ClassEntry) -> TaskReport {
    let root = config.get_root();
    let pages: Vec<Page> = entry
        .expand(root)
        .par_iter()
        .map(|source| render_page(config, entry, source))
        .collect();

    let before: u64 = pages.iter().map(|p| p.before).sum();
    let after: u64 = pages.iter().map(|p| p.after).sum();
    let mut report = TaskReport::from_outcomes("html", pages.into_iter().map(|p| p.outcome));
    if !report.written.is_empty() {
        report.summary = Some(format!("{} → {}", format_size(before), format_size(after)));
    }
    report
}

fn render_page(config: &SiteConfig, entry: &ClassEntry, source: &Path) -> Page {
    let failed = |e: anyhow::Error| Page {
        outcome: FileOutcome::Failed(source.to_path_buf(), e),
        before: 0,
        after: 0,
    };

    let page = match html::render(source, config.build.images.webp) {
        Ok(page) => page,
        Err(e) => return failed(e),
    };
    let before = page.len() as u64;
    let page = if config.mode().minify {
        html::minify_markup(&page)
    } else {
        page
    };

    let output = output_for(entry, source, config.get_root());
    if let Err(e) = write_output(&output, &page) {
        return failed(e);
    }
    Page {
        outcome: FileOutcome::Written(vec![output]),
        before,
        after: page.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixture;
    use std::fs;

    fn site(toml: &str) -> (tempfile::TempDir, SiteConfig) {
        let (dir, config) = fixture::project(toml);
        let root = config.get_root();
        fixture::write(root, "src/_header.html", "<header>@@title</header>");
        fixture::write(
            root,
            "src/index.html",
            "<html><body>\n    @@include('_header.html', {\"title\": \"Home\"})\n    <img src=\"img/a.jpg\">\n</body></html>\n",
        );
        (dir, config)
    }

    #[test]
    fn test_partials_inlined_and_not_emitted() {
        let (_dir, config) = site("");
        let entry = config.registry.get(crate::core::AssetClass::Markup).unwrap();
        let report = run(&config, entry);
        assert!(report.is_ok(), "{:?}", report.failures);

        let root = config.get_root();
        assert_eq!(report.written, vec![root.join("dist/index.html")]);
        assert!(!root.join("dist/_header.html").exists());

        let out = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(out.contains("<header>Home</header>"));
        assert!(!out.contains("@@include"));
        assert!(out.contains("<source srcset=\"img/a.webp\" type=\"image/webp\">"));
    }

    #[test]
    fn test_production_minifies_and_reports_size() {
        let (_dir, dev_config) = site("");
        let entry = dev_config.registry.get(crate::core::AssetClass::Markup).unwrap();
        run(&dev_config, entry);
        let dev = fs::read_to_string(dev_config.get_root().join("dist/index.html")).unwrap();

        let (_dir, config) = site(fixture::production());
        let entry = config.registry.get(crate::core::AssetClass::Markup).unwrap();
        let report = run(&config, entry);
        let prod = fs::read_to_string(config.get_root().join("dist/index.html")).unwrap();

        assert!(prod.len() < dev.len());
        assert!(report.summary.unwrap().contains('→'));
    }

    #[test]
    fn test_missing_include_is_reported() {
        let (_dir, config) = fixture::project("");
        let root = config.get_root();
        fixture::write(root, "src/index.html", "@@include('nope.html')");
        fixture::write(root, "src/about.html", "<p>about</p>");

        let entry = config.registry.get(crate::core::AssetClass::Markup).unwrap();
        let report = run(&config, entry);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.written, vec![root.join("dist/about.html")]);
    }
}
