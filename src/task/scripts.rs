//! `js`: one bundle per entry.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::config::{ClassEntry, SiteConfig};
use crate::pipeline::js::build_script;
use crate::utils::path::write_output;

use super::{FileOutcome, TaskReport, output_for};

pub fn run(config: &SiteConfig, entry: &ClassEntry) -> TaskReport {
    let root = config.get_root();
    let outcomes: Vec<FileOutcome> = entry
        .expand(root)
        .par_iter()
        .map(|source| match build_entry(config, entry, source) {
            Ok(written) => FileOutcome::Written(written),
            Err(e) => FileOutcome::Failed(source.clone(), e),
        })
        .collect();
    TaskReport::from_outcomes("js", outcomes)
}

fn build_entry(config: &SiteConfig, entry: &ClassEntry, source: &Path) -> Result<Vec<PathBuf>> {
    let output = output_for(entry, source, config.get_root());
    let out_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let script = build_script(source, &out_name, &config.build.js.target, config.mode())?;
    write_output(&output, &script.code)?;

    let mut written = vec![output.clone()];
    if let Some(map) = script.map {
        let map_path = output.with_file_name(format!("{out_name}.map"));
        write_output(&map_path, map)?;
        written.push(map_path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssetClass;
    use crate::task::fixture;
    use std::fs;

    fn js_site(toml: &str) -> (tempfile::TempDir, SiteConfig) {
        let (dir, config) = fixture::project(toml);
        let root = config.get_root();
        fixture::write(root, "src/js/modules/math.js", "export function square(n) { return n * n; }\n");
        fixture::write(
            root,
            "src/js/main.js",
            "import { square } from './modules/math.js';\nconsole.log(square(4));\n",
        );
        (dir, config)
    }

    #[test]
    fn test_entries_bundled_modules_not_emitted() {
        let (_dir, config) = js_site("");
        let report = run(&config, config.registry.get(AssetClass::Scripts).unwrap());
        assert!(report.is_ok(), "{:?}", report.failures);

        let dest = config.get_root().join("dist/js");
        assert!(dest.join("main.js").exists());
        assert!(dest.join("main.js.map").exists());
        assert!(!dest.join("modules").exists());

        let code = fs::read_to_string(dest.join("main.js")).unwrap();
        assert!(code.contains("square"));
        assert!(!code.contains("import {"));
    }

    #[test]
    fn test_production_has_no_maps() {
        let (_dir, config) = js_site(fixture::production());
        let report = run(&config, config.registry.get(AssetClass::Scripts).unwrap());
        assert!(report.is_ok(), "{:?}", report.failures);
        assert_eq!(report.written.len(), 1);
        assert!(!config.get_root().join("dist/js/main.js.map").exists());
    }

    #[test]
    fn test_bare_import_fails_only_that_entry() {
        let (_dir, config) = js_site("");
        fixture::write(config.get_root(), "src/js/vendor.js", "import x from 'lodash';\n");
        let report = run(&config, config.registry.get(AssetClass::Scripts).unwrap());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("lodash"));
        assert!(config.get_root().join("dist/js/main.js").exists());
    }
}
