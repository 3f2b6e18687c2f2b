use crate::analysis::Analyzer;
use crate::config::{self, SnippetscopeConfig};
use crate::core::Dialect;
use crate::curriculum::{classify, prioritize, Curriculum, LearnerLevel};
use crate::output::{self, FileReport, LayerCounts, LearnerView, OutputFormat};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

/// Worker stack size (8MB for deeply nested snippets in unoptimized builds)
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

pub struct AnalyzeConfig {
    pub paths: Vec<PathBuf>,
    pub dialect: Option<Dialect>,
    pub format: OutputFormat,
    pub curriculum: Option<PathBuf>,
    pub level: Option<LearnerLevel>,
    pub config: Option<PathBuf>,
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Expand directories into the source files under them, sorted per directory.
/// Explicit file arguments are kept whatever their extension.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }
    Ok(files)
}

fn load_settings(config: &AnalyzeConfig) -> Result<SnippetscopeConfig> {
    match &config.config {
        Some(path) => config::load_config_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(config::load_config()),
    }
}

fn load_curriculum(config: &AnalyzeConfig) -> Result<Option<Curriculum>> {
    match (&config.curriculum, config.level) {
        (Some(path), _) => Curriculum::from_path(path)
            .map(Some)
            .with_context(|| format!("Failed to load curriculum {}", path.display())),
        (None, Some(_)) => Curriculum::builtin()
            .map(Some)
            .context("Failed to load the built-in curriculum"),
        (None, None) => Ok(None),
    }
}

fn analyze_file(
    analyzer: &Analyzer,
    path: &Path,
    dialect: Option<Dialect>,
    curriculum: Option<&Curriculum>,
    level: LearnerLevel,
) -> Result<FileReport> {
    let code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let hint = dialect.or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Dialect::from_extension)
    });
    let result = analyzer.analyze(&code, hint);

    let learner = curriculum.map(|curriculum| {
        let layers = classify(&result, curriculum);
        LearnerView {
            level,
            layer_counts: LayerCounts::from_analysis(&layers),
            surfaced: prioritize(&layers, level),
        }
    });

    Ok(FileReport {
        path: path.to_path_buf(),
        result,
        learner,
    })
}

/// Analyze every file and render the reports in the requested format.
pub fn run(config: AnalyzeConfig) -> Result<String> {
    let settings = load_settings(&config)?;
    let curriculum = load_curriculum(&config)?;
    let level = config.level.unwrap_or_default();
    let files = collect_sources(&config.paths)?;
    log::debug!("Analyzing {} file(s)", files.len());

    let analyzer = Analyzer::new(settings);
    let pool = rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_SIZE)
        .build()
        .context("Failed to build the analysis thread pool")?;
    let reports = pool.install(|| {
        files
            .par_iter()
            .map(|path| analyze_file(&analyzer, path, config.dialect, curriculum.as_ref(), level))
            .collect::<Result<Vec<_>>>()
    })?;

    let rendered = match config.format {
        OutputFormat::Json => output::json::render(&reports)?,
        OutputFormat::Terminal => output::terminal::render(&reports),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn analyze_config(paths: Vec<PathBuf>) -> AnalyzeConfig {
        AnalyzeConfig {
            paths,
            dialect: None,
            format: OutputFormat::Json,
            curriculum: None,
            level: None,
            config: None,
        }
    }

    #[test]
    fn test_collect_sources_filters_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.ts"), "let b = 1;").unwrap();
        fs::write(dir.path().join("a.js"), "var a;").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.jsx"), "<div />").unwrap();

        let files = collect_sources(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.js", "b.ts", "c.jsx"]);
    }

    #[test]
    fn test_missing_path_is_error() {
        assert!(collect_sources(&[PathBuf::from("/definitely/not/here.js")]).is_err());
    }

    #[test]
    fn test_run_with_level_uses_builtin_curriculum() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("snippet.js");
        fs::write(&file, "var x = 1;\nif (x == '1') { console.log(x); }\n").unwrap();

        let mut config = analyze_config(vec![file]);
        config.level = Some(LearnerLevel::Advanced);
        config.config = None;
        let json = run(config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let surfaced = value["learner"]["surfaced"].as_array().unwrap();
        assert!(!surfaced.is_empty());
        assert!(surfaced.iter().all(|item| item["layer"] == "fundamentals"));
    }

    #[test]
    fn test_deeply_nested_file_is_reported_partial() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("deep.js");
        let depth = 2000;
        fs::write(&file, format!("const a = {}1{};", "[".repeat(depth), "]".repeat(depth))).unwrap();

        let json = run(analyze_config(vec![file])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tree"]["partial"], true);
    }

    #[test]
    fn test_extension_selects_dialect() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("typed.ts");
        fs::write(&file, "let n = 1;").unwrap();
        let json = run(analyze_config(vec![file])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tree"]["dialect"], "typescript");
    }
}
