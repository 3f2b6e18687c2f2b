use super::{SnippetscopeConfig, MAX_WALK_DEPTH, MIN_WALK_DEPTH};
use crate::detectors::find_detector;
use crate::errors::{Error, Result};
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".snippetscope.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML string and normalize out-of-range values.
pub fn parse_and_validate_config(contents: &str) -> Result<SnippetscopeConfig> {
    let mut config = toml::from_str::<SnippetscopeConfig>(contents)?;

    let depth = config.analysis.max_walk_depth;
    let clamped = depth.clamp(MIN_WALK_DEPTH, MAX_WALK_DEPTH);
    if clamped != depth {
        log::warn!(
            "analysis.max_walk_depth = {} is out of range, using {}",
            depth,
            clamped
        );
        config.analysis.max_walk_depth = clamped;
    }

    for id in &config.analysis.disabled_detectors {
        if find_detector(id).is_none() {
            log::warn!("Unknown detector id in analysis.disabled_detectors: {}", id);
        }
    }

    Ok(config)
}

/// Load an explicitly named config file. Errors are returned, not defaulted.
pub fn load_config_from_path(path: &Path) -> Result<SnippetscopeConfig> {
    let contents = read_config_file(path)
        .map_err(|e| Error::file_system("Failed to read config file", path, e))?;
    parse_and_validate_config(&contents)
        .map_err(|e| e.with_context(format!("Failed to parse {}", path.display())))
}

fn try_load_config_from_path(config_path: &Path) -> Option<SnippetscopeConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            // Only log actual errors, not "file not found"
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}: {}. Using defaults.", config_path.display(), e);
            None
        }
    }
}

/// `start` and its parents, at most `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        parent.pop().then_some(parent)
    })
    .take(max_depth)
}

/// Search `start` and up to nine ancestors for `.snippetscope.toml`.
pub fn load_config_from(start: PathBuf) -> SnippetscopeConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SnippetscopeConfig::default()
        })
}

pub fn load_config() -> SnippetscopeConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            SnippetscopeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_and_validate_config("").unwrap();
        assert_eq!(config, SnippetscopeConfig::default());
        assert_eq!(config.analysis.max_walk_depth, 64);
        assert_eq!(config.analysis.top_issues, 5);
        assert!(!config.rule_engine.enabled);
        assert_eq!(config.rule_engine.command, "eslint");
    }

    #[test]
    fn test_depth_is_clamped() {
        let low = parse_and_validate_config("[analysis]\nmax_walk_depth = 2\n").unwrap();
        assert_eq!(low.analysis.max_walk_depth, MIN_WALK_DEPTH);
        let high = parse_and_validate_config("[analysis]\nmax_walk_depth = 9000\n").unwrap();
        assert_eq!(high.analysis.max_walk_depth, MAX_WALK_DEPTH);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            parse_and_validate_config("[analysis\n"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_disabled_detectors() {
        let config = parse_and_validate_config(indoc! {r#"
            [analysis]
            disabled_detectors = ["var-hoisting", "no-such-detector"]
        "#})
        .unwrap();
        assert!(config.analysis.is_disabled("var-hoisting"));
        assert!(!config.analysis.is_disabled("loose-equality"));
    }

    #[test]
    fn test_directory_ancestors_stops_at_limit() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }

    #[test]
    fn test_load_from_ancestor_directory() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[analysis]\ntop_issues = 3\n[rule_engine]\nenabled = true\n",
        )
        .unwrap();
        let nested = root.path().join("src").join("components");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config_from(nested);
        assert_eq!(config.analysis.top_issues, 3);
        assert!(config.rule_engine.enabled);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let root = TempDir::new().unwrap();
        let result = load_config_from_path(&root.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }

    #[test]
    fn test_explicit_invalid_file_names_path() {
        let root = TempDir::new().unwrap();
        let path = root.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[analysis\n").unwrap();

        let err = load_config_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
