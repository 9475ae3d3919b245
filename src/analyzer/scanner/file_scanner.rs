use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::types::{FlowError, Result};

/// Default maximum file size for analysis (1MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

pub struct FileScanner {
    root: PathBuf,
    skip_dirs: Vec<String>,
    extensions: Vec<String>,
    exclude: Vec<String>,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            skip_dirs: vec![],
            extensions: vec![],
            exclude: vec![],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Scanner for Python sources honoring the analysis settings
    pub fn python<P: AsRef<Path>>(root: P, analysis: &AnalysisConfig) -> Self {
        Self::new(root)
            .with_skip_dirs(analysis.skip_directories.clone())
            .with_extensions(vec!["py".to_string()])
            .with_max_file_size(analysis.max_file_size)
    }

    /// Directory names pruned at any depth
    pub fn with_skip_dirs(mut self, dirs: Vec<String>) -> Self {
        self.skip_dirs = dirs;
        self
    }

    /// Accepted file extensions (empty accepts everything)
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Glob patterns matched against root-relative paths
    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// All matching files, sorted by relative path
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.root.is_dir() {
            return Err(FlowError::invalid_path(&self.root, "not a readable directory"));
        }

        let skip_dirs = self.skip_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && skip_dirs
                        .iter()
                        .any(|skip| entry.file_name().to_string_lossy() == skip.as_str()))
            })
            .build();

        let mut files = Vec::new();

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();

            if !path.is_file() || !self.check_extension(path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let relative_path = relative.to_string_lossy().replace('\\', "/");

            if self.should_exclude(&relative_path) {
                continue;
            }

            if let Ok(metadata) = path.metadata() {
                if metadata.len() > self.max_file_size {
                    continue;
                }

                files.push(ScannedFile {
                    path: path.to_path_buf(),
                    relative_path,
                    size: metadata.len(),
                });
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    fn should_exclude(&self, relative_path: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(relative_path))
                .unwrap_or(false)
        })
    }

    fn check_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Root-relative path with `/` separators
    pub relative_path: String,
    pub size: u64,
}

impl ScannedFile {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Whether the file name matches a glob such as `main.py` or `test_*.py`
    pub fn name_matches(&self, pattern: &str) -> bool {
        glob::Pattern::new(pattern)
            .map(|p| p.matches(self.file_name()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_python_scan_skips_configured_dirs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app.py", "print('hi')");
        touch(temp.path(), "pkg/models.py", "class A: pass");
        touch(temp.path(), "venv/lib/site.py", "x = 1");
        touch(temp.path(), "pkg/__pycache__/models.py", "");
        touch(temp.path(), "README.md", "# readme");

        let scanner = FileScanner::python(temp.path(), &AnalysisConfig::default());
        let paths: Vec<String> = scanner
            .scan()
            .unwrap()
            .into_iter()
            .map(|f| f.relative_path)
            .collect();

        assert_eq!(paths, vec!["app.py", "pkg/models.py"]);
    }

    #[test]
    fn test_root_named_like_skip_dir_is_scanned() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("build");
        touch(&root, "main.py", "");

        let scanner = FileScanner::python(&root, &AnalysisConfig::default());
        assert_eq!(scanner.scan().unwrap().len(), 1);
    }

    #[test]
    fn test_exclude_and_size_limits() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "keep.py", "x");
        touch(temp.path(), "gen/skip.py", "x");
        touch(temp.path(), "big.py", &"x".repeat(64));

        let files = FileScanner::new(temp.path())
            .with_exclude(vec!["gen/**".into()])
            .with_max_file_size(16)
            .scan()
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "keep.py");
        assert!(files[0].name_matches("*.py"));
        assert!(!files[0].name_matches("main.py"));
    }

    #[test]
    fn test_missing_root_is_invalid_path() {
        let scanner = FileScanner::new("/no/such/dir/for/c4flow");
        assert!(matches!(scanner.scan(), Err(FlowError::InvalidPath { .. })));
    }
}
