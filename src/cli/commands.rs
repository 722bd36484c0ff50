//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cljfmt_syntax::SyntaxError;
use miette::NamedSource;

use crate::format::{FormatConfig, FormatError, format_named, line_diff};

use super::{CliError, CliResult, ExitCode};

/// File extensions picked up when walking a directory.
pub const CLOJURE_EXTENSIONS: &[&str] = &["clj", "cljs", "cljc", "edn"];

const STDIN_NAME: &str = "<stdin>";

/// What to do with each file of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchMode {
    /// Print the path of every file whose formatting differs
    pub list: bool,
    /// Rewrite differing files in place
    pub write: bool,
    /// Print a line diff for every differing file
    pub diff: bool,
}

impl BatchMode {
    /// Whether a differing file makes the batch fail.
    fn fails_on_change(self) -> bool {
        self.list || self.diff
    }
}

// ============================================================================
// Single input
// ============================================================================

/// Format stdin and print the result to stdout.
pub fn format_stdin(config: &FormatConfig) -> CliResult<ExitCode> {
    let source = io::read_to_string(io::stdin())
        .map_err(|e| CliError::failure(format!("Error reading {STDIN_NAME}: {e}")))?;
    let formatted = format_named(STDIN_NAME, &source, config)
        .map_err(|e| CliError::failure(render_error(STDIN_NAME, &source, e)))?;
    write_stdout(&formatted)?;
    Ok(ExitCode::SUCCESS)
}

/// Format one file and print the result to stdout. The file itself is left untouched.
pub fn format_to_stdout(path: &Path, config: &FormatConfig) -> CliResult<ExitCode> {
    let name = path.display().to_string();
    let source =
        fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading {name}: {e}")))?;
    let formatted =
        format_named(&name, &source, config).map_err(|e| CliError::failure(render_error(&name, &source, e)))?;
    write_stdout(&formatted)?;
    Ok(ExitCode::SUCCESS)
}

fn write_stdout(formatted: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(formatted.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::failure(format!("Error writing output: {e}")))
}

// ============================================================================
// Batches
// ============================================================================

/// Format every Clojure file under `paths` according to `mode`.
///
/// A file that cannot be read, parsed, or written is reported on stderr and the batch moves on.
pub fn format_files(paths: &[PathBuf], mode: BatchMode, config: &FormatConfig) -> CliResult<ExitCode> {
    let files: Vec<PathBuf> = paths.iter().flat_map(|p| collect_clojure_files(p)).collect();
    tracing::debug!(files = files.len(), ?mode, "collected files");

    let mut changed_count = 0;
    let mut error_count = 0;

    for file_path in &files {
        let name = file_path.display().to_string();
        let source = match fs::read_to_string(file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading {name}: {e}");
                error_count += 1;
                continue;
            }
        };

        let formatted = match format_named(&name, &source, config) {
            Ok(formatted) => formatted,
            Err(e) => {
                eprintln!("{}", render_error(&name, &source, e));
                error_count += 1;
                continue;
            }
        };

        let Some(diff) = line_diff(&source, &formatted) else {
            continue;
        };
        changed_count += 1;

        if mode.list {
            println!("{name}");
        }
        if mode.diff {
            println!("--- {name}");
            print!("{diff}");
            println!();
        }
        if mode.write {
            if let Err(e) = fs::write(file_path, &formatted) {
                eprintln!("Error writing {name}: {e}");
                error_count += 1;
            }
        }
    }

    tracing::debug!(changed = changed_count, errors = error_count, "batch finished");

    if error_count > 0 || (mode.fails_on_change() && changed_count > 0) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Expand `path` into the files to format.
///
/// An explicit file is taken as-is whatever its extension. Directories are walked recursively, skipping hidden
/// directories, `target`, and `node_modules`. Entries are sorted so output order is stable.
pub fn collect_clojure_files(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(path) else {
        return files;
    };
    let mut entries: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    entries.sort();

    for entry_path in entries {
        if entry_path.is_dir() {
            let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !name.starts_with('.') && name != "target" && name != "node_modules" {
                files.extend(collect_clojure_files(&entry_path));
            }
        } else if is_clojure_file(&entry_path) {
            files.push(entry_path);
        }
    }

    files
}

fn is_clojure_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CLOJURE_EXTENSIONS.contains(&ext))
}

// ============================================================================
// Error rendering
// ============================================================================

/// Render a formatting error for the terminal.
///
/// Positioned syntax errors get a miette report with the offending source line; everything else is its `Display`.
pub fn render_error(name: &str, source: &str, err: FormatError) -> String {
    match err {
        FormatError::Syntax(err @ SyntaxError::At { .. }) => {
            let report = miette::Report::new(err).with_source_code(NamedSource::new(name, source.to_string()));
            format!("{report:?}")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(label: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("cljfmt-{label}-{}", std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, relative: &str, contents: &str) -> PathBuf {
            let path = self.0.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    // ========================================
    // File collection
    // ========================================

    #[test]
    fn test_collect_walks_directories_by_extension() {
        let dir = TempDir::new("collect");
        dir.write("src/app/core.clj", "(ns app.core)\n");
        dir.write("src/app/ui.cljs", "(ns app.ui)\n");
        dir.write("src/app/shared.cljc", "(ns app.shared)\n");
        dir.write("resources/config.edn", "{}\n");
        dir.write("README.md", "# app\n");
        dir.write(".git/hooks/x.clj", "\n");
        dir.write("target/gen.clj", "\n");

        let files: Vec<String> = collect_clojure_files(&dir.0)
            .iter()
            .map(|p| p.strip_prefix(&dir.0).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            files,
            vec!["resources/config.edn", "src/app/core.clj", "src/app/shared.cljc", "src/app/ui.cljs"]
        );
    }

    #[test]
    fn test_collect_keeps_explicit_files() {
        let path = Path::new("scripts/build.bb");
        assert_eq!(collect_clojure_files(path), vec![path.to_path_buf()]);
    }

    // ========================================
    // Batches
    // ========================================

    #[test]
    fn test_write_mode_rewrites_changed_files_only() {
        let dir = TempDir::new("write");
        let messy = dir.write("messy.clj", "(when x\ny)\n");
        let clean = dir.write("clean.clj", "(when x\n  y)\n");

        let mode = BatchMode {
            write: true,
            ..BatchMode::default()
        };
        let code = format_files(&[dir.0.clone()], mode, &FormatConfig::default()).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(fs::read_to_string(messy).unwrap(), "(when x\n  y)\n");
        assert_eq!(fs::read_to_string(clean).unwrap(), "(when x\n  y)\n");
    }

    #[test]
    fn test_list_mode_fails_when_files_differ() {
        let dir = TempDir::new("list");
        let messy = dir.write("messy.clj", "(when x\ny)\n");

        let mode = BatchMode {
            list: true,
            ..BatchMode::default()
        };
        let code = format_files(&[messy.clone()], mode, &FormatConfig::default()).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        // Listing never writes.
        assert_eq!(fs::read_to_string(messy).unwrap(), "(when x\ny)\n");
    }

    #[test]
    fn test_list_mode_succeeds_when_clean() {
        let dir = TempDir::new("clean");
        let clean = dir.write("clean.clj", "(defn f [x]\n  (inc x))\n");

        let mode = BatchMode {
            list: true,
            diff: true,
            ..BatchMode::default()
        };
        assert_eq!(format_files(&[clean], mode, &FormatConfig::default()).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_batch_continues_past_bad_files() {
        let dir = TempDir::new("errors");
        dir.write("a_broken.clj", "(defn f [");
        let good = dir.write("b_good.clj", "(when x\ny)\n");

        let mode = BatchMode {
            write: true,
            ..BatchMode::default()
        };
        let code = format_files(&[dir.0.clone(), dir.0.join("missing.clj")], mode, &FormatConfig::default()).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(fs::read_to_string(good).unwrap(), "(when x\n  y)\n");
    }

    // ========================================
    // Error rendering
    // ========================================

    #[test]
    fn test_render_syntax_error_names_the_file() {
        let source = "(defn f [";
        let err = format_named("src/core.clj", source, &FormatConfig::default()).unwrap_err();
        let rendered = render_error("src/core.clj", source, err);
        assert!(rendered.contains("unexpected EOF"));
        assert!(rendered.contains("src/core.clj"));
    }

    #[test]
    fn test_render_other_errors_as_display() {
        let err = FormatError::Io(io::Error::other("disk full"));
        assert_eq!(render_error("x.clj", "", err), "error writing output: disk full");
    }
}
