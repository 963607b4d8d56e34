use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Whether a path has one of the given extensions (`.md`, `mdx`, ...)
    pub fn has_extension<P: AsRef<Path>>(path: P, extensions: &[String]) -> bool {
        let Some(ext) = path.as_ref().extension() else {
            return false;
        };
        let ext = ext.to_string_lossy();
        extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    /// Whether a path already lies in a localized output tree (`<docs>/<locale>/...`)
    pub fn is_localized<P: AsRef<Path>>(path: P, docs_dir: &str, locale_dir: &str) -> bool {
        let names: Vec<String> = path
            .as_ref()
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        names.windows(2).any(|pair| pair[0] == docs_dir && pair[1] == locale_dir)
    }

    fn is_localized_dir(entry: &DirEntry, docs_dir: &str, locale_dir: &str) -> bool {
        entry.file_type().is_dir()
            && entry.file_name().to_string_lossy() == locale_dir
            && entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .is_some_and(|parent| parent.to_string_lossy() == docs_dir)
    }

    /// Find documents under the given inputs.
    ///
    /// Inputs may be files or directories. Directories are walked
    /// recursively; localized output trees are skipped. The result is
    /// sorted and free of duplicates.
    pub fn find_documents<P: AsRef<Path>>(
        inputs: &[P],
        extensions: &[String],
        docs_dir: &str,
        locale_dir: &str,
    ) -> Result<Vec<PathBuf>> {
        let mut found = BTreeSet::new();

        for input in inputs {
            let input = input.as_ref();
            if Self::file_exists(input) {
                if Self::is_localized(input, docs_dir, locale_dir) {
                    log::warn!("Skipping already localized file: {:?}", input);
                } else {
                    found.insert(input.to_path_buf());
                }
                continue;
            }
            if !Self::dir_exists(input) {
                return Err(anyhow::anyhow!("Input path does not exist: {:?}", input));
            }

            let walker = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| !Self::is_localized_dir(e, docs_dir, locale_dir));

            for entry in walker {
                let entry = entry.context("Failed to read directory entry")?;
                let path = entry.path();
                if entry.file_type().is_file() && Self::has_extension(path, extensions) {
                    found.insert(path.to_path_buf());
                }
            }
        }

        Ok(found.into_iter().collect())
    }

    /// Output path of the translation of `source`.
    ///
    /// The locale directory is inserted right after the first `docs_dir`
    /// component (`docs/guides/x.md` -> `docs/ja-jp/guides/x.md`). Paths
    /// outside a docs tree go under `<docs_dir>/<locale_dir>/`.
    pub fn localized_path<P: AsRef<Path>>(source: P, docs_dir: &str, locale_dir: &str) -> PathBuf {
        let source = source.as_ref();
        let mut localized = PathBuf::new();
        let mut inserted = false;

        for component in source.components() {
            localized.push(component.as_os_str());
            if !inserted && matches!(component, Component::Normal(name) if name.to_string_lossy() == docs_dir) {
                localized.push(locale_dir);
                inserted = true;
            }
        }

        if inserted {
            localized
        } else {
            let relative: PathBuf = source
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            Path::new(docs_dir).join(locale_dir).join(relative)
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
