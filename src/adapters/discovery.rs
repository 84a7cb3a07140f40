use crate::config::DiscoverySettings;
use crate::utils::error::{Result, TranslatorError};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves the documents a run should process: either the single file
/// named in `settings`, or every matching file below `settings.path`.
pub fn discover(settings: &DiscoverySettings) -> Result<Vec<String>> {
    match &settings.file {
        Some(file) => single_document(file, &settings.extension),
        None => find_documents(
            Path::new(&settings.path),
            &settings.extension,
            settings.include.as_deref(),
            settings.exclude.as_deref(),
        ),
    }
}

pub fn single_document(path: &str, extension: &str) -> Result<Vec<String>> {
    let candidate = Path::new(path);
    if candidate.is_file() && has_extension(candidate, extension) {
        Ok(vec![path.to_string()])
    } else {
        Err(TranslatorError::config(format!(
            "{} is not a valid {} file",
            path,
            extension.to_ascii_uppercase()
        )))
    }
}

/// Recursively collects files ending in `.extension`, sorted by path.
/// `include` keeps only paths containing the substring, `exclude` drops them.
pub fn find_documents(
    root: &Path,
    extension: &str,
    include: Option<&str>,
    exclude: Option<&str>,
) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(TranslatorError::config(format!(
            "Directory not found: {}",
            root.display()
        )));
    }

    let mut found = Vec::new();
    collect(root, extension, &mut found)?;
    found.sort();

    Ok(found
        .into_iter()
        .map(|path| path.to_string_lossy().into_owned())
        .filter(|path| include.map_or(true, |pattern| path.contains(pattern)))
        .filter(|path| exclude.map_or(true, |pattern| !path.contains(pattern)))
        .collect())
}

fn collect(dir: &Path, extension: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect(&path, extension, found)?;
        } else if has_extension(&path, extension) {
            found.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}
