//! Shared helpers for reading definition files

use std::path::{Path, PathBuf};

use crate::error::DefinitionError;

/// Recursively collect `.toml` files below `dir`, sorted by path
pub fn collect_toml_files(dir: &Path) -> Result<Vec<PathBuf>, DefinitionError> {
    let mut paths = Vec::new();
    collect_recursive(dir, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn collect_recursive(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), DefinitionError> {
    let entries = std::fs::read_dir(dir).map_err(|source| DefinitionError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, paths)?;
        } else if path.extension().map_or(false, |ext| ext == "toml") {
            paths.push(path);
        }
    }

    Ok(())
}

pub fn read_document(path: &Path) -> Result<toml::Table, DefinitionError> {
    let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, &path.display().to_string())
}

pub fn parse_document(source: &str, origin: &str) -> Result<toml::Table, DefinitionError> {
    toml::from_str(source).map_err(|source| DefinitionError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Elements of the array of tables stored under `key`
pub fn entries<'a>(table: &'a toml::Table, key: &str) -> impl Iterator<Item = &'a toml::Value> {
    table
        .get(key)
        .and_then(toml::Value::as_array)
        .into_iter()
        .flatten()
}
