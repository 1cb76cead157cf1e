use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use crate::drivers::ExportError;
/// Base name of a record file: everything before the first `.`.
pub fn record_base_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}
/// Deduplicated base names from a listing of file names.
pub fn unique_base_names<'a>(file_names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    file_names
        .into_iter()
        .map(record_base_name)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}
/// Lists the distinct record names stored in `dir`, skipping sub-directories.
pub fn list_record_names(dir: &Path) -> Result<BTreeSet<String>, ExportError> {
    let mut file_names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ExportError::io(dir, e))? {
        let entry = entry.map_err(|e| ExportError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ExportError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        file_names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(unique_base_names(file_names.iter().map(String::as_str)))
}
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    #[test]
    fn duplicate_extensions_collapse_to_one_name() {
        let names = unique_base_names(["A.dat", "A.hea", "B.dat"]);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }
    #[test]
    fn base_name_stops_at_first_dot() {
        assert_eq!(record_base_name("s01.tar.gz"), "s01");
        assert_eq!(record_base_name("README"), "README");
        assert!(unique_base_names([".DS_Store"]).is_empty());
    }
    #[test]
    fn lists_directory_without_subdirectories() {
        let dir = tempdir().unwrap();
        for name in ["p1.hea", "p1.dat", "p2.hea", "p2.dat", "p3.atr"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let names = list_record_names(dir.path()).unwrap();
        assert_eq!(names.len(), 3);
        assert!(names.contains("p3"));
        assert!(!names.contains("nested"));
    }
    #[test]
    fn missing_directory_propagates() {
        let dir = tempdir().unwrap();
        let err = list_record_names(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
