//! Store root and path conventions.

use std::path::{Path, PathBuf};

/// File extension used for collection files.
const COLLECTION_EXT: &str = "ndjson";

/// Root directory of a document store.
///
/// All dataset and collection paths are derived from this value; nothing
/// outside this module builds store paths by hand.
#[derive(Debug, Clone)]
pub struct StoreRoot {
    root: PathBuf,
}

impl StoreRoot {
    /// Creates a store root over a local directory.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        StoreRoot { root: root.into() }
    }

    /// The root directory itself.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory holding one dataset's collections.
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }

    /// File holding one collection's records.
    pub fn collection_file(&self, dataset: &str, collection: &str) -> PathBuf {
        self.dataset_dir(dataset)
            .join(format!("{collection}.{COLLECTION_EXT}"))
    }

    /// Extract a collection name from a directory entry file name, if the
    /// entry uses the collection extension.
    pub(crate) fn collection_name_from_file(file_name: &str) -> Option<&str> {
        file_name.strip_suffix(&format!(".{COLLECTION_EXT}"))
    }
}

/// Validate a dataset or collection name.
///
/// Names become path components, so anything that could escape the store
/// root or collide with hidden files is rejected: empty names, path
/// separators, `.`-prefixed names, and the parent/self components.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_file_uses_ndjson_extension() {
        let root = StoreRoot::local("/data/store");
        let path = root.collection_file("ProGraphing", "Sensor");
        assert_eq!(path, PathBuf::from("/data/store/ProGraphing/Sensor.ndjson"));
    }

    #[test]
    fn collection_name_parses_back_from_file_name() {
        assert_eq!(
            StoreRoot::collection_name_from_file("Sensor.ndjson"),
            Some("Sensor")
        );
        assert_eq!(StoreRoot::collection_name_from_file("Sensor.json"), None);
    }

    #[test]
    fn name_validation_rejects_path_escapes() {
        assert!(is_valid_name("Sensor"));
        assert!(is_valid_name("sensor_2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name(".hidden"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("a\\b"));
    }
}
