//! Async file operations over a [`StoreRoot`].

use std::io;
use std::path::Path;

use snafu::prelude::*;
use tokio::{
    fs::{self, OpenOptions},
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};

use crate::storage::{
    StoreRoot,
    error::{AlreadyExistsSnafu, BackendError, NotFoundSnafu, OtherIoSnafu, StorageResult},
};

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

/// Create a dataset's directory if it does not exist yet.
///
/// Datasets are created implicitly by first use; this is the only place that
/// materializes them.
pub async fn ensure_dataset_dir(root: &StoreRoot, dataset: &str) -> StorageResult<()> {
    let dir = root.dataset_dir(dataset);
    fs::create_dir_all(&dir)
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu {
            path: path_str(&dir),
        })
}

/// Create a *new* collection file seeded with `first_line`, failing with
/// `AlreadyExists` if the collection is already present.
///
/// The create-new semantics are the provisioner's idempotency guard: under
/// `CreateOrReuse` an existing collection is left untouched, and no second
/// placeholder is ever written.
pub async fn create_collection_file(
    root: &StoreRoot,
    dataset: &str,
    collection: &str,
    first_line: &str,
) -> StorageResult<()> {
    let abs = root.collection_file(dataset, collection);
    let path = path_str(&abs);

    let open_result = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&abs)
        .await;

    let mut file = match open_result {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(BackendError::Local(e)).context(AlreadyExistsSnafu { path });
        }
        Err(e) => {
            return Err(BackendError::Local(e)).context(OtherIoSnafu { path });
        }
    };

    write_line(&mut file, first_line, &path).await
}

/// Append one document line to an existing collection file.
///
/// The collection must already exist; a missing file surfaces as `NotFound`
/// rather than being created implicitly (collection creation is the
/// provisioner's sole responsibility). The line plus terminator goes out in
/// a single write call, so a record is either fully present or absent.
pub async fn append_line(
    root: &StoreRoot,
    dataset: &str,
    collection: &str,
    line: &str,
) -> StorageResult<()> {
    let abs = root.collection_file(dataset, collection);
    let path = path_str(&abs);

    let open_result = OpenOptions::new().append(true).open(&abs).await;

    let mut file = match open_result {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(BackendError::Local(e)).context(NotFoundSnafu { path });
        }
        Err(e) => {
            return Err(BackendError::Local(e)).context(OtherIoSnafu { path });
        }
    };

    write_line(&mut file, line, &path).await
}

async fn write_line(file: &mut fs::File, line: &str, path: &str) -> StorageResult<()> {
    let mut payload = String::with_capacity(line.len() + 1);
    payload.push_str(line);
    payload.push('\n');

    file.write_all(payload.as_bytes())
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu { path })?;

    file.sync_all()
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu { path })
}

/// Read every stored line of a collection, in insertion order.
pub async fn read_all_lines(
    root: &StoreRoot,
    dataset: &str,
    collection: &str,
) -> StorageResult<Vec<String>> {
    let abs = root.collection_file(dataset, collection);
    let path = path_str(&abs);

    match fs::read_to_string(&abs).await {
        Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BackendError::Local(e)).context(NotFoundSnafu { path })
        }
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu { path }),
    }
}

/// Read the first stored line of a collection, if any.
///
/// Used by the catalog to sample one arbitrary record without reading the
/// whole file. A missing file reads as empty.
pub async fn read_first_line(
    root: &StoreRoot,
    dataset: &str,
    collection: &str,
) -> StorageResult<Option<String>> {
    let abs = root.collection_file(dataset, collection);
    let path = path_str(&abs);

    let file = match fs::File::open(&abs).await {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BackendError::Local(e)).context(OtherIoSnafu { path });
        }
    };

    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu { path })?;

    if read == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// List the collections present in a dataset, sorted by name.
///
/// A dataset that has never been used (no directory) reads as empty.
pub async fn list_collection_names(root: &StoreRoot, dataset: &str) -> StorageResult<Vec<String>> {
    let dir = root.dataset_dir(dataset);
    let path = path_str(&dir);

    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(BackendError::Local(e)).context(OtherIoSnafu { path });
        }
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(BackendError::Local)
        .context(OtherIoSnafu { path: path.clone() })?
    {
        let file_name = entry.file_name();
        if let Some(name) = file_name
            .to_str()
            .and_then(StoreRoot::collection_name_from_file)
        {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Remove a collection file. Irreversible; used only by `ResetAll`.
pub async fn drop_collection_file(
    root: &StoreRoot,
    dataset: &str,
    collection: &str,
) -> StorageResult<()> {
    let abs = root.collection_file(dataset, collection);
    let path = path_str(&abs);

    match fs::remove_file(&abs).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BackendError::Local(e)).context(NotFoundSnafu { path })
        }
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu { path }),
    }
}

/// Whether a collection file physically exists.
pub async fn collection_exists(
    root: &StoreRoot,
    dataset: &str,
    collection: &str,
) -> StorageResult<bool> {
    let abs = root.collection_file(dataset, collection);
    let path = path_str(&abs);

    match fs::metadata(&abs).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BackendError::Local(e)).context(OtherIoSnafu { path }),
    }
}
