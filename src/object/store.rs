use std::fs;
use std::path::PathBuf;

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{not_found_or_io, Error, Result};
use crate::fs::atomic_write;
use crate::hash::{compute_hash, Hash};
use crate::repo::Repo;

/// write raw bytes to the object store
///
/// returns the content hash. writing content that is already stored is a
/// no-op: the existing file is left untouched.
pub fn write_object(repo: &Repo, content: &[u8]) -> Result<Hash> {
    let hash = compute_hash(content);
    let path = object_path(repo, &hash);

    // dedup: if object already exists, we're done
    if path.exists() {
        trace!(%hash, "object already stored");
        return Ok(hash);
    }

    atomic_write(&repo.tmp_path(), &path, content)?;
    trace!(%hash, bytes = content.len(), "stored object");

    Ok(hash)
}

/// read raw bytes from the object store
///
/// the content is re-hashed; a mismatch means the file was altered after it
/// was written and is reported as corrupt.
pub fn read_object(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    let path = object_path(repo, hash);
    let content = fs::read(&path)
        .map_err(|e| not_found_or_io(e, &path, || Error::ObjectNotFound(*hash)))?;

    if compute_hash(&content) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(content)
}

/// get the filesystem path to an object
pub fn object_path(repo: &Repo, hash: &Hash) -> PathBuf {
    repo.objects_path().join(hash.to_hex())
}

/// check if an object exists in the store
pub fn object_exists(repo: &Repo, hash: &Hash) -> bool {
    object_path(repo, hash).is_file()
}

/// list every object hash in the store, sorted
///
/// files whose names are not hex digests are skipped.
pub fn list_objects(repo: &Repo) -> Result<Vec<Hash>> {
    let dir = repo.objects_path();
    let mut hashes = Vec::new();

    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.clone(),
            source: e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")
            }),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_str().unwrap_or("");
        if Hash::is_hex_digest(name) {
            hashes.push(Hash::from_hex(name)?);
        }
    }

    hashes.sort();
    Ok(hashes)
}
