use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Digest the contents of the given roots together with a recipe tag.
///
/// Paths and file bytes both feed the digest, and directory traversal is
/// sorted so the result is stable across platforms.
pub fn inputs_digest(roots: &[&Path], recipe: &str) -> Result<u64, String> {
    let mut hasher = DefaultHasher::new();
    recipe.hash(&mut hasher);

    for root in roots {
        digest_root(root, &mut hasher)?;
    }

    Ok(hasher.finish())
}

/// True when the artifact still exists and the recorded digest matches.
pub fn is_fresh(stamp_path: &Path, artifact: &Path, digest: u64) -> Result<bool, String> {
    if !artifact.exists() {
        return Ok(false);
    }

    let recorded = match fs::read_to_string(stamp_path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(format!(
                "failed to read stamp {}: {err}",
                stamp_path.display()
            ));
        }
    };

    Ok(recorded.trim() == format!("{digest:016x}"))
}

/// Record the digest so the next build can skip unchanged work.
pub fn record_digest(stamp_path: &Path, digest: u64) -> Result<(), String> {
    fs::write(stamp_path, format!("{digest:016x}\n"))
        .map_err(|err| format!("could not write stamp {}: {err}", stamp_path.display()))
}

fn digest_root(root: &Path, hasher: &mut DefaultHasher) -> Result<(), String> {
    if root.is_file() {
        return digest_file(root, hasher);
    }

    if root.is_dir() {
        for file in sorted_files_under(root)? {
            digest_file(&file, hasher)?;
        }
        return Ok(());
    }

    // A missing root still participates so its later appearance changes the digest.
    root.to_string_lossy().hash(hasher);
    "__absent__".hash(hasher);
    Ok(())
}

fn sorted_files_under(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut children: Vec<PathBuf> = fs::read_dir(&current)
            .map_err(|err| format!("failed to read directory {}: {err}", current.display()))?
            .map(|entry| {
                entry
                    .map(|entry| entry.path())
                    .map_err(|err| format!("failed to iterate {}: {err}", current.display()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        children.sort();

        for child in children {
            if child.is_dir() {
                pending.push(child);
            } else if child.is_file() {
                files.push(child);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn digest_file(path: &Path, hasher: &mut DefaultHasher) -> Result<(), String> {
    path.to_string_lossy().hash(hasher);
    fs::read(path)
        .map_err(|err| format!("could not read input {}: {err}", path.display()))?
        .hash(hasher);
    Ok(())
}
