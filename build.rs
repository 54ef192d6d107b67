use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use syntect::dumps::dump_to_uncompressed_file;
use two_face::syntax;
use walkdir::WalkDir;

#[path = "build_support/incremental.rs"]
mod incremental;

const ASSET_ROOT: &str = "static";
const STAGING_RECIPE: &str = "static_public:v1";

fn main() {
    stage_public_assets().expect("staging static public assets failed");
    emit_syntax_pack().expect("encoding the syntax pack failed");

    // Directory-level rerun tracking covers nested additions and removals.
    println!("cargo:rerun-if-changed={ASSET_ROOT}");
    println!("cargo:rerun-if-changed=build_support/incremental.rs");
}

/// Mirror `static/public` into OUT_DIR so `include_dir!` embeds a tree the
/// working copy can no longer mutate after the build. Skipped when the digest
/// stamp matches the current inputs.
fn stage_public_assets() -> Result<(), String> {
    let out_dir = build_out_dir()?;
    let source = Path::new(ASSET_ROOT).join("public");
    let staging = out_dir.join("static_public");
    let stamp = out_dir.join("static_public.digest");

    let digest = incremental::inputs_digest(&[source.as_path()], STAGING_RECIPE)?;
    if incremental::is_fresh(&stamp, &staging, digest)? {
        return Ok(());
    }

    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|err| stage_error("clean", &staging, &err))?;
    }
    mirror_tree(&source, &staging)?;
    incremental::record_digest(&stamp, digest)
}

fn mirror_tree(source: &Path, staging: &Path) -> Result<(), String> {
    fs::create_dir_all(staging).map_err(|err| stage_error("create", staging, &err))?;

    for entry in WalkDir::new(source).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| format!("asset path escaped {}: {err}", source.display()))?;
        let target = staging.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| stage_error("create", parent, &err))?;
        }
        fs::copy(entry.path(), &target).map_err(|err| stage_error("copy", &target, &err))?;
    }

    Ok(())
}

/// Serialize the extended syntect syntax set once at build time; the runtime
/// loads it through the SYNTAX_PACK_FILE env var instead of parsing syntax
/// definitions on startup.
fn emit_syntax_pack() -> Result<(), String> {
    let pack = build_out_dir()?.join("syntaxes.packdump");
    dump_to_uncompressed_file(&syntax::extra_newlines(), &pack)
        .map_err(|err| format!("syntax set did not serialize: {err}"))?;

    println!("cargo:rustc-env=SYNTAX_PACK_FILE={}", pack.display());
    Ok(())
}

fn build_out_dir() -> Result<PathBuf, String> {
    env::var("OUT_DIR")
        .map(PathBuf::from)
        .map_err(|err| format!("OUT_DIR is not set: {err}"))
}

fn stage_error(action: &str, path: &Path, err: &dyn std::fmt::Display) -> String {
    format!("could not {action} {}: {err}", path.display())
}
