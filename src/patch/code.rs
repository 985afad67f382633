//! Literal substitution of original asset names inside bootstrap chunks.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::catalog::AssetCatalog;
use crate::error::RelinkError;
use crate::models::{AssetRole, BootstrapChunk};
use crate::resolver::{ResolveContext, UrlResolver};

/// Core roles substituted into bootstrap code, in patch order.
pub const CORE_ROLES: [AssetRole; 4] = [
  AssetRole::InterpreterScript,
  AssetRole::WasmBinary,
  AssetRole::FilesystemImage,
  AssetRole::ManifestDescriptor,
];

/// Outcome of patching the retained bootstrap chunks.
#[derive(Debug, Default)]
pub struct CodePatchOutcome {
  /// Number of chunks rewritten on disk.
  pub patched_chunks: usize,
  /// Core roles whose original file name appeared in no chunk.
  pub unreferenced_roles: Vec<AssetRole>,
}

/// Replace every literal occurrence of the core roles' original file names
/// with their resolved references and write each chunk back to its final
/// path under `output_dir`.
///
/// Substitution is plain string replacement: the build picks original names
/// that are unique substrings within the bundle, so no token boundary check
/// is needed. Patched text no longer contains the original names, which
/// makes a repeated run a no-op.
pub fn patch_bootstrap_chunks(
  catalog: &AssetCatalog,
  chunks: &[BootstrapChunk],
  resolver: &UrlResolver,
  output_dir: &Path,
) -> Result<CodePatchOutcome> {
  let mut substitutions = Vec::with_capacity(CORE_ROLES.len());
  for role in CORE_ROLES {
    let original = catalog
      .original_name(&role)
      .ok_or_else(|| RelinkError::MissingFinalArtifact { role: role.clone() })?
      .to_string();
    catalog.require_final_path(&role)?;
    substitutions.push((role, original));
  }

  let mut match_counts = [0usize; CORE_ROLES.len()];
  for chunk in chunks {
    let context = ResolveContext { catalog, chunk: Some(chunk) };
    let mut text = chunk.text.clone();
    for (index, (role, original)) in substitutions.iter().enumerate() {
      match_counts[index] += text.matches(original.as_str()).count();
      let reference = resolver(role, &context);
      text = text.replace(original.as_str(), &reference);
    }

    let destination = output_dir.join(&chunk.path);
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&destination, text)
      .with_context(|| format!("failed to write {}", destination.display()))?;
    info!("updated bootstrap chunk: {}", destination.display());
  }

  let mut unreferenced_roles = Vec::new();
  for ((role, original), count) in substitutions.into_iter().zip(match_counts) {
    if count == 0 {
      warn!("'{original}' ({role}) was referenced by no bootstrap chunk");
      unreferenced_roles.push(role);
    }
  }

  Ok(CodePatchOutcome {
    patched_chunks: chunks.len(),
    unreferenced_roles,
  })
}

/// Apply a caller-supplied transform to the interpreter script on disk.
///
/// Escape hatch for environment-specific fixes that must run after the
/// reference patches. A `Some` result with non-empty text replaces the file
/// in place; anything else leaves it untouched.
pub fn apply_script_transform<F>(
  catalog: &AssetCatalog,
  output_dir: &Path,
  transform: F,
) -> Result<()>
where
  F: FnOnce(&str) -> Option<String>,
{
  let Some(final_path) = catalog.final_path(&AssetRole::InterpreterScript) else {
    warn!("interpreter script was never emitted; skipping script transform");
    return Ok(());
  };

  let script_path = output_dir.join(final_path);
  let text = fs::read_to_string(&script_path)
    .with_context(|| format!("failed to read {}", script_path.display()))?;
  if let Some(updated) = transform(&text)
    && !updated.is_empty()
  {
    fs::write(&script_path, updated)
      .with_context(|| format!("failed to write {}", script_path.display()))?;
    info!("transformed interpreter script: {}", script_path.display());
  }

  Ok(())
}
