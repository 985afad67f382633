//! Rewriting package locations inside the emitted lock manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::catalog::AssetCatalog;
use crate::error::RelinkError;
use crate::models::AssetRole;
use crate::resolver::{ResolveContext, UrlResolver};

/// Rewrite the `file_name` field of every catalogued package inside the lock
/// manifest and write the document to its final path under `output_dir`.
///
/// Only `file_name` fields are touched; the rest of the document survives
/// re-serialization untouched. All validation happens before anything is
/// written, so a failure leaves no file behind. Returns the path written.
pub fn patch_lock_manifest(
  catalog: &AssetCatalog,
  resolver: &UrlResolver,
  output_dir: &Path,
) -> Result<PathBuf> {
  let manifest_role = AssetRole::ManifestDescriptor;
  let final_path = catalog.require_final_path(&manifest_role)?.to_string();
  let text = catalog
    .final_content(&manifest_role)
    .and_then(|payload| payload.as_text())
    .ok_or_else(|| RelinkError::MissingFinalArtifact { role: manifest_role.clone() })?;

  // Every package must already have a final artifact; failing late would
  // leave a manifest pointing at a mix of old and new names.
  for package in catalog.package_names() {
    catalog.require_final_path(&AssetRole::Package(package.clone()))?;
  }

  let mut document: Value =
    serde_json::from_str(text).map_err(|source| RelinkError::ManifestParse {
      path: PathBuf::from(&final_path),
      source,
    })?;

  for package in catalog.package_names() {
    let role = AssetRole::Package(package.clone());
    let reference = resolver(&role, &ResolveContext { catalog, chunk: None });
    let entry = document
      .get_mut("packages")
      .and_then(|packages| packages.get_mut(package))
      .and_then(Value::as_object_mut)
      .ok_or_else(|| RelinkError::MissingPackageEntry { package: package.clone() })?;
    entry.insert("file_name".to_string(), Value::String(reference));
  }

  let destination = output_dir.join(&final_path);
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(&destination, serde_json::to_string(&document)?)
    .with_context(|| format!("failed to write {}", destination.display()))?;
  info!("updated lock manifest: {}", destination.display());

  Ok(destination)
}
