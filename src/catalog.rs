//! Process-scoped catalog mapping asset roles to their pre- and post-build identities.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::RelinkError;
use crate::models::{ArtifactPayload, AssetRecord, AssetRole};

/// Accumulates knowledge about runtime assets across build phases.
///
/// The classifier seeds records with original file names; observation
/// callbacks later attach the bundler-assigned path and content. Records only
/// grow: every mutation is a set-if-absent write, so the catalog never
/// forgets a fact and no phase sees a partially overwritten record.
#[derive(Debug, Default)]
pub struct AssetCatalog {
  records: BTreeMap<AssetRole, AssetRecord>,
  package_names: Vec<String>,
}

impl AssetCatalog {
  /// Create an empty catalog for a single build.
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed a role with its pre-build file name.
  ///
  /// A second file classifying into an occupied role keeps the first file
  /// and logs a warning; the naming convention makes this unreachable in
  /// practice.
  pub fn seed(&mut self, role: AssetRole, original_name: &str) {
    if let Some(existing) = self.records.get(&role) {
      warn!(
        "ignoring '{original_name}': {role} already classified from '{}'",
        existing.original_name
      );
      return;
    }
    if let AssetRole::Package(name) = &role {
      self.package_names.push(name.clone());
    }
    self.records.insert(role, AssetRecord::seeded(original_name));
  }

  /// Attach the final path and emitted content to the record whose original
  /// file name matches `original_ref`.
  ///
  /// Returns `true` when a record consumed the observation. Re-observation
  /// of an already-finalized record is ignored, keeping the first report.
  pub fn observe_emitted(
    &mut self,
    original_ref: &str,
    final_path: &str,
    payload: ArtifactPayload,
  ) -> bool {
    let Some(record) = self
      .records
      .values_mut()
      .find(|record| record.original_name == original_ref)
    else {
      return false;
    };

    if record.final_path.is_some() {
      debug!("ignoring duplicate emission report for '{original_ref}'");
      return true;
    }

    record.final_path = Some(final_path.to_string());
    record.final_content = Some(payload);
    true
  }

  /// Pre-build file name seeded for a role, if the role was classified.
  pub fn original_name(&self, role: &AssetRole) -> Option<&str> {
    self.records.get(role).map(|record| record.original_name.as_str())
  }

  /// Bundler-assigned output path for a role, once observed.
  pub fn final_path(&self, role: &AssetRole) -> Option<&str> {
    self
      .records
      .get(role)
      .and_then(|record| record.final_path.as_deref())
  }

  /// Emitted content for a role, once observed.
  pub fn final_content(&self, role: &AssetRole) -> Option<&ArtifactPayload> {
    self
      .records
      .get(role)
      .and_then(|record| record.final_content.as_ref())
  }

  /// Final path for a role required by a patch phase.
  pub fn require_final_path(&self, role: &AssetRole) -> Result<&str, RelinkError> {
    self
      .final_path(role)
      .ok_or_else(|| RelinkError::MissingFinalArtifact { role: role.clone() })
  }

  /// Package names discovered by the classifier, in classification order.
  pub fn package_names(&self) -> &[String] {
    &self.package_names
  }

  /// Returns `true` once any record exists for the role.
  pub fn contains(&self, role: &AssetRole) -> bool {
    self.records.contains_key(role)
  }

  /// Returns `true` when some record was seeded from this original file name.
  pub fn contains_original(&self, original_ref: &str) -> bool {
    self
      .records
      .values()
      .any(|record| record.original_name == original_ref)
  }
}
