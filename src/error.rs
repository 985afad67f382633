//! Fatal fault taxonomy for the relink pipeline.

use std::path::PathBuf;

use crate::models::AssetRole;

/// Errors that abort the patch phase and therefore the host build.
///
/// Non-fatal conditions (unrecognized assets, missing bootstrap chunks,
/// unreferenced roles) are reported through `tracing` instead and never
/// interrupt the pipeline.
#[derive(Debug)]
pub enum RelinkError {
  /// The lock manifest has no entry for a package the classifier discovered.
  ///
  /// The runtime would fail to locate the package at load time, so nothing
  /// is written when this surfaces.
  MissingPackageEntry {
    /// Package name absent from the manifest's `packages` table.
    package: String,
  },
  /// A role required by a patch phase never received its final artifact.
  ///
  /// Indicates a phase-ordering violation by the host or an asset the
  /// bundler never emitted.
  MissingFinalArtifact {
    /// Role whose emitted artifact was never observed.
    role: AssetRole,
  },
  /// The emitted lock manifest content was not valid JSON.
  ManifestParse {
    /// Final path of the manifest artifact.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl std::fmt::Display for RelinkError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MissingPackageEntry { package } => {
        write!(f, "lock manifest has no entry for package '{package}'")
      }
      Self::MissingFinalArtifact { role } => {
        write!(f, "no emitted artifact observed for {role} before the patch phase")
      }
      Self::ManifestParse { path, source } => {
        write!(f, "failed to parse lock manifest {}: {}", path.display(), source)
      }
    }
  }
}

impl std::error::Error for RelinkError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::ManifestParse { source, .. } => Some(source),
      _ => None,
    }
  }
}
