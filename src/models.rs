//! Data structures tracked while relinking runtime assets.

use std::path::PathBuf;

/// Semantic role assigned to a runtime asset at classification time.
///
/// Roles are assigned once and never change; package roles are keyed by the
/// normalized package name extracted from the archive file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetRole {
  /// The interpreter's web bootstrap script.
  InterpreterScript,
  /// The interpreter's compiled WASM module.
  WasmBinary,
  /// The archived standard-library filesystem image.
  FilesystemImage,
  /// The lock manifest describing loadable extension packages.
  ManifestDescriptor,
  /// A preloadable extension package archive.
  Package(String),
}

impl std::fmt::Display for AssetRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InterpreterScript => write!(f, "interpreter script"),
      Self::WasmBinary => write!(f, "wasm binary"),
      Self::FilesystemImage => write!(f, "filesystem image"),
      Self::ManifestDescriptor => write!(f, "lock manifest"),
      Self::Package(name) => write!(f, "package '{name}'"),
    }
  }
}

/// Bytes handed over by the bundler for an emitted artifact.
///
/// Program text arrives decoded; binary payloads (WASM, archives) stay raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPayload {
  /// Decoded program text.
  Text(String),
  /// Raw bytes.
  Binary(Vec<u8>),
}

impl ArtifactPayload {
  /// Borrow the payload as text when it was emitted as program text.
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(text) => Some(text),
      Self::Binary(_) => None,
    }
  }
}

/// Catalog entry tracking one asset from classification through emission.
///
/// `final_path` and `final_content` stay empty until the bundler reports the
/// materialized artifact; once set they are never overwritten.
#[derive(Debug, Clone)]
pub struct AssetRecord {
  /// File name the asset carried before the build.
  pub original_name: String,
  /// Bundler-assigned output path, relative to the bundle root.
  pub final_path: Option<String>,
  /// Content the bundler actually emitted for the asset.
  pub final_content: Option<ArtifactPayload>,
}

impl AssetRecord {
  /// Create a record seeded with the pre-build file name only.
  pub fn seeded(original_name: impl Into<String>) -> Self {
    Self {
      original_name: original_name.into(),
      final_path: None,
      final_content: None,
    }
  }
}

/// Emitted program-text artifact judged to contain literal asset-name references.
#[derive(Debug, Clone)]
pub struct BootstrapChunk {
  /// Output path of the chunk, relative to the bundle root.
  pub path: String,
  /// Chunk text as emitted by the bundler.
  pub text: String,
}

/// Summary of what the completion phase patched.
#[derive(Debug, Clone)]
pub struct RelinkReport {
  /// Absolute path the rewritten lock manifest was written to.
  pub manifest_path: PathBuf,
  /// Number of bootstrap chunks rewritten on disk.
  pub patched_chunks: usize,
  /// Core roles whose original file name appeared in no retained chunk.
  pub unreferenced_roles: Vec<AssetRole>,
}
