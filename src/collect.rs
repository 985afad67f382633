//! Detection and retention of emitted bootstrap chunks.

use crate::models::BootstrapChunk;

/// Watches emitted program text for the runtime's bootstrap signature and
/// retains every matching chunk for the patch phase.
///
/// The signature is the interpreter script's pre-build file name: only the
/// chunk that bootstraps the runtime mentions it literally. Zero matches is
/// legal; the patch phase handles an empty retained set.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
  signature: Option<String>,
  chunks: Vec<BootstrapChunk>,
}

impl ReferenceCollector {
  /// Create a collector with no signature; it matches nothing until
  /// [`set_signature`](Self::set_signature) is called.
  pub fn new() -> Self {
    Self::default()
  }

  /// Install the substring that marks a chunk as bootstrap code.
  pub fn set_signature(&mut self, signature: impl Into<String>) {
    self.signature = Some(signature.into());
  }

  /// Inspect one emitted text artifact; retains it when the signature
  /// matches. Returns `true` when the chunk was retained.
  pub fn observe(&mut self, path: &str, text: &str) -> bool {
    let Some(signature) = self.signature.as_deref() else {
      return false;
    };
    if !text.contains(signature) {
      return false;
    }
    self.chunks.push(BootstrapChunk {
      path: path.to_string(),
      text: text.to_string(),
    });
    true
  }

  /// Chunks retained so far, in emission order.
  pub fn chunks(&self) -> &[BootstrapChunk] {
    &self.chunks
  }

  /// Returns `true` when no chunk matched the signature.
  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }
}
