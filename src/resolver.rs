//! Caller-overridable mapping from asset roles to final reference strings.

use crate::catalog::AssetCatalog;
use crate::models::{AssetRole, BootstrapChunk};

/// Everything a resolver may consult when shaping a reference.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
  /// Catalog holding original names and final paths for every role.
  pub catalog: &'a AssetCatalog,
  /// Bootstrap chunk being patched; `None` while patching the lock manifest.
  pub chunk: Option<&'a BootstrapChunk>,
}

/// Hook converting a catalog role into the reference string written into
/// patched output. Lets deployments shape URLs (CDN prefixes, directory
/// layouts) without touching the pipeline.
pub type UrlResolver = Box<dyn Fn(&AssetRole, &ResolveContext<'_>) -> String>;

/// Default resolver: basename of the role's final path.
///
/// Falls back to the basename of the original name when the final path is
/// not yet known; the patch phases validate presence before resolving, so
/// the fallback only matters for custom call sites.
pub fn basename_resolver(role: &AssetRole, context: &ResolveContext<'_>) -> String {
  let reference = context
    .catalog
    .final_path(role)
    .or_else(|| context.catalog.original_name(role))
    .unwrap_or_default();
  basename(reference).to_string()
}

fn basename(path: &str) -> &str {
  path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ArtifactPayload;

  #[test]
  fn resolves_to_basename_of_final_path() {
    let mut catalog = AssetCatalog::new();
    catalog.seed(AssetRole::WasmBinary, "interp.asm.wasm");
    catalog.observe_emitted(
      "interp.asm.wasm",
      "assets/interp.asm-c0ffee.wasm",
      ArtifactPayload::Binary(Vec::new()),
    );

    let context = ResolveContext { catalog: &catalog, chunk: None };
    assert_eq!(
      basename_resolver(&AssetRole::WasmBinary, &context),
      "interp.asm-c0ffee.wasm"
    );
  }

  #[test]
  fn falls_back_to_original_name_before_emission() {
    let mut catalog = AssetCatalog::new();
    catalog.seed(AssetRole::WasmBinary, "interp.asm.wasm");

    let context = ResolveContext { catalog: &catalog, chunk: None };
    assert_eq!(basename_resolver(&AssetRole::WasmBinary, &context), "interp.asm.wasm");
  }

  #[test]
  fn basename_strips_windows_and_posix_separators() {
    assert_eq!(basename("assets/deep/file.wasm"), "file.wasm");
    assert_eq!(basename("assets\\file.wasm"), "file.wasm");
    assert_eq!(basename("file.wasm"), "file.wasm");
  }
}
