//! Phase-driven pipeline the host bundler drives through three callbacks.

use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::catalog::AssetCatalog;
use crate::classify::ClassifierRules;
use crate::collect::ReferenceCollector;
use crate::models::{ArtifactPayload, AssetRole, RelinkReport};
use crate::patch::code::{CodePatchOutcome, apply_script_transform, patch_bootstrap_chunks};
use crate::patch::manifest::patch_lock_manifest;
use crate::resolver::{ResolveContext, UrlResolver, basename_resolver};

/// One-shot text transform applied to the interpreter script after patching.
pub type ScriptTransform = Box<dyn FnOnce(&str) -> Option<String>>;

/// Asset relocation and reference-patching pipeline for one build.
///
/// The host drives it through [`build_start`](Self::build_start), any number
/// of [`artifact_emitted`](Self::artifact_emitted) calls, and a final
/// [`build_complete`](Self::build_complete). Each build constructs its own
/// pipeline; nothing is shared between builds, so several builds can run in
/// the same process.
pub struct RelinkPipeline {
  rules: ClassifierRules,
  output_dir: PathBuf,
  catalog: AssetCatalog,
  collector: ReferenceCollector,
  resolver: UrlResolver,
  script_transform: Option<ScriptTransform>,
}

impl RelinkPipeline {
  /// Create a pipeline writing patched files under the bundle output directory.
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      rules: ClassifierRules::default(),
      output_dir: output_dir.into(),
      catalog: AssetCatalog::new(),
      collector: ReferenceCollector::new(),
      resolver: Box::new(basename_resolver),
      script_transform: None,
    }
  }

  /// Replace the default classification rules.
  pub fn with_rules(mut self, rules: ClassifierRules) -> Self {
    self.rules = rules;
    self
  }

  /// Replace the default basename resolver with a deployment-specific one.
  pub fn with_resolver<F>(mut self, resolver: F) -> Self
  where
    F: Fn(&AssetRole, &ResolveContext<'_>) -> String + 'static,
  {
    self.resolver = Box::new(resolver);
    self
  }

  /// Install a transform applied once to the interpreter script post-patch.
  pub fn with_script_transform<F>(mut self, transform: F) -> Self
  where
    F: FnOnce(&str) -> Option<String> + 'static,
  {
    self.script_transform = Some(Box::new(transform));
    self
  }

  /// Read access to the accumulated catalog.
  pub fn catalog(&self) -> &AssetCatalog {
    &self.catalog
  }

  /// Build-start hook: classify the raw asset listing and seed the catalog
  /// with original file names.
  ///
  /// Must run before any [`artifact_emitted`](Self::artifact_emitted) call.
  /// Unrecognized files are logged and skipped, never fatal.
  pub fn build_start<I, S>(&mut self, asset_names: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let classification = self.rules.classify(asset_names);
    for name in &classification.unrecognized {
      warn!("unrecognized runtime asset: {name}");
    }
    for (role, original_name) in classification.entries {
      self.catalog.seed(role, &original_name);
    }
    if let Some(signature) = self.catalog.original_name(&AssetRole::InterpreterScript) {
      self.collector.set_signature(signature);
    }
  }

  /// Emission hook: record the final identity of catalogued assets and
  /// retain program-text chunks carrying the bootstrap signature.
  ///
  /// `original_ref` is the pre-build file name the bundler associates with
  /// an asset, or `None` for synthesized chunks.
  pub fn artifact_emitted(
    &mut self,
    original_ref: Option<&str>,
    final_path: &str,
    payload: ArtifactPayload,
  ) {
    if let Some(original_ref) = original_ref
      && self.catalog.contains_original(original_ref)
    {
      self.catalog.observe_emitted(original_ref, final_path, payload);
      return;
    }
    if let Some(text) = payload.as_text() {
      self.collector.observe(final_path, text);
    }
  }

  /// Completion hook: patch the lock manifest and every retained bootstrap
  /// chunk, then run the script transform.
  ///
  /// Only now are all final paths guaranteed known, so this is the earliest
  /// point any reference can be rewritten. Fatal faults abort with an error;
  /// the host is expected to fail the build on them.
  pub fn build_complete(&mut self) -> Result<RelinkReport> {
    let manifest_path = patch_lock_manifest(&self.catalog, &self.resolver, &self.output_dir)?;

    let outcome = if self.collector.is_empty() {
      warn!("no emitted chunk matched the bootstrap signature; code references were not patched");
      CodePatchOutcome::default()
    } else {
      patch_bootstrap_chunks(
        &self.catalog,
        self.collector.chunks(),
        &self.resolver,
        &self.output_dir,
      )?
    };

    if let Some(transform) = self.script_transform.take() {
      apply_script_transform(&self.catalog, &self.output_dir, transform)?;
    }

    Ok(RelinkReport {
      manifest_path,
      patched_chunks: outcome.patched_chunks,
      unreferenced_roles: outcome.unreferenced_roles,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolver::basename_resolver;
  use serde_json::Value;
  use std::fs;
  use tempfile::tempdir;

  const ASSET_NAMES: [&str; 5] = [
    "tidy_tools-0.4.0-py3-none-any.whl",
    "interp.web.asm.js",
    "interp.asm.wasm",
    "interp_stdlib.zip",
    "interp-lock.json",
  ];

  const MANIFEST: &str = r#"{"packages":{"tidy-tools":{"name":"tidy-tools","version":"0.4.0","file_name":"tidy_tools-0.4.0-py3-none-any.whl"}}}"#;

  /// Drive the emission phase the way a bundler reporting hashed names would.
  fn emit_runtime_assets(pipeline: &mut RelinkPipeline) {
    pipeline.artifact_emitted(
      Some("tidy_tools-0.4.0-py3-none-any.whl"),
      "assets/tidy_tools-0.4.0-1f2e.whl",
      ArtifactPayload::Binary(vec![1]),
    );
    pipeline.artifact_emitted(
      Some("interp.web.asm.js"),
      "assets/interp.web.asm-11aa.js",
      ArtifactPayload::Text("// interpreter".into()),
    );
    pipeline.artifact_emitted(
      Some("interp.asm.wasm"),
      "assets/interp.asm-22bb.wasm",
      ArtifactPayload::Binary(vec![0]),
    );
    pipeline.artifact_emitted(
      Some("interp_stdlib.zip"),
      "assets/interp_stdlib-33cc.zip",
      ArtifactPayload::Binary(vec![2]),
    );
    pipeline.artifact_emitted(
      Some("interp-lock.json"),
      "assets/interp-lock-44dd.json",
      ArtifactPayload::Text(MANIFEST.into()),
    );
  }

  #[test]
  fn full_build_relinks_manifest_and_bootstrap_chunk() {
    let temp = tempdir().expect("failed to create temp dir");
    let mut pipeline = RelinkPipeline::new(temp.path());

    pipeline.build_start(ASSET_NAMES);
    emit_runtime_assets(&mut pipeline);
    pipeline.artifact_emitted(
      None,
      "index-ff00.js",
      ArtifactPayload::Text(
        "boot('interp.web.asm.js','interp.asm.wasm','interp_stdlib.zip','interp-lock.json')".into(),
      ),
    );

    let report = pipeline.build_complete().expect("build should complete");

    assert_eq!(report.patched_chunks, 1);
    assert!(report.unreferenced_roles.is_empty());

    let chunk = fs::read_to_string(temp.path().join("index-ff00.js")).unwrap();
    assert!(chunk.contains("interp.web.asm-11aa.js"));
    assert!(chunk.contains("interp.asm-22bb.wasm"));
    assert!(!chunk.contains("'interp.web.asm.js'"));

    let manifest: Value =
      serde_json::from_str(&fs::read_to_string(&report.manifest_path).unwrap()).unwrap();
    assert_eq!(
      manifest["packages"]["tidy-tools"]["file_name"],
      "tidy_tools-0.4.0-1f2e.whl"
    );
  }

  #[test]
  fn manifest_is_patched_even_without_bootstrap_chunks() {
    let temp = tempdir().expect("failed to create temp dir");
    let mut pipeline = RelinkPipeline::new(temp.path());

    pipeline.build_start(ASSET_NAMES);
    emit_runtime_assets(&mut pipeline);

    let report = pipeline.build_complete().expect("build should complete");

    assert_eq!(report.patched_chunks, 0);
    let manifest: Value =
      serde_json::from_str(&fs::read_to_string(&report.manifest_path).unwrap()).unwrap();
    assert_eq!(
      manifest["packages"]["tidy-tools"]["file_name"],
      "tidy_tools-0.4.0-1f2e.whl"
    );
  }

  #[test]
  fn custom_resolver_shapes_both_patched_surfaces() {
    let temp = tempdir().expect("failed to create temp dir");
    let mut pipeline = RelinkPipeline::new(temp.path()).with_resolver(|role, context| {
      format!("https://cdn.example/assets/{}", basename_resolver(role, context))
    });

    pipeline.build_start(ASSET_NAMES);
    emit_runtime_assets(&mut pipeline);
    pipeline.artifact_emitted(
      None,
      "index.js",
      ArtifactPayload::Text("fetch('interp.asm.wasm');load('interp.web.asm.js')".into()),
    );

    let report = pipeline.build_complete().unwrap();

    let chunk = fs::read_to_string(temp.path().join("index.js")).unwrap();
    assert!(chunk.contains("https://cdn.example/assets/interp.asm-22bb.wasm"));
    assert!(chunk.contains("https://cdn.example/assets/interp.web.asm-11aa.js"));

    let manifest: Value =
      serde_json::from_str(&fs::read_to_string(&report.manifest_path).unwrap()).unwrap();
    assert_eq!(
      manifest["packages"]["tidy-tools"]["file_name"],
      "https://cdn.example/assets/tidy_tools-0.4.0-1f2e.whl"
    );
  }

  #[test]
  fn missing_manifest_entry_fails_the_build() {
    let temp = tempdir().expect("failed to create temp dir");
    let mut pipeline = RelinkPipeline::new(temp.path());

    pipeline.build_start([
      "untracked_pkg-9.9-py3-none-any.whl",
      "interp.web.asm.js",
      "interp.asm.wasm",
      "interp_stdlib.zip",
      "interp-lock.json",
    ]);
    pipeline.artifact_emitted(
      Some("untracked_pkg-9.9-py3-none-any.whl"),
      "assets/untracked_pkg-9.9-0000.whl",
      ArtifactPayload::Binary(vec![7]),
    );
    pipeline.artifact_emitted(
      Some("interp-lock.json"),
      "assets/interp-lock-44dd.json",
      ArtifactPayload::Text(MANIFEST.into()),
    );

    let err = pipeline.build_complete().unwrap_err();
    assert!(err.to_string().contains("untracked-pkg"));
  }

  #[test]
  fn emission_before_classification_collects_nothing() {
    let temp = tempdir().expect("failed to create temp dir");
    let mut pipeline = RelinkPipeline::new(temp.path());

    // Without build_start there is no signature, so even text mentioning the
    // script name is not retained.
    pipeline.artifact_emitted(
      None,
      "index.js",
      ArtifactPayload::Text("load('interp.web.asm.js')".into()),
    );

    assert!(pipeline.collector.is_empty());
  }

  #[test]
  fn script_transform_runs_after_patching() {
    let temp = tempdir().expect("failed to create temp dir");
    let mut pipeline = RelinkPipeline::new(temp.path())
      .with_script_transform(|text| Some(text.replace("location.href", "self.location.href")));

    pipeline.build_start(ASSET_NAMES);
    emit_runtime_assets(&mut pipeline);

    // The bundler materialized the script before the completion phase runs.
    let script_path = temp.path().join("assets/interp.web.asm-11aa.js");
    fs::create_dir_all(script_path.parent().unwrap()).unwrap();
    fs::write(&script_path, "var u = location.href;").unwrap();

    pipeline.build_complete().unwrap();

    assert_eq!(
      fs::read_to_string(&script_path).unwrap(),
      "var u = self.location.href;"
    );
  }

  #[test]
  fn two_builds_in_one_process_stay_independent() {
    let temp_a = tempdir().expect("failed to create temp dir");
    let temp_b = tempdir().expect("failed to create temp dir");

    for temp in [&temp_a, &temp_b] {
      let mut pipeline = RelinkPipeline::new(temp.path());
      pipeline.build_start(ASSET_NAMES);
      emit_runtime_assets(&mut pipeline);
      let report = pipeline.build_complete().unwrap();
      assert!(report.manifest_path.starts_with(temp.path()));
    }
  }
}
