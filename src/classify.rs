//! Classification of raw runtime asset file names into semantic roles.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::models::AssetRole;

const DEFAULT_RULES_FILE: &str = "relink.rules.json";

/// Naming rules the classifier matches candidate file names against.
///
/// Rules are declared explicitly at construction instead of being hard-wired,
/// so hosts shipping a runtime with a different naming convention can adjust
/// them without forking the pipeline. Defaults follow the conventional
/// runtime distribution layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
  /// Suffix identifying an extension-package archive.
  pub package_suffix: String,
  /// Substring identifying the interpreter's web bootstrap script.
  pub script_token: String,
  /// Substring identifying the compiled WASM module.
  pub wasm_token: String,
  /// Substring identifying the stdlib filesystem image.
  pub stdlib_token: String,
  /// Substrings identifying the lock manifest.
  pub manifest_tokens: Vec<String>,
}

impl Default for ClassifierRules {
  fn default() -> Self {
    Self {
      package_suffix: ".whl".into(),
      script_token: "web.asm".into(),
      wasm_token: "wasm".into(),
      stdlib_token: "zip".into(),
      manifest_tokens: vec!["lock".into(), "manifest".into()],
    }
  }
}

impl ClassifierRules {
  /// Attempt to load rules from `relink.rules.json` in the given directory,
  /// falling back to the defaults when the file is absent or malformed.
  pub fn discover(dir: &Path) -> Self {
    Self::from_path(&dir.join(DEFAULT_RULES_FILE)).unwrap_or_default()
  }

  /// Read rules from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Assign a role to a single file name, most specific predicate first.
  ///
  /// Each name matches at most one role; `None` means the file is not a
  /// runtime asset this pipeline knows about.
  pub fn role_for(&self, file_name: &str) -> Option<AssetRole> {
    if file_name.ends_with(&self.package_suffix) {
      return Some(AssetRole::Package(package_name(file_name)));
    }
    if file_name.contains(&self.script_token) {
      return Some(AssetRole::InterpreterScript);
    }
    if file_name.contains(&self.wasm_token) {
      return Some(AssetRole::WasmBinary);
    }
    if file_name.contains(&self.stdlib_token) {
      return Some(AssetRole::FilesystemImage);
    }
    if self.manifest_tokens.iter().any(|token| file_name.contains(token)) {
      return Some(AssetRole::ManifestDescriptor);
    }
    None
  }

  /// Classify an ordered list of file names.
  pub fn classify<I, S>(&self, file_names: I) -> Classification
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut entries = Vec::new();
    let mut unrecognized = Vec::new();

    for file_name in file_names {
      let file_name = file_name.as_ref();
      match self.role_for(file_name) {
        Some(role) => entries.push((role, file_name.to_string())),
        None => unrecognized.push(file_name.to_string()),
      }
    }

    Classification { entries, unrecognized }
  }
}

/// Outcome of classifying the raw asset directory listing.
#[derive(Debug, Default)]
pub struct Classification {
  /// Role and original file name for every recognized asset, in input order.
  pub entries: Vec<(AssetRole, String)>,
  /// File names no predicate matched; excluded from the catalog.
  pub unrecognized: Vec<String>,
}

/// Package name from an archive file name: the segment before the first `-`,
/// with `_` normalized to `-` to match manifest entry naming.
fn package_name(file_name: &str) -> String {
  file_name
    .split('-')
    .next()
    .unwrap_or(file_name)
    .replace('_', "-")
}
