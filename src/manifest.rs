use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use derive_more::Display;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::errors::AppError;

/// A manifest source, resolved once from the file extension. Plain JSON files
/// are read as text; script modules are evaluated and their default export is
/// serialized to JSON. Evaluating a script runs arbitrary code from disk, which
/// is an accepted trust boundary of this tool.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ManifestSource {
    #[display("Json ({})", _0.display())]
    Json(PathBuf),

    #[display("Script ({})", _0.display())]
    Script(PathBuf),
}

impl ManifestSource {
    pub fn from_path(path: &Path) -> Result<ManifestSource, AppError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

        match extension {
            "json" => Ok(ManifestSource::Json(path.to_path_buf())),
            "ts" | "tsx" => Ok(ManifestSource::Script(path.to_path_buf())),
            _ => Err(AppError::UnsupportedManifestFormat(path.display().to_string())),
        }
    }

    /// Load the manifest as a JSON string. Read fresh on every call, no caching.
    pub fn load(&self, interpolate_env: bool) -> Result<String, AppError> {
        match self {
            ManifestSource::Json(path) => {
                let text = fs::read_to_string(path)?;

                if interpolate_env {
                    Ok(interpolate_env_placeholders(&text))
                } else {
                    Ok(text)
                }
            },
            ManifestSource::Script(path) => load_script_manifest(path),
        }
    }
}

/// Replace every `${NAME}` placeholder with the value of the environment
/// variable `NAME`. Unset variables substitute the empty string.
fn interpolate_env_placeholders(text: &str) -> String {
    lazy_static! {
        static ref PLACEHOLDER: Regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    }

    PLACEHOLDER.replace_all(text, |captures: &Captures| {
        env::var(&captures[1]).unwrap_or_default()
    }).to_string()
}

/// Evaluate a script-module manifest with the Node.js runtime and capture its
/// default export as JSON text from stdout.
fn load_script_manifest(path: &Path) -> Result<String, AppError> {
    // The module path travels through argv, not through the generated source
    const EVAL_DEFAULT_EXPORT: &str =
        "import(require('url').pathToFileURL(process.argv[1]).href)\
         .then(m => process.stdout.write(JSON.stringify(m.default)))";

    let absolute = path.canonicalize()?;

    let output = Command::new("node")
        .arg("-e")
        .arg(EVAL_DEFAULT_EXPORT)
        .arg(&absolute)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::ManifestScriptError(format!("{}: {}", path.display(), stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    // The export must serialize to a JSON object, anything else is a broken manifest module
    let parsed: Result<serde_json::Value, _> = serde_json::from_str(&stdout);
    match parsed {
        Ok(value) if value.is_object() => Ok(stdout),
        _ => Err(AppError::ManifestScriptError(format!(
            "{}: default export did not serialize to a JSON object", path.display(),
        ))),
    }
}
