//! Build configuration
//!
//! Loaded from `mdz-build.toml`:
//!
//! ```toml
//! [toolchain]
//! command = "zig"
//! args = ["build", "wasm"]
//!
//! [[bundle]]
//! template = "src/wasm/index.js"
//! artifact = "zig-out/bin/mdz.wasm"
//! output = "dist/index.js"
//! encoding = "base64"
//! declarations = "src/wasm/index.d.ts"
//!
//! [docs]
//! source = "src/mdz/specification.zig"
//! output = "README.md"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use crate::docs::DocsExtractor;
use crate::encoding::PayloadEncoding;
use crate::error::{BundleError, BundleResult};
use crate::splice::MARKER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE: &str = "mdz-build.toml";

fn default_marker() -> String {
    MARKER.to_string()
}

/// External command that produces the module binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolchainConfig {
    /// Command line as shown in logs and errors
    pub fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One template to artifact substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    pub template: PathBuf,
    pub artifact: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub encoding: PayloadEncoding,
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Type declarations copied verbatim next to the output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarations: Option<PathBuf>,
    /// Defaults to the output path with a `.d.ts` extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarations_output: Option<PathBuf>,
    /// Fetch encoding only, defaults to the artifact file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_url: Option<String>,
}

impl BundleConfig {
    pub fn new(
        template: impl Into<PathBuf>,
        artifact: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        encoding: PayloadEncoding,
    ) -> Self {
        Self {
            template: template.into(),
            artifact: artifact.into(),
            output: output.into(),
            encoding,
            marker: default_marker(),
            declarations: None,
            declarations_output: None,
            module_url: None,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_declarations(mut self, declarations: impl Into<PathBuf>) -> Self {
        self.declarations = Some(declarations.into());
        self
    }

    pub fn with_module_url(mut self, url: impl Into<String>) -> Self {
        self.module_url = Some(url.into());
        self
    }

    /// Where the declarations land: explicit path, else `index.js` becomes
    /// `index.d.ts`
    pub fn declarations_target(&self) -> PathBuf {
        if let Some(target) = &self.declarations_output {
            return target.clone();
        }
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string());
        self.output.with_file_name(format!("{stem}.d.ts"))
    }

    /// URL the fetch encoding writes in place of the marker
    pub fn resolved_module_url(&self) -> String {
        match &self.module_url {
            Some(url) => url.clone(),
            None => self
                .artifact
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Specification to README extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub extractor: DocsExtractor,
}

/// Whole build description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,
    #[serde(default, rename = "bundle")]
    pub bundles: Vec<BundleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocsConfig>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl BuildConfig {
    /// Parse from a TOML string; paths stay relative to the working directory
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read, parse and validate a config file
    pub async fn load(path: impl AsRef<Path>) -> BundleResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BundleError::io(path, e))?;

        let mut config = Self::from_toml(&content).map_err(|source| BundleError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config
            .validate()
            .map_err(|errors| BundleError::InvalidConfig(errors.join("; ")))?;

        Ok(config)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Join a config-relative path onto the base directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.bundles.is_empty() && self.docs.is_none() {
            errors.push(
                "Config must contain at least one [[bundle]] or a [docs] section".to_string(),
            );
        }

        if let Some(toolchain) = &self.toolchain {
            if toolchain.command.trim().is_empty() {
                errors.push("Toolchain command is required".to_string());
            }
        }

        for (i, bundle) in self.bundles.iter().enumerate() {
            if bundle.marker.is_empty() {
                errors.push(format!("bundle[{i}]: marker must not be empty"));
            }
            if bundle.template == bundle.output {
                errors.push(format!("bundle[{i}]: output would overwrite the template"));
            }
            if bundle.module_url.is_some() && bundle.encoding != PayloadEncoding::Fetch {
                errors.push(format!(
                    "bundle[{i}]: module_url only applies to the fetch encoding"
                ));
            }
        }

        if let Some(docs) = &self.docs {
            if docs.source == docs.output {
                errors.push("docs: output would overwrite the source".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[toolchain]
command = "zig"
args = ["build", "wasm"]

[[bundle]]
template = "src/lib.js"
artifact = "zig-out/bin/mdz.wasm"
output = "dist/index.js"
encoding = "byte-array"
declarations = "src/lib.d.ts"

[[bundle]]
template = "src/wasm/index.js"
artifact = "zig-out/bin/mdz.wasm"
output = "dist/wasm/index.js"
encoding = "fetch"
module_url = "./mdz.wasm"

[docs]
source = "src/mdz/specification.zig"
output = "README.md"
"#;

    #[test]
    fn test_parse_sample() {
        let config = BuildConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.toolchain.as_ref().unwrap().display(), "zig build wasm");
        assert_eq!(config.bundles.len(), 2);
        assert_eq!(config.bundles[0].encoding, PayloadEncoding::ByteArray);
        assert_eq!(config.bundles[0].marker, MARKER);
        assert_eq!(config.bundles[1].resolved_module_url(), "./mdz.wasm");

        let docs = config.docs.as_ref().unwrap();
        assert_eq!(docs.extractor, DocsExtractor::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let bundle = BundleConfig::new(
            "a.js",
            "out/mdz.wasm",
            "dist/index.js",
            PayloadEncoding::Fetch,
        );
        assert_eq!(bundle.declarations_target(), PathBuf::from("dist/index.d.ts"));
        assert_eq!(bundle.resolved_module_url(), "mdz.wasm");
    }

    #[test]
    fn test_resolve_relative_to_base() {
        let config = BuildConfig::default().with_base_dir("/project");
        assert_eq!(config.resolve(Path::new("dist/x.js")), PathBuf::from("/project/dist/x.js"));
        assert_eq!(config.resolve(Path::new("/abs/x.js")), PathBuf::from("/abs/x.js"));
    }

    #[test]
    fn test_validate_errors() {
        let mut config = BuildConfig::default();
        assert!(config.validate().is_err());

        config.bundles.push(
            BundleConfig::new("same.js", "mdz.wasm", "same.js", PayloadEncoding::Base64)
                .with_marker("")
                .with_module_url("x"),
        );
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let toml = "[[bundle]]\ntemplate = \"a\"\nartifact = \"b\"\n\
                    output = \"c\"\nencoding = \"hex\"\n";
        assert!(BuildConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_to_toml() {
        let config = BuildConfig {
            bundles: vec![BundleConfig::new(
                "src/wasm/index.js",
                "zig-out/bin/mdz.wasm",
                "dist/index.js",
                PayloadEncoding::Fetch,
            )],
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("[[bundle]]"));
        assert!(text.contains("encoding = \"fetch\""));
        assert!(!text.contains("base_dir"));
    }
}
