//! Build pipeline: toolchain, splice each bundle, extract docs

use crate::config::{BuildConfig, BundleConfig, DocsConfig, ToolchainConfig};
use crate::encoding::{base64_literal, byte_array_literal, PayloadEncoding};
use crate::error::{BundleError, BundleResult};
use crate::splice::splice;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// What one bundle produced
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    pub output: PathBuf,
    pub encoding: PayloadEncoding,
    /// blake3 of the artifact, hex
    pub artifact_hash: String,
    pub artifact_bytes: usize,
    /// Length of the text written in place of the marker
    pub payload_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declarations: Option<PathBuf>,
    /// Fetch encoding copies the artifact here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_module: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub toolchain_ran: bool,
    pub bundles: Vec<BundleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<PathBuf>,
}

pub struct BuildPipeline {
    config: BuildConfig,
}

impl BuildPipeline {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run every configured step in order, stopping at the first failure
    pub async fn run(&self) -> BundleResult<BuildReport> {
        let mut report = BuildReport::default();

        if let Some(toolchain) = &self.config.toolchain {
            run_toolchain(toolchain, &self.config.base_dir).await?;
            report.toolchain_ran = true;
        }

        for bundle in &self.config.bundles {
            report.bundles.push(self.bundle(bundle).await?);
        }

        if let Some(docs) = &self.config.docs {
            report.docs = Some(self.docs(docs).await?);
        }

        tracing::info!(
            bundles = report.bundles.len(),
            docs = report.docs.is_some(),
            "Build complete"
        );
        Ok(report)
    }

    /// Splice one artifact into one template
    pub async fn bundle(&self, bundle: &BundleConfig) -> BundleResult<BundleReport> {
        let template_path = self.config.resolve(&bundle.template);
        let artifact_path = self.config.resolve(&bundle.artifact);
        let output_path = self.config.resolve(&bundle.output);

        let template = read(&template_path).await?;
        let artifact = read(&artifact_path).await?;
        let artifact_hash = blake3::hash(&artifact).to_hex().to_string();

        let payload = match bundle.encoding {
            PayloadEncoding::ByteArray => byte_array_literal(&artifact),
            PayloadEncoding::Base64 => base64_literal(&artifact),
            PayloadEncoding::Fetch => bundle.resolved_module_url(),
        };

        let generated = splice(&template, &bundle.marker, &payload)?;
        write(&output_path, &generated).await?;

        tracing::info!(
            output = %output_path.display(),
            encoding = %bundle.encoding,
            artifact_bytes = artifact.len(),
            hash = %&artifact_hash[..16],
            "Wrote bundle"
        );

        let shipped_module = if bundle.encoding.embeds_binary() {
            None
        } else {
            let target = shipped_module_path(&output_path, &artifact_path)?;
            write(&target, &artifact).await?;
            tracing::debug!(path = %target.display(), "Copied module for fetch loading");
            Some(target)
        };

        let declarations = match &bundle.declarations {
            Some(source) => {
                let source = self.config.resolve(source);
                let target = self.config.resolve(&bundle.declarations_target());
                copy(&source, &target).await?;
                tracing::debug!(path = %target.display(), "Copied declarations");
                Some(target)
            }
            None => None,
        };

        Ok(BundleReport {
            output: output_path,
            encoding: bundle.encoding,
            artifact_hash,
            artifact_bytes: artifact.len(),
            payload_len: payload.len(),
            declarations,
            shipped_module,
        })
    }

    /// Write the README extracted from the specification source
    pub async fn docs(&self, docs: &DocsConfig) -> BundleResult<PathBuf> {
        let source_path = self.config.resolve(&docs.source);
        let output_path = self.config.resolve(&docs.output);

        let source = read_to_string(&source_path).await?;
        let readme = docs.extractor.extract(&source);
        write(&output_path, readme.as_bytes()).await?;

        tracing::info!(output = %output_path.display(), "Wrote docs");
        Ok(output_path)
    }
}

/// Run the toolchain in `cwd`; a non-zero exit fails the build
pub async fn run_toolchain(toolchain: &ToolchainConfig, cwd: &Path) -> BundleResult<()> {
    let command_line = toolchain.display();
    tracing::info!(command = %command_line, "Running toolchain");

    let mut command = Command::new(&toolchain.command);
    command.args(&toolchain.args);
    if !cwd.as_os_str().is_empty() {
        command.current_dir(cwd);
    }

    let output = command
        .output()
        .await
        .map_err(|e| BundleError::Toolchain {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BundleError::Toolchain {
            command: command_line,
            message: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(())
}

fn shipped_module_path(output: &Path, artifact: &Path) -> BundleResult<PathBuf> {
    let name = artifact.file_name().ok_or_else(|| {
        BundleError::InvalidConfig(format!("artifact {} has no file name", artifact.display()))
    })?;
    Ok(output.with_file_name(name))
}

async fn read(path: &Path) -> BundleResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| BundleError::io(path, e))
}

async fn read_to_string(path: &Path) -> BundleResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BundleError::io(path, e))
}

async fn write(path: &Path, contents: &[u8]) -> BundleResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BundleError::io(parent, e))?;
        }
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| BundleError::io(path, e))
}

async fn copy(from: &Path, to: &Path) -> BundleResult<()> {
    let contents = read(from).await?;
    write(to, &contents).await
}
