mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use mdz_bundler::{
    BuildConfig, BuildPipeline, BuildReport, BundleConfig, DocsConfig, DocsExtractor,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mdz_build=info".parse()?)
                .add_directive("mdz_bundler=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let report = match run(cli.command).await {
        Ok(report) => report,
        Err(e) => {
            error!("Build failed: {:#}", e);
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn run(command: Commands) -> Result<BuildReport> {
    match command {
        Commands::Build { config } => {
            let config = BuildConfig::load(&config)
                .await
                .with_context(|| format!("loading {}", config.display()))?;
            info!(
                bundles = config.bundles.len(),
                toolchain = config.toolchain.is_some(),
                "Loaded build config"
            );
            Ok(BuildPipeline::new(config).run().await?)
        }
        Commands::Splice {
            template,
            artifact,
            output,
            encoding,
            marker,
            declarations,
            module_url,
        } => {
            let mut bundle =
                BundleConfig::new(template, artifact, output, encoding).with_marker(marker);
            bundle.declarations = declarations;
            bundle.module_url = module_url;

            let config = BuildConfig {
                bundles: vec![bundle],
                ..Default::default()
            };
            config
                .validate()
                .map_err(|errors| anyhow::anyhow!(errors.join("; ")))?;

            Ok(BuildPipeline::new(config).run().await?)
        }
        Commands::Docs { source, output } => {
            let config = BuildConfig {
                docs: Some(DocsConfig {
                    source,
                    output,
                    extractor: DocsExtractor::default(),
                }),
                ..Default::default()
            };
            Ok(BuildPipeline::new(config).run().await?)
        }
    }
}
