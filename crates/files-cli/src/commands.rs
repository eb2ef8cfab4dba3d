use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use files_server::{BackendKind, FilesServer, ServerConfig};
use files_store::{InMemoryObjectStore, ObjectStore};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Config(args) => cmd_config(args),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.source, files_server::process_env())?;
    let store = build_store(&config).await?;
    tracing::info!(
        backend = %config.backend,
        bucket = %config.bucket_name,
        "object store ready"
    );
    println!(
        "{} Serving bucket {} on {}",
        "✓".green().bold(),
        config.bucket_name.yellow(),
        config.bind_addr.to_string().bold()
    );
    FilesServer::new(store, config).serve().await?;
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.source, files_server::process_env())?;
    println!("{}", render_config(&config, args.format)?);
    Ok(())
}

/// Resolve the effective configuration: defaults, then the TOML file, then
/// `vars`, then command-line flags. The result is validated.
fn resolve_config<I>(source: &ConfigSource, vars: I) -> anyhow::Result<ServerConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let base = match &source.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("reading config file {}", path.display()))?,
        None => ServerConfig::default(),
    };
    let mut config = base.apply_env_vars(vars)?;
    if let Some(bind) = source.bind {
        config.bind_addr = bind;
    }
    if let Some(bucket) = &source.bucket {
        config.bucket_name = bucket.clone();
    }
    if let Some(backend) = source.backend {
        config.backend = backend;
    }
    config.validate()?;
    Ok(config)
}

async fn build_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match config.backend {
        BackendKind::Memory => {
            let store = InMemoryObjectStore::new();
            store.create_bucket(config.bucket_name.clone());
            Ok(Arc::new(store))
        }
        BackendKind::S3 => s3_store(config).await,
    }
}

#[cfg(feature = "s3")]
async fn s3_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let settings = config.s3.clone().unwrap_or_default();
    let store = match settings.endpoint_url {
        Some(url) => {
            let region = settings.region.unwrap_or_else(|| "us-east-1".to_string());
            files_store::S3ObjectStore::with_endpoint(url, region).await
        }
        None => files_store::S3ObjectStore::from_env().await,
    };
    Ok(Arc::new(store))
}

#[cfg(not(feature = "s3"))]
async fn s3_store(_config: &ServerConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    anyhow::bail!("the s3 backend requires building files-api with `--features s3`")
}

fn render_config(config: &ServerConfig, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Text => {
            let body = toml::to_string_pretty(config)?;
            Ok(format!("{}\n{}", "# Files API configuration".bold(), body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source() -> ConfigSource {
        ConfigSource::default()
    }

    fn bucket_env(name: &str) -> Vec<(String, String)> {
        vec![("S3_BUCKET_NAME".to_string(), name.to_string())]
    }

    #[test]
    fn bucket_from_env() {
        let config = resolve_config(&source(), bucket_env("env-bucket")).unwrap();
        assert_eq!(config.bucket_name, "env-bucket");
        assert_eq!(config.backend, BackendKind::Memory);
    }

    #[test]
    fn missing_bucket_fails() {
        let err = resolve_config(&source(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET_NAME"));
    }

    #[test]
    fn flags_override_env_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bucket_name = \"file-bucket\"\nmax_page_size = 25").unwrap();

        let src = ConfigSource {
            config: Some(file.path().to_path_buf()),
            bucket: Some("flag-bucket".into()),
            bind: Some("0.0.0.0:7000".parse().unwrap()),
            backend: None,
        };
        let config = resolve_config(&src, bucket_env("env-bucket")).unwrap();
        assert_eq!(config.bucket_name, "flag-bucket");
        assert_eq!(config.bind_addr.port(), 7000);
        assert_eq!(config.max_page_size, 25);
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bucket_name = \"file-bucket\"").unwrap();
        let src = ConfigSource {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = resolve_config(&src, bucket_env("env-bucket")).unwrap();
        assert_eq!(config.bucket_name, "env-bucket");
    }

    #[test]
    fn missing_config_file_fails() {
        let src = ConfigSource {
            config: Some("/nonexistent/files-api.toml".into()),
            ..Default::default()
        };
        let err = resolve_config(&src, bucket_env("b")).unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }

    #[tokio::test]
    async fn memory_store_has_bucket() {
        let config = resolve_config(&source(), bucket_env("mem")).unwrap();
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        let out = store.list_objects("mem", "", 10, None).await.unwrap();
        assert!(out.objects.is_empty());
    }

    #[cfg(not(feature = "s3"))]
    #[tokio::test]
    async fn s3_backend_needs_feature() {
        let src = ConfigSource {
            backend: Some(BackendKind::S3),
            ..Default::default()
        };
        let config = resolve_config(&src, bucket_env("b")).unwrap();
        assert!(build_store(&config).await.is_err());
    }

    #[test]
    fn render_json_and_text() {
        let config = resolve_config(&source(), bucket_env("shown")).unwrap();
        let json = render_config(&config, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["bucket_name"], "shown");
        assert_eq!(value["backend"], "memory");

        let text = render_config(&config, OutputFormat::Text).unwrap();
        assert!(text.contains("bucket_name = \"shown\""));
    }
}
