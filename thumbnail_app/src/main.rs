//! MTL inspection tool
//!
//! Loads an MTL file from disk or a URL, resolves every material, waits for
//! the diffuse textures to arrive and logs what a renderer would receive.
//!
//! ```text
//! mtl_inspect <path-or-url> [--config loader.toml]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use mtl_loader::foundation::logging;
use mtl_loader::prelude::*;

/// Renderer stand-in that describes what it is handed
struct ReportSink;

impl RenderSink for ReportSink {
    type Material = String;
    type Texture = String;

    fn create_texture(&mut self, image: &ImageData, wrap_s: WrapMode, wrap_t: WrapMode) -> String {
        format!("{}x{} ({:?}/{:?})", image.width, image.height, wrap_s, wrap_t)
    }

    fn create_material(&mut self, material: &ResolvedMaterial, map: Option<String>) -> String {
        let c = material.color;
        format!(
            "'{}' color ({:.3}, {:.3}, {:.3}) opacity {:.2}{} side {:?} texture {}",
            material.name,
            c.x, c.y, c.z,
            material.opacity,
            if material.transparent { " (transparent)" } else { "" },
            material.side,
            map.as_deref().unwrap_or("none"),
        )
    }
}

/// Inspect the materials of an MTL file
#[derive(Debug, Parser)]
#[command(name = "mtl_inspect", version, about)]
struct Args {
    /// MTL file path or `http(s)://` URL
    source: String,

    /// Loader configuration (`.toml` or `.ron`)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

async fn inspect(args: Args, config: LoaderConfig) -> Result<(), AssetError> {
    // Worst case: every texture burns through all of its retries
    let deadline = config.fetch.retry_delay() * config.fetch.max_attempts() + Duration::from_secs(30);
    let loader = MtlLoader::new(config);

    let mut creator = if args.source.starts_with("http://") || args.source.starts_with("https://") {
        loader.load(&args.source).await?
    } else {
        loader.load_file(&args.source)?
    };

    log::info!("{} materials in {}", creator.len(), args.source);
    creator.preload();

    let names: Vec<String> = creator.names().map(str::to_string).collect();
    let started = tokio::time::Instant::now();
    while names.iter().any(|name| matches!(creator.entry(name), Some(MaterialEntry::Pending(_)))) {
        if started.elapsed() > deadline {
            log::warn!("Gave up waiting for textures after {:?}", deadline);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    for (index, report) in creator.realize(&mut ReportSink).into_iter().enumerate() {
        log::info!("[{}] {}", index, report);
    }

    for name in &names {
        if let Some(texture) = creator.get(name).and_then(|material| material.map.clone()) {
            if texture.is_failed() {
                log::warn!("'{}': texture {} failed", name, texture.url());
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            LoaderConfig::load_from_file(path)?
        }
        None => LoaderConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(inspect(args, config))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_only() {
        let args = Args::try_parse_from(["mtl_inspect", "model.mtl"]).unwrap();
        assert_eq!(args.source, "model.mtl");
        assert!(args.config.is_none());
    }

    #[test]
    fn test_config_flag() {
        let args = Args::try_parse_from(["mtl_inspect", "--config", "loader.toml", "https://t1.rbxcdn.com/x"]).unwrap();
        assert_eq!(args.source, "https://t1.rbxcdn.com/x");
        assert_eq!(args.config, Some(PathBuf::from("loader.toml")));

        let args = Args::try_parse_from(["mtl_inspect", "model.mtl", "-c", "loader.ron"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("loader.ron")));
    }

    #[test]
    fn test_missing_source_is_rejected() {
        assert!(Args::try_parse_from(["mtl_inspect"]).is_err());
        assert!(Args::try_parse_from(["mtl_inspect", "a.mtl", "b.mtl"]).is_err());
    }
}
