//! Zonecast console - compose layouts and publish them to display devices.
//!
//! Device records and the media manifest are read from the folders named in
//! the config file; see `zonecast init`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use zonecast_core::composer::{Action, Composer, CompositionRules};
use zonecast_core::config::{ConfigManager, ConfigSection, Settings};
use zonecast_core::logging::init_tracing;
use zonecast_core::models::{Device, LayoutId, MediaReference, ZoneKey};
use zonecast_core::publish::{Dispatcher, PublishOutcome};
use zonecast_core::sources::{
    CatalogCache, DeviceRoster, FileCatalog, FileDocumentStore, Listing,
};

#[derive(Parser)]
#[command(name = "zonecast", version)]
#[command(about = "Compose screen layouts and publish them to display devices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and data folders
    Init {
        /// Only manage devices whose records carry this admin id
        #[arg(long, value_name = "ID")]
        operator: Option<String>,

        /// Turn off snapping manual resizes to the grid
        #[arg(long)]
        no_snap: bool,
    },

    /// List available layouts and their zones
    Layouts,

    /// List target devices
    Devices {
        /// Keep polling the device store every N seconds
        #[arg(short, long, value_name = "SECONDS")]
        watch: Option<u64>,
    },

    /// List playable media from the manifest
    Catalog,

    /// Compose a configuration and publish it
    Publish {
        /// Layout id (fullscreen, 2row, 3row, 2col, 3col)
        #[arg(short, long)]
        layout: LayoutId,

        /// Zone playlist, repeatable
        #[arg(short, long = "zone", value_name = "ZONE=URL[,URL...]")]
        zones: Vec<String>,

        /// Measured zone sizes in on-screen order
        #[arg(short, long, value_delimiter = ',')]
        sizes: Vec<f64>,

        /// Display time for an image, repeatable
        #[arg(long = "duration", value_name = "URL=SECONDS")]
        durations: Vec<String>,

        /// Target device id, repeatable
        #[arg(short, long = "device", required = true)]
        devices: Vec<String>,

        /// Re-publish to failed devices up to this many times
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut manager = ConfigManager::new(&config_path);
    manager
        .load_or_create()
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let settings = manager.settings().clone();
    let level = if cli.verbose {
        settings.logging.level.more_verbose()
    } else {
        settings.logging.level
    };
    let log_dir = settings.logging.file_output.then(|| manager.logs_folder());
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log folder {}", dir.display()))?;
    }
    let _guard = init_tracing(level, log_dir.as_deref());
    tracing::debug!(config = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Init { operator, no_snap } => {
            if let Some(operator) = operator {
                manager.settings_mut().publish.operator_id = Some(operator);
                manager.update_section(ConfigSection::Publish)?;
            }
            if no_snap {
                manager.settings_mut().composer.snap_to_grid = false;
                manager.update_section(ConfigSection::Composer)?;
            }
            manager.ensure_dirs_exist()?;
            println!("Config: {}", manager.path().display());
            println!("Devices: {}", manager.store_dir().display());
            println!("Media manifest: {}", manager.catalog_file().display());
            if let Some(operator) = &manager.settings().publish.operator_id {
                println!("Operator: {}", operator);
            }
        }
        Commands::Layouts => list_layouts(),
        Commands::Devices { watch } => list_devices(&manager, &settings, watch).await?,
        Commands::Catalog => list_catalog(&manager, &settings).await,
        Commands::Publish {
            layout,
            zones,
            sizes,
            durations,
            devices,
            retries,
        } => {
            let request = PublishRequest {
                layout,
                zones,
                sizes,
                durations,
                devices,
                retries,
            };
            publish(&manager, &settings, request).await?;
        }
    }

    Ok(())
}

fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "zonecast")
        .map(|dirs| dirs.config_dir().join("zonecast.toml"))
        .unwrap_or_else(|| PathBuf::from(".config").join("zonecast.toml"))
}

/// Device store for the configured folder, scoped to the operator if one is set.
fn device_store(manager: &ConfigManager, settings: &Settings) -> FileDocumentStore {
    let store = FileDocumentStore::new(manager.store_dir());
    match &settings.publish.operator_id {
        Some(operator) => store.for_operator(operator.as_str()),
        None => store,
    }
}

fn list_layouts() {
    for layout in LayoutId::all() {
        let topology = layout.topology();
        let labels: Vec<&str> = topology.zones().map(|(_, label)| label).collect();
        println!(
            "{:<12} {:<11} {}",
            layout.as_str(),
            topology.direction.to_string(),
            labels.join(", ")
        );
    }
}

fn print_devices(listing: &Listing<Device>) {
    if let Some(notice) = &listing.notice {
        println!("! {}", notice);
    }
    if listing.items.is_empty() {
        println!("No devices");
    }
    for device in &listing.items {
        println!("{:<16} {:<24} {}", device.id, device.name, device.summary());
    }
}

async fn list_devices(
    manager: &ConfigManager,
    settings: &Settings,
    watch: Option<u64>,
) -> Result<()> {
    let roster = Arc::new(DeviceRoster::new(device_store(manager, settings)));
    print_devices(&roster.refresh().await);

    let Some(seconds) = watch else {
        return Ok(());
    };

    let mut updates = roster.subscribe();
    let poller = Arc::clone(&roster).spawn_polling(Duration::from_secs(seconds.max(1)));
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let listing = updates.borrow_and_update().clone();
                println!();
                print_devices(&listing);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for interrupt")?;
                break;
            }
        }
    }
    poller.abort();
    Ok(())
}

async fn list_catalog(manager: &ConfigManager, settings: &Settings) {
    let mut catalog = CatalogCache::new(
        FileCatalog::new(manager.catalog_file()),
        settings.composer.default_image_duration,
    );
    let listing = catalog.items().await;
    if let Some(notice) = &listing.notice {
        println!("! {}", notice);
    }
    for item in &listing.items {
        let duration = item
            .duration
            .map(|secs| format!("{}s", secs))
            .unwrap_or_default();
        println!("{:<6} {:<4} {}", item.kind.as_str(), duration, item.url);
    }
}

struct PublishRequest {
    layout: LayoutId,
    zones: Vec<String>,
    sizes: Vec<f64>,
    durations: Vec<String>,
    devices: Vec<String>,
    retries: u32,
}

/// Parse `left=url1,url2`.
fn parse_zone_arg(arg: &str) -> Result<(ZoneKey, Vec<&str>)> {
    let (zone, urls) = arg
        .split_once('=')
        .with_context(|| format!("Expected ZONE=URL[,URL...], got '{}'", arg))?;
    let zone: ZoneKey = zone.trim().parse()?;
    let urls = urls
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .collect();
    Ok((zone, urls))
}

/// Parse `url=seconds`, splitting at the last `=` so urls may contain one.
fn parse_duration_arg(arg: &str) -> Result<(&str, u32)> {
    let (url, seconds) = arg
        .rsplit_once('=')
        .with_context(|| format!("Expected URL=SECONDS, got '{}'", arg))?;
    let seconds = seconds
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration in '{}'", arg))?;
    Ok((url.trim(), seconds))
}

fn find_media(media: &[MediaReference], url: &str) -> Result<MediaReference> {
    media
        .iter()
        .find(|item| item.url == url)
        .cloned()
        .with_context(|| format!("'{}' is not in the media catalog", url))
}

async fn publish(
    manager: &ConfigManager,
    settings: &Settings,
    request: PublishRequest,
) -> Result<()> {
    let dispatcher = Dispatcher::new(device_store(manager, settings))
        .with_field(settings.publish.field.clone());
    let mut composer =
        Composer::with_rules(dispatcher, CompositionRules::from(&settings.composer));

    // Layout
    composer.apply(Action::SetLayout(request.layout))?;
    if !request.sizes.is_empty() {
        composer.apply(Action::SetZoneSizes {
            raw_sizes: request.sizes,
            manual: true,
        })?;
    }
    composer.next()?;

    // Content
    let mut catalog = CatalogCache::new(
        FileCatalog::new(manager.catalog_file()),
        settings.composer.default_image_duration,
    );
    let media = catalog.items().await;
    if let Some(notice) = &media.notice {
        tracing::warn!("{}", notice);
    }
    for arg in &request.zones {
        let (zone, urls) = parse_zone_arg(arg)?;
        let items = urls
            .into_iter()
            .map(|url| find_media(&media.items, url))
            .collect::<Result<Vec<_>>>()?;
        composer.apply(Action::SetActiveZone(zone))?;
        composer.apply(Action::AssignZoneItems { zone, items })?;
    }
    for arg in &request.durations {
        let (url, seconds) = parse_duration_arg(arg)?;
        let zones: Vec<ZoneKey> = composer
            .draft()
            .config
            .zones
            .iter()
            .flatten()
            .filter(|(_, zone)| zone.contains_url(url))
            .map(|(key, _)| *key)
            .collect();
        if zones.is_empty() {
            bail!("'{}' is not assigned to any zone", url);
        }
        for zone in zones {
            composer.apply(Action::SetItemDuration {
                zone,
                url: url.to_string(),
                seconds,
            })?;
        }
    }
    composer.next()?;

    // Targets
    composer.apply(Action::SelectTargets(request.devices.into_iter().collect()))?;
    println!("{}", composer.progress());

    let mut outcome = composer
        .dispatch(Action::Submit)
        .await?
        .context("Submit produced no publish outcome")?;
    let mut attempt = 0;
    while attempt < request.retries && !composer.last_failed().is_empty() {
        attempt += 1;
        tracing::info!(attempt, "Retrying failed devices");
        outcome = composer.retry_failed().await?;
    }

    report(&outcome)
}

fn report(outcome: &PublishOutcome) -> Result<()> {
    for device_id in outcome.succeeded() {
        println!("  ok    {}", device_id);
    }
    for failure in outcome.failures() {
        println!("  fail  {}: {}", failure.device_id, failure.error);
    }
    match outcome {
        PublishOutcome::Published { .. } => {
            println!("{}", outcome.summary());
            Ok(())
        }
        _ => bail!("{}", outcome.summary()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_args_split_urls() {
        let (zone, urls) = parse_zone_arg("top=https://cdn/a.png, https://cdn/b.mp4").unwrap();
        assert_eq!(zone, ZoneKey::Top);
        assert_eq!(urls, vec!["https://cdn/a.png", "https://cdn/b.mp4"]);
        assert!(parse_zone_arg("sideways=a").is_err());
        assert!(parse_zone_arg("top").is_err());
    }

    #[test]
    fn duration_args_split_at_last_equals() {
        assert_eq!(
            parse_duration_arg("https://cdn/a.png?v=2=12").unwrap(),
            ("https://cdn/a.png?v=2", 12)
        );
        assert!(parse_duration_arg("https://cdn/a.png=soon").is_err());
    }

    #[test]
    fn cli_parses_init_flags() {
        let cli = Cli::try_parse_from(["zonecast", "init", "--operator", "op1", "--no-snap"]).unwrap();
        match cli.command {
            Commands::Init { operator, no_snap } => {
                assert_eq!(operator.as_deref(), Some("op1"));
                assert!(no_snap);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn device_store_follows_operator_setting() {
        let manager = ConfigManager::new("zonecast.toml");
        let mut settings = Settings::default();
        assert_eq!(device_store(&manager, &settings).operator(), None);

        settings.publish.operator_id = Some("op1".to_string());
        assert_eq!(device_store(&manager, &settings).operator(), Some("op1"));
    }

    #[test]
    fn cli_parses_publish() {
        let cli = Cli::try_parse_from([
            "zonecast", "publish", "--layout", "2col", "--zone", "left=a", "--sizes", "60,40",
            "--device", "D1",
        ])
        .unwrap();
        match cli.command {
            Commands::Publish {
                layout, sizes, devices, ..
            } => {
                assert_eq!(layout, LayoutId::TwoColumn);
                assert_eq!(sizes, vec![60.0, 40.0]);
                assert_eq!(devices, vec!["D1".to_string()]);
            }
            _ => panic!("expected publish"),
        }
    }
}
