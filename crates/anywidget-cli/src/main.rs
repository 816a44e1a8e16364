//! anywidget command line: edit the widget list and run a headless host.

use anyhow::{Context, Result, bail};
use anywidget_core::storage::default_store_path;
use anywidget_core::{
    FileStore, HostConfig, LoaderKind, MarkupLoader, Preferences, SystemClock, WidgetConfig, WidgetHost,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// Manage and host desktop widgets
#[derive(Parser)]
#[command(name = "anywidget")]
#[command(version)]
#[command(about = "Manage and host desktop widgets", long_about = None)]
struct Cli {
    /// Widget store file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Host settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every widget record
    List,
    /// Print one record as JSON
    Show { id: String },
    /// Add a widget built from the default template
    Create { name: String },
    /// Remove a widget record
    Delete { id: String },
    /// Show a widget
    Enable { id: String },
    /// Hide a widget without deleting it
    Disable { id: String },
    /// Move or resize a widget
    SetGeometry {
        id: String,
        #[arg(long)]
        x: Option<i64>,
        #[arg(long)]
        y: Option<i64>,
        #[arg(long)]
        width: Option<i64>,
        #[arg(long)]
        height: Option<i64>,
    },
    /// Replace a widget's content source
    SetSource {
        id: String,
        source: String,
        /// Treat SOURCE as a file path
        #[arg(long)]
        file: bool,
    },
    /// Run a headless host against the store and log what it does
    Watch {
        /// Tick interval in milliseconds
        #[arg(long, default_value_t = 16)]
        interval_ms: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let host_config = load_host_config(cli.config.as_deref())?;
    let path = store_path(cli.store, &host_config)?;
    log::debug!("Using store {}", path.display());
    run(cli.command, &path, &host_config)
}

fn load_host_config(path: Option<&Path>) -> Result<HostConfig> {
    match path {
        Some(path) => HostConfig::load(path).with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let default = default_store_path()?.with_file_name("host.toml");
            Ok(HostConfig::load_or_default(&default)?)
        }
    }
}

/// `--store` wins over the settings file, which wins over the default.
fn store_path(flag: Option<PathBuf>, host_config: &HostConfig) -> Result<PathBuf> {
    if let Some(path) = flag.or_else(|| host_config.store_path.clone()) {
        return Ok(path);
    }
    Ok(default_store_path()?)
}

fn run(command: Commands, path: &Path, host_config: &HostConfig) -> Result<()> {
    let store = Rc::new(FileStore::new(path.to_path_buf())?);
    let prefs = Preferences::new(store);

    match command {
        Commands::List => {
            let widgets = prefs.widgets();
            if widgets.is_empty() {
                println!("No widgets in {}", path.display());
            }
            for w in widgets {
                println!("{}", summary(&w));
            }
        }
        Commands::Show { id } => {
            let config = find(&prefs, &id)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Create { name } => {
            let config = prefs.create_widget(&name)?;
            println!("{}", config.id);
        }
        Commands::Delete { id } => {
            if !prefs.delete_widget(&id)? {
                bail!("No widget with id {}", id);
            }
        }
        Commands::Enable { id } => set_enabled(&prefs, &id, true)?,
        Commands::Disable { id } => set_enabled(&prefs, &id, false)?,
        Commands::SetGeometry {
            id,
            x,
            y,
            width,
            height,
        } => {
            let mut config = find(&prefs, &id)?;
            apply_geometry(&mut config, x, y, width, height);
            prefs.save_widget(&config)?;
            println!("{}", summary(&config));
        }
        Commands::SetSource { id, source, file } => {
            let mut config = find(&prefs, &id)?;
            config.loader_type = if file { LoaderKind::File } else { LoaderKind::Code };
            config.loader_source = source;
            prefs.save_widget(&config)?;
        }
        Commands::Watch { interval_ms } => watch(path, host_config, Duration::from_millis(interval_ms))?,
    }
    Ok(())
}

fn find(prefs: &Preferences, id: &str) -> Result<WidgetConfig> {
    prefs.widget(id).with_context(|| format!("No widget with id {}", id))
}

fn set_enabled(prefs: &Preferences, id: &str, enabled: bool) -> Result<()> {
    if !prefs.set_enabled(id, enabled)? {
        bail!("No widget with id {}", id);
    }
    Ok(())
}

fn apply_geometry(config: &mut WidgetConfig, x: Option<i64>, y: Option<i64>, width: Option<i64>, height: Option<i64>) {
    config.x = x.unwrap_or(config.x);
    config.y = y.unwrap_or(config.y);
    config.width = width.unwrap_or(config.width);
    config.height = height.unwrap_or(config.height);
}

fn summary(config: &WidgetConfig) -> String {
    format!(
        "{}  {:<8} {:<20} {}x{} at {},{}",
        config.id,
        if config.enabled { "enabled" } else { "disabled" },
        config.name,
        config.width,
        config.height,
        config.x,
        config.y,
    )
}

fn watch(path: &Path, host_config: &HostConfig, interval: Duration) -> Result<()> {
    let mut store = FileStore::new(path.to_path_buf())?;
    store.watch()?;

    let mut host = WidgetHost::new(Rc::new(store), Rc::new(MarkupLoader), Rc::new(SystemClock), host_config);
    let initial = host.enable();
    log::info!("Hosting {} widgets from {}", initial.created.len(), path.display());

    loop {
        let report = host.tick();
        if report.external_change {
            log::info!("Store changed on disk");
        }
        if report.timed_out {
            log::warn!("Interaction session timed out");
        }
        if let Some(refresh) = report.refreshed {
            log::info!(
                "Refreshed: created {:?}, updated {:?}, destroyed {:?}",
                refresh.created,
                refresh.updated,
                refresh.destroyed
            );
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_flag_wins() {
        let host_config = HostConfig {
            store_path: Some(PathBuf::from("/from/config.json")),
            ..HostConfig::default()
        };
        let flag = Some(PathBuf::from("/from/flag.json"));
        assert_eq!(store_path(flag, &host_config).unwrap(), PathBuf::from("/from/flag.json"));
        assert_eq!(store_path(None, &host_config).unwrap(), PathBuf::from("/from/config.json"));
    }

    #[test]
    fn test_apply_geometry_keeps_unset() {
        let mut config = WidgetConfig::new("a");
        apply_geometry(&mut config, Some(5), None, Some(300), None);
        assert_eq!((config.x, config.y, config.width, config.height), (5, 100, 300, 200));
    }

    #[test]
    fn test_create_then_disable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        let host_config = HostConfig::default();

        run(Commands::Create { name: "Clock".to_string() }, &path, &host_config).unwrap();
        let prefs = Preferences::new(Rc::new(FileStore::new(path.clone()).unwrap()));
        let id = prefs.widgets()[0].id.clone();

        run(Commands::Disable { id: id.clone() }, &path, &host_config).unwrap();
        assert!(!prefs.widget(&id).unwrap().enabled);

        assert!(run(Commands::Delete { id: "missing".to_string() }, &path, &host_config).is_err());
    }
}
