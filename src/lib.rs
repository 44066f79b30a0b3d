//! Cabin Auto-Mark - 客舱检查照片记录工具
//!
//! Command-line host over `cabin-mark-core`.

pub mod cli;
pub mod commands;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use cabin_mark_core::{
    AppPathProvider, CabinMarkCore, LoggingEventSink, PathProvider, PhotoProjection, SharedPathProvider,
};

use cli::{Cli, Commands, InspectAction};

/// Install the global subscriber: stderr plus a daily log file in
/// `logs_dir`. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init_logging(logs_dir: &Path) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = std::fs::create_dir_all(logs_dir)
        .map(|_| tracing_appender::rolling::daily(logs_dir, "cabin-mark.log"))
        .map(tracing_appender::non_blocking);

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match file {
        Ok((writer, guard)) => {
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(filter()).with(stderr_layer).init();
            tracing::warn!("File logging disabled: {}", e);
            None
        }
    }
}

/// Run one CLI invocation.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths: SharedPathProvider = match &cli.data_dir {
        Some(dir) => Arc::new(AppPathProvider::with_base_dir(dir.clone())),
        None => Arc::new(AppPathProvider::new()),
    };
    let _log_guard = init_logging(&paths.logs_dir());

    tracing::info!(data_dir = %paths.app_data_dir().display(), "Cabin Auto-Mark starting");

    let core = Arc::new(
        CabinMarkCore::open(Arc::clone(&paths), Arc::new(LoggingEventSink)).context("cannot open application data")?,
    );

    let result = dispatch(&core, cli.command, cli.json).await;
    core.close();
    result
}

async fn dispatch(core: &Arc<CabinMarkCore>, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Import { aircraft, door, file } => {
            let photo = commands::import_photo(core, &aircraft, &door, &file).await?;
            print_one(json, &photo, || format!("Imported {} ({} {})", photo.id, photo.aircraft_type, photo.door_id))?;
        }

        Commands::Retake { id, file } => {
            let photo = commands::retake_photo(core, &id, &file).await?;
            print_one(json, &photo, || format!("Retook {} at {}", photo.id, photo.timestamp))?;
        }

        Commands::List { aircraft } => {
            let photos = commands::list_photos(core, aircraft.as_deref()).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&photos.iter().map(ListedPhoto::from).collect::<Vec<_>>())?);
            } else {
                for photo in &photos {
                    let label = core
                        .layouts()
                        .aircraft(&photo.aircraft_type)
                        .map(|a| a.door_label(&photo.door_id).to_string())
                        .unwrap_or_else(|| photo.door_id.clone());
                    println!(
                        "{}  {:<8} {:<22} {}  thumb {} B",
                        photo.id,
                        photo.aircraft_type,
                        label,
                        photo.timestamp,
                        photo.thumbnail.len()
                    );
                }
                println!("{} photo(s)", photos.len());
            }
        }

        Commands::Show { id, out } => {
            let path = commands::save_full_image(core, &id, out).await?;
            println!("{}", path.display());
        }

        Commands::Delete { ids } => {
            commands::delete_photos(core, &ids).await?;
            println!("Deleted {} photo(s)", ids.len());
        }

        Commands::Clear { aircraft } => {
            let deleted = commands::clear_aircraft(core, &aircraft).await?;
            println!("Cleared {}: {} photo(s) removed", aircraft, deleted);
        }

        Commands::Inspect { action } => match action {
            InspectAction::Set { aircraft, registration, label } => {
                let meta = commands::set_inspection(core, &aircraft, &registration, &label).await?;
                print_one(json, &meta, || format!("{}: {} {}", meta.aircraft_type, meta.registration, meta.inspection_label))?;
            }
            InspectAction::Show { aircraft } => {
                let meta = commands::get_inspection(core, &aircraft).await?;
                print_one(json, &meta, || {
                    format!("{}: {} {} (updated {})", meta.aircraft_type, meta.registration, meta.inspection_label, meta.updated_at)
                })?;
            }
        },

        Commands::Export { aircraft, out } => {
            let canceller = Arc::clone(core);
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, cancelling export");
                    canceller.cancel_export();
                }
            });

            let result = commands::export_aircraft(core, &aircraft, out).await;
            ctrl_c.abort();

            match result? {
                Some(summary) => print_one(json, &summary, || {
                    let mut text = format!(
                        "Exported {} photo(s) to {} ({}x{}, {} B)",
                        summary.report.drawn,
                        summary.path.display(),
                        summary.report.width,
                        summary.report.height,
                        summary.bytes
                    );
                    for skipped in &summary.report.skipped {
                        text.push_str(&format!("\n  skipped {}: {}", skipped.id, skipped.reason));
                    }
                    text
                })?,
                None => println!("Export cancelled"),
            }
        }

        Commands::Counts => {
            let counts = commands::photo_counts(core).await;
            print_one(json, &counts, || {
                counts
                    .iter()
                    .map(|(aircraft, n)| format!("{:<8} {}", aircraft, n))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }

        Commands::Layouts => {
            for aircraft in &core.layouts().aircraft {
                println!("{} ({})", aircraft.id, aircraft.label);
                for door in &aircraft.doors {
                    println!("  {:<8} {}", door.id, door.label);
                }
            }
        }
    }

    Ok(())
}

fn print_one<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

/// Listing row without thumbnail bytes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedPhoto<'a> {
    id: &'a str,
    door_id: &'a str,
    aircraft_type: &'a str,
    timestamp: &'a str,
    thumbnail_bytes: usize,
}

impl<'a> From<&'a PhotoProjection> for ListedPhoto<'a> {
    fn from(p: &'a PhotoProjection) -> Self {
        Self {
            id: &p.id,
            door_id: &p.door_id,
            aircraft_type: &p.aircraft_type,
            timestamp: &p.timestamp,
            thumbnail_bytes: p.thumbnail.len(),
        }
    }
}
