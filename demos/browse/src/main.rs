//! Lists a directory the way the file browser does and renders thumbnails
//! for any images in it.
//!
//! Usage: `browse [DIR] [THUMBNAIL_EDGE]`

use nemofm::prelude::*;
use nemofm::services::filesystem::IconHint;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let settings = match SettingsRegistry::new().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Falling back to default settings: {}", e);
            SettingsRegistry::default()
        },
    };

    let filter = settings.log_level().unwrap_or("info").to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| ".".to_string());
    let edge = args.next().and_then(|s| s.parse::<u32>().ok());

    let mut model = DirectoryModel::with_settings(&settings.browser());
    model.add_observer(|event: &StoreEvent<'_>| {
        if let StoreEvent::Inserted { index, entry } = event {
            log::trace!("inserted {} at {}", entry.name(), index);
        }
    });

    model.set_path(&dir);
    let count = model.wait_for_scan().await;
    println!("{} ({} entries)", dir, count);

    let mut previews = Vec::new();
    for entry in model.entries() {
        let marker = if entry.is_dir() { "/" } else { "" };
        println!("  {}{}  {} bytes", entry.name(), marker, entry.size());
        if let IconHint::Preview(path) = entry.icon_hint() {
            previews.push(path.to_string_lossy().into_owned());
        }
    }

    if previews.is_empty() {
        return;
    }

    let service = Arc::new(ThumbnailService::from_settings(&settings.thumbnails()));
    let executor = ThumbnailExecutor::new(service);
    let mut events = executor.subscribe();

    for id in &previews {
        if let Err(e) = executor.request_thumbnail(id.as_str(), edge.map(ThumbnailSize::square)) {
            log::error!("{}", e);
        }
    }

    for _ in 0..previews.len() {
        match events.recv().await {
            Ok(ThumbnailEvent::Ready { id, size, .. }) => println!("thumbnail {} {}", size, id),
            Ok(ThumbnailEvent::Failed { id, error, .. }) => println!("no thumbnail for {}: {}", id, error),
            Err(e) => {
                log::error!("Thumbnail events lost: {}", e);
                break;
            },
        }
    }
}
