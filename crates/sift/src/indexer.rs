//! Background index builds.

use std::{sync::Arc, time::Duration};

use sift_crawl::Crawler;
use tokio::{task::JoinHandle, time};
use tracing::{error, info};

use crate::service::SearchService;

/// Starts one build task per site.
///
/// Each task builds its site's index immediately and then, when `refresh` is set,
/// rebuilds it at that interval. Failures are logged and leave the previous index in
/// place.
pub fn spawn_indexers(
    service: &Arc<SearchService>,
    crawler: &Arc<Crawler>,
    refresh: Option<Duration>,
) -> Vec<JoinHandle<()>> {
    service
        .registry()
        .ids()
        .into_iter()
        .map(|id| {
            let service = Arc::clone(service);
            let crawler = Arc::clone(crawler);
            tokio::spawn(async move {
                loop {
                    info!(site = %id, "building index");
                    if let Err(e) = service.registry().rebuild(&id, &crawler).await {
                        error!(site = %id, "index build failed: {e}");
                    }
                    let Some(period) = refresh else {
                        break;
                    };
                    time::sleep(period).await;
                }
            })
        })
        .collect()
}
