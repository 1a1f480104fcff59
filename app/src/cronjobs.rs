use crate::{
    modules::car::{images::orphaned_image_keys, repository::referenced_image_urls},
    services::s3::ObjectStore,
};
use anyhow::Context;
use chrono::Utc;
use entity::session;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::{collections::HashSet, time::Duration};
use tracing::{debug, error, info, warn};

/// starts a tokio task that deletes all the expired user sessions every interval
pub fn start_clear_sessions_cronjob(db: DatabaseConnection, interval: Duration) {
    info!(
        "[CRON] clearing expired sessions every {} seconds",
        interval.as_secs()
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);

        loop {
            interval.tick().await;

            match session::Entity::delete_many()
                .filter(session::Column::ExpiresAt.lt(Utc::now()))
                .exec(&db)
                .await
            {
                Ok(res) => debug!("[CRON] cleared {} expired sessions", res.rows_affected),
                Err(e) => error!("[CRON] failed to clear expired sessions: {e}"),
            }
        }
    });
}

/// Deletes the stored car images that no car references, returning how many were deleted.
///
/// uploads are deduplicated by content so a object can be shared by many cars, and a request
/// may reuse a existing object before saving the car that references it. every upload writes
/// the object again, so objects written within `grace` are skipped and the references are
/// read only after the bucket is listed.
pub async fn sweep_orphan_images(
    db: &DatabaseConnection,
    store: &ObjectStore,
    grace: chrono::Duration,
) -> anyhow::Result<usize> {
    let cutoff = Utc::now() - grace;

    let objects = store.list_objects().await?;

    let referenced: HashSet<String> = referenced_image_urls(db)
        .await
        .context("failed to list referenced car images")?
        .iter()
        .filter_map(|url| store.key_from_url(url))
        .collect();

    let mut deleted = 0;

    for key in orphaned_image_keys(objects, &referenced, cutoff) {
        match store.delete(&key).await {
            Ok(()) => deleted += 1,
            Err(e) => warn!("[CRON] failed to delete orphan image {key}: {e:#}"),
        }
    }

    Ok(deleted)
}

/// starts a tokio task that deletes the car images no car references every interval
pub fn start_orphan_images_cronjob(
    db: DatabaseConnection,
    store: ObjectStore,
    interval: Duration,
    grace: chrono::Duration,
) {
    info!(
        "[CRON] sweeping orphan car images every {} seconds",
        interval.as_secs()
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);

        loop {
            interval.tick().await;

            match sweep_orphan_images(&db, &store, grace).await {
                Ok(deleted) => debug!("[CRON] deleted {} orphan car images", deleted),
                Err(e) => error!("[CRON] failed to sweep orphan car images: {e:#}"),
            }
        }
    });
}
