use crate::config::{app_config, aws_config};
use anyhow::{Context, Result};
use aws_sdk_s3 as s3;
use axum::body::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use s3::Client;
use sha2::{Digest, Sha256};
use tracing::error;

/// S3 compatible object store holding the uploaded car images.
///
/// objects are public and addressed by `{public_url}/{bucket}/{key}`, the key of a
/// uploaded file is derived from its content so uploading the same file twice
/// results in a single object.
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
    public_url: String,
}

/// a object listed from the store bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// the key of a uploaded file, `<sha256 of the content>-<original filename>`
pub fn content_key(original_name: &str, bytes: &[u8]) -> String {
    let hash = hex::encode(Sha256::digest(bytes));

    let name: String = original_name
        .trim()
        .chars()
        .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
        .collect();

    format!("{hash}-{name}")
}

impl ObjectStore {
    pub async fn new() -> Self {
        let cfg = app_config();

        Self::from_client(
            s3::Client::new(aws_config().await),
            cfg.aws_uploads_bucket_name.clone(),
            cfg.object_store_public_url.clone(),
        )
    }

    pub fn from_client(client: Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.bucket, key)
    }

    /// inverse of `public_url`, returns `None` for urls not pointing to this store bucket
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.public_url, self.bucket);

        url.strip_prefix(&prefix)
            .filter(|key| !key.is_empty())
            .map(String::from)
    }

    /// Uploads a file under a key derived from its content and name, returning its public url.
    ///
    /// a file that is already stored is written again, so its modification time tells the
    /// orphan sweep that a request is about to reference it.
    pub async fn upload_deduplicated(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String> {
        let key = content_key(original_name, &bytes);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(bytes.into())
            .send()
            .await
            .map_err(|e| {
                error!("[S3] failed to upload S3 object: {}", key);
                e
            })
            .context("failed to upload object")?;

        Ok(self.public_url(&key))
    }

    /// lists every object of the bucket, following the continuation tokens
    pub async fn list_objects(&self) -> Result<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(token.take())
                .send()
                .await
                .context("failed to list objects")?;

            for object in page.contents() {
                let Some(key) = object.key() else {
                    continue;
                };

                let last_modified = object
                    .last_modified()
                    .and_then(|date| Utc.timestamp_opt(date.secs(), 0).single())
                    .unwrap_or_else(Utc::now);

                objects.push(StoredObject {
                    key: key.to_string(),
                    last_modified,
                });
            }

            match page.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }

        Ok(objects)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("failed to delete object")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn store() -> ObjectStore {
        let conf = s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();

        ObjectStore::from_client(
            Client::from_conf(conf),
            String::from("car-images"),
            String::from("https://storage.googleapis.com/"),
        )
    }

    #[test]
    fn same_content_gives_same_key() {
        let a = content_key("front.jpg", b"some image bytes");
        let b = content_key("front.jpg", b"some image bytes");
        let c = content_key("front.jpg", b"other image bytes");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.ends_with("-front.jpg"));
        // hex encoded sha256 + '-'
        assert_eq!(a.len(), 64 + 1 + "front.jpg".len());
    }

    #[test]
    fn sanitizes_file_names() {
        assert!(content_key("my car/side view.png", b"x").ends_with("-my_car_side_view.png"));
    }

    #[test]
    fn public_url_round_trips_to_key() {
        let store = store();
        let url = store.public_url("abc-front.jpg");

        assert_eq!(
            url,
            "https://storage.googleapis.com/car-images/abc-front.jpg"
        );
        assert_eq!(store.key_from_url(&url), Some(String::from("abc-front.jpg")));
        assert_eq!(store.key_from_url("url_to_exterior2.jpg"), None);
    }
}
