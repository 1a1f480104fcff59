use crate::{services::s3::StoredObject, utils::string::slugify};
use chrono::{DateTime, Utc};
use entity::car::{CarImage, CarImages};
use futures_util::future::join_all;
use std::collections::HashSet;
use tracing::debug;

/// amount of pre rendered images each car model has on the catalog bucket
const CATALOG_IMAGES_PER_MODEL: usize = 2;

/// placeholders for cars created without images
pub fn default_images() -> CarImages {
    CarImages(vec![
        CarImage {
            url: String::from("url_to_exterior2.jpg"),
            exists: false,
        },
        CarImage {
            url: String::from("url_to_interior2.jpg"),
            exists: false,
        },
    ])
}

/// images of freshly uploaded files, they are known to exist
pub fn uploaded_images(urls: Vec<String>) -> CarImages {
    CarImages(
        urls.into_iter()
            .map(|url| CarImage { url, exists: true })
            .collect(),
    )
}

/// urls of the catalog images of a car model:
///
/// `{public_url}/{bucket}/car-images/{brand}/{brand}-{model}-{n}.jpg`
pub fn catalog_image_urls(public_url: &str, bucket: &str, brand: &str, model: &str) -> Vec<String> {
    let brand = slugify(brand);
    let model = slugify(model);
    let public_url = public_url.trim_end_matches('/');

    (1..=CATALOG_IMAGES_PER_MODEL)
        .map(|n| {
            format!(
                "{}/{}/car-images/{}/{}-{}-{}.jpg",
                public_url, bucket, brand, brand, model, n
            )
        })
        .collect()
}

/// builds the image list of a updated car
///
/// when `retained` is given the list starts with those urls, keeping the descriptor
/// of the current image with the same url, otherwise it starts with every current
/// image. new uploads are appended.
pub fn merge_images(
    current: &CarImages,
    retained: Option<Vec<String>>,
    uploaded: Vec<String>,
) -> CarImages {
    let mut images = match retained {
        Some(urls) => urls
            .into_iter()
            .map(|url| {
                current
                    .0
                    .iter()
                    .find(|img| img.url == url)
                    .cloned()
                    .unwrap_or(CarImage { url, exists: true })
            })
            .collect(),
        None => current.0.clone(),
    };

    images.extend(uploaded_images(uploaded).0);

    CarImages(images)
}

/// keys of the stored objects no car references that were last written before `cutoff`
pub fn orphaned_image_keys(
    objects: Vec<StoredObject>,
    referenced: &HashSet<String>,
    cutoff: DateTime<Utc>,
) -> Vec<String> {
    objects
        .into_iter()
        .filter(|object| object.last_modified < cutoff && !referenced.contains(&object.key))
        .map(|object| object.key)
        .collect()
}

/// checks with a `HEAD` request which of the urls point to a existing object
pub async fn check_images_exist(http: &reqwest::Client, urls: Vec<String>) -> CarImages {
    let checks = urls.into_iter().map(|url| async move {
        let exists = match http.head(&url).send().await {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                debug!("[S3] failed to check catalog image {}: {}", url, e);
                false
            }
        };

        CarImage { url, exists }
    });

    CarImages(join_all(checks).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(url: &str, exists: bool) -> CarImage {
        CarImage {
            url: String::from(url),
            exists,
        }
    }

    #[test]
    fn default_images_are_placeholders() {
        let defaults = default_images();

        assert_eq!(
            defaults.0,
            vec![
                img("url_to_exterior2.jpg", false),
                img("url_to_interior2.jpg", false)
            ]
        );
    }

    #[test]
    fn derives_catalog_urls_from_brand_and_model() {
        let urls = catalog_image_urls(
            "https://storage.googleapis.com/",
            "catalog",
            "Land Rover",
            "Range  Rover Sport",
        );

        assert_eq!(
            urls,
            vec![
                "https://storage.googleapis.com/catalog/car-images/land-rover/land-rover-range-rover-sport-1.jpg",
                "https://storage.googleapis.com/catalog/car-images/land-rover/land-rover-range-rover-sport-2.jpg",
            ]
        );
    }

    #[test]
    fn retained_images_keep_their_descriptor() {
        let current = CarImages(vec![img("a.jpg", true), img("b.jpg", false)]);

        let merged = merge_images(
            &current,
            Some(vec![String::from("b.jpg")]),
            vec![String::from("c.jpg")],
        );

        assert_eq!(merged.0, vec![img("b.jpg", false), img("c.jpg", true)]);
    }

    #[test]
    fn no_retained_list_keeps_every_image() {
        let current = CarImages(vec![img("a.jpg", true)]);

        let merged = merge_images(&current, None, vec![String::from("d.jpg")]);

        assert_eq!(merged.0, vec![img("a.jpg", true), img("d.jpg", true)]);
    }

    #[test]
    fn empty_retained_list_drops_every_image() {
        let current = CarImages(vec![img("a.jpg", true)]);

        assert!(merge_images(&current, Some(vec![]), vec![]).0.is_empty());
    }

    fn stored(key: &str, minutes_ago: i64) -> StoredObject {
        StoredObject {
            key: String::from(key),
            last_modified: Utc::now() - chrono::Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn only_old_unreferenced_objects_are_orphans() {
        let referenced = HashSet::from([String::from("in-use.jpg")]);
        let cutoff = Utc::now() - chrono::Duration::minutes(60);

        let objects = vec![
            stored("in-use.jpg", 600),
            // left behind by a deleted car or by a update that failed after uploading
            stored("unreferenced.jpg", 600),
            // just uploaded or re-uploaded by a request that did not save the car yet
            stored("fresh.jpg", 1),
        ];

        assert_eq!(
            orphaned_image_keys(objects, &referenced, cutoff),
            vec![String::from("unreferenced.jpg")]
        );
    }
}
