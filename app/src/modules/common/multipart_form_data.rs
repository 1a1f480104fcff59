use axum::body::Bytes;
use axum_typed_multipart::FieldData;
use http::StatusCode;

use super::responses::SimpleError;

const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpe", "jpg", "jpeg", "png", "webp"];

/// asserts a multipart/form-data field is a image with a valid extension, returning the extension
pub fn get_image_extension_from_field_or_fail_request(
    field: &FieldData<Bytes>,
) -> Result<String, (StatusCode, SimpleError)> {
    let file_name = field
        .metadata
        .file_name
        .clone()
        .ok_or((StatusCode::BAD_REQUEST, SimpleError::from("empty filename")))?;

    let (_, file_extension) = file_name.rsplit_once('.').ok_or((
        StatusCode::BAD_REQUEST,
        SimpleError::from("empty file extension"),
    ))?;

    let file_extension = file_extension.to_lowercase();

    if ALLOWED_IMAGE_EXTENSIONS.contains(&file_extension.as_str()) {
        Ok(file_extension)
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            SimpleError::from("invalid file extension"),
        ))
    }
}

/// An uploaded image that passed validation, ready to be sent to the object store
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// validates every field is a image, failing the whole request on the first invalid one
pub fn images_from_fields(
    fields: Vec<FieldData<Bytes>>,
) -> Result<Vec<ImageUpload>, (StatusCode, SimpleError)> {
    fields
        .into_iter()
        .map(|field| {
            let extension = get_image_extension_from_field_or_fail_request(&field)?;

            let content_type = field
                .metadata
                .content_type
                .clone()
                .unwrap_or_else(|| content_type_from_extension(&extension).to_string());

            Ok(ImageUpload {
                file_name: field.metadata.file_name.clone().unwrap_or_default(),
                content_type,
                bytes: field.contents,
            })
        })
        .collect()
}

fn content_type_from_extension(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extensions_to_content_types() {
        assert_eq!(content_type_from_extension("png"), "image/png");
        assert_eq!(content_type_from_extension("webp"), "image/webp");
        assert_eq!(content_type_from_extension("jpe"), "image/jpeg");
    }
}
