use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/names`.
///
/// `image_data` is a base64-encoded PNG. The syntax is not validated here;
/// undecodable image data is the provider's to reject.
#[derive(Debug, Deserialize, Validate)]
pub struct NamesRequest {
    #[validate(length(min = 1, message = "image_data must not be empty"))]
    pub image_data: String,
}
