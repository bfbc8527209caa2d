use percent_encoding::percent_decode_str;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "gif"];

/// Loose check for something that points at an image.
///
/// Matches the extension anywhere in the string so that CDN urls with the
/// format tucked into a query (`...?fm=jpg`) still count.
pub fn is_image_url(src: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| src.contains(ext))
}

/// Normalize a raw `src`-like value into a single loadable url.
///
/// Handles percent-encoded values and `srcset`-style compounds such as
/// `a.jpg 1x, b.jpg 2x`. When no image-looking token can be pulled out, the
/// input is returned untouched. `None` yields an empty string.
pub fn decode_image_url(src: Option<&str>) -> String {
    let Some(src) = src else {
        return String::new();
    };

    let decoded = percent_decode_str(src).decode_utf8_lossy();
    let first_segment = decoded.split(',').next().unwrap_or_default();
    let token = first_segment.split_whitespace().next().unwrap_or_default();

    if is_image_url(token) {
        token.to_string()
    } else {
        src.to_string()
    }
}

/// Whether a resolved url can actually be fetched.
pub fn is_remote_image(resolved: &str) -> bool {
    !resolved.is_empty() && !resolved.starts_with("data:")
}

/// Strip the query string from `url`.
pub fn remove_url_parameters(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
