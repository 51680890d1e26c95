use crate::status_bail;
use regex::Regex;
use std::sync::LazyLock;
use warp::http::StatusCode;

pub fn is_valid_str(data: &str, min_length: usize, max_length: usize) -> bool {
    let len = data.chars().count();
    len >= min_length && len <= max_length
}

pub fn validate_str<S: AsRef<str>>(
    field_name: &str,
    data: S,
    min_length: usize,
    max_length: usize,
) -> anyhow::Result<S> {
    if !is_valid_str(data.as_ref(), min_length, max_length) {
        status_bail!(
            StatusCode::BAD_REQUEST,
            "'{}' must be between {} and {} characters long",
            field_name,
            min_length,
            max_length
        );
    }

    Ok(data)
}

/// Collection names and document ids: a-z, A-Z, 0-9, _ and -
static VALID_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-]{1,128}$").expect("Invalid regex"));

pub fn is_valid_id(id: &str) -> bool {
    VALID_ID_REGEX.is_match(id)
}

pub fn validate_id<S: AsRef<str>>(field_name: &str, id: S) -> anyhow::Result<S> {
    if !is_valid_id(id.as_ref()) {
        status_bail!(
            StatusCode::BAD_REQUEST,
            "'{}' must only contain 1 to 128 letters, digits, '_' or '-'",
            field_name
        );
    }

    Ok(id)
}

/// Object paths are relative, `/` separated and must not escape their prefix.
pub fn is_valid_object_path(path: &str) -> bool {
    is_valid_str(path, 1, 1024)
        && !path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        && !path.chars().any(char::is_control)
}

pub fn validate_object_path<S: AsRef<str>>(field_name: &str, path: S) -> anyhow::Result<S> {
    if !is_valid_object_path(path.as_ref()) {
        status_bail!(
            StatusCode::BAD_REQUEST,
            "'{}' must be a relative path without empty, '.' or '..' segments",
            field_name
        );
    }

    Ok(path)
}
