//! URL helpers for joining the backend base URL with endpoint paths.

/// Strip trailing slashes so endpoint joins never produce `//`.
///
/// ```
/// use tutorchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000/"), "http://127.0.0.1:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path.
///
/// ```
/// use tutorchat::utils::url::construct_endpoint_url;
///
/// assert_eq!(
///     construct_endpoint_url("http://tutor.test/api/", "/quiz"),
///     "http://tutor.test/api/quiz"
/// );
/// ```
pub fn construct_endpoint_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}
