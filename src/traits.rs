use crate::error::Error;

/// Storage behind the per-identity visit tally.
///
/// Keys are identity logins. Implementations must make `increment` atomic
/// per key: requests are served by a multi-threaded runtime, and two
/// concurrent visits by the same identity must both be counted.
///
/// # Example
///
/// ```rust,ignore
/// impl TallyStore for RedisTally {
///     fn increment(&self, key: &str) -> u64 {
///         self.conn.incr(format!("visits:{key}"), 1)
///     }
/// }
/// ```
pub trait TallyStore: Send + Sync + 'static {
    /// Add one to `key` (starting from zero) and return the new value.
    fn increment(&self, key: &str) -> u64;
}

/// Page-rendering service.
///
/// Takes a view name and a JSON data mapping and produces an HTML document.
/// The built-in implementation is [`HtmlRenderer`](crate::render::HtmlRenderer).
pub trait Renderer: Send + Sync + 'static {
    /// Render `view` with `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the view is unknown or `data` lacks a
    /// field the view requires.
    fn render(&self, view: &str, data: &serde_json::Value) -> Result<String, Error>;
}
