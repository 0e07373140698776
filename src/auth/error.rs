/// Authentication failures.
///
/// Neither is fatal: both are recovered by the route layer with a notice and
/// a re-rendered page or a redirect.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown login or credential mismatch.
    #[error("Invalid login or password")]
    InvalidCredentials,

    /// No identity bound to the session.
    #[error("Not authenticated")]
    Unauthenticated,
}
