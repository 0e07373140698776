//! Session-backed authentication for the site.
//!
//! Sessions live client-side in a private cookie (encrypted and
//! authenticated with the configured key). A separate remember-me cookie
//! re-binds the identity when the session has none.
//!
//! ```rust,ignore
//! use labsite::auth::{Authenticated, SessionContext};
//!
//! // Public page: anonymous or logged in.
//! async fn public(mut session: SessionContext) -> impl IntoResponse { ... }
//!
//! // Protected page: anonymous callers are redirected to /login?next=...
//! async fn protected(Authenticated { session, identity }: Authenticated) -> impl IntoResponse { ... }
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod remember;
mod routes;
mod session;

pub use config::AuthSettings;
pub use error::AuthError;
pub use extractor::{Authenticated, LoginRequired, SessionContext};
pub use routes::auth_routes;
pub use session::Session;

/// Re-export cookie key type for configuration.
pub use axum_extra::extract::cookie::Key as CookieKey;
