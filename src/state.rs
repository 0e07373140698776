use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::auth::AuthSettings;
use crate::config::AppConfig;
use crate::counter::VisitCounter;
use crate::directory::UserDirectory;
use crate::error::Error;
use crate::posts::{self, Post};
use crate::render::HtmlRenderer;
use crate::traits::{Renderer, TallyStore};

/// Number of demo posts generated at startup.
const POST_COUNT: usize = 5;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub(crate) auth: Arc<AuthSettings>,
    pub(crate) directory: Arc<UserDirectory>,
    pub(crate) counter: VisitCounter,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) posts: Arc<Vec<Post>>,
}

impl AppState {
    /// Seed the user directory and generate the demo posts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credential`] if seeding the directory fails.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let directory = UserDirectory::seeded(config.hash_params)?;
        let posts = posts::generate_posts(&mut rand::rng(), POST_COUNT);

        Ok(Self {
            auth: Arc::new(config.auth),
            directory: Arc::new(directory),
            counter: VisitCounter::default(),
            renderer: Arc::new(HtmlRenderer),
            posts: Arc::new(posts),
        })
    }

    /// Replace the page renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Renderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Replace the visit tally store.
    #[must_use]
    pub fn with_tally(mut self, tally: impl TallyStore) -> Self {
        self.counter = VisitCounter::new(Arc::new(tally));
        self
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.auth.cookie_key.clone()
    }
}
