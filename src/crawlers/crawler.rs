use url::Url;

use crate::error::FetchError;

/// Source of fully rendered page markup.
///
/// Implementations must wait until the page's baseline content is present
/// before returning, and report a hung load as [`FetchError::Timeout`]
/// rather than blocking forever.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Loads `url` and returns its rendered HTML
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError>;
}

impl<T: PageFetcher> PageFetcher for &mut T {
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}
