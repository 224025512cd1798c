use log::debug;

use super::PostManager;
use crate::{
    errors::PostError,
    search::{PostFilter, SearchPattern},
    store::{IdentityStore, PostStore},
    types::Post,
};

impl<I, P> PostManager<I, P>
where
    I: IdentityStore,
    P: PostStore,
{
    /// Posts whose title or a category contains `query`, plus every post by a
    /// user whose name or username contains it. Each post appears once.
    pub async fn search(&self, query: &str) -> Result<Vec<Post>, PostError> {
        debug!("search query={query:?}");
        self.within(async {
            let pattern = SearchPattern::new(query)?;
            let authors = self.identity.find_users_by_pattern(&pattern).await?;
            let filter = PostFilter::new(pattern).with_authors(authors);
            Ok::<_, PostError>(self.posts.find_matching(&filter).await?)
        })
        .await
    }
}
