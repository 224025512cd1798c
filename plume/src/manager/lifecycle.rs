use chrono::Utc;
use log::{debug, info, warn};

use super::PostManager;
use crate::{
    errors::{EntityKind, PostError},
    projection::{PostView, project_post, project_posts},
    store::{IdentityStore, PostStore, SetMutation, UserSetField},
    types::{Caller, Post, PostDraft},
};

impl<I, P> PostManager<I, P>
where
    I: IdentityStore,
    P: PostStore,
{
    /// Creates a post authored by `caller` and appends it to the author's post list.
    pub async fn create_post(&self, caller: &Caller, draft: PostDraft) -> Result<Post, PostError> {
        debug!("create_post author={}", caller.user_id);
        self.within(async {
            let fields = draft.validate()?;
            if self.identity.get_user(&caller.user_id).await?.is_none() {
                return Err(PostError::not_found(EntityKind::User, &caller.user_id));
            }

            let post = self.posts.create(Post::new(&caller.user_id, fields, Utc::now())).await?;
            match self
                .identity
                .add_to_set(&caller.user_id, UserSetField::Posts, &post.id)
                .await?
            {
                SetMutation::Missing => {
                    // The author vanished between the check and the write.
                    if let Err(err) = self.posts.delete(&post.id).await {
                        warn!("failed to roll back post {} of missing author: {err}", post.id);
                    }
                    Err(PostError::not_found(EntityKind::User, &caller.user_id))
                }
                SetMutation::Applied | SetMutation::Unchanged => Ok(post),
            }
        })
        .await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<PostView, PostError> {
        debug!("get_post post={post_id}");
        self.within(async {
            let post = self.require_post(post_id).await?;
            Ok::<_, PostError>(project_post(&self.identity, post).await?)
        })
        .await
    }

    /// Every post, oldest first, with authors resolved.
    pub async fn list_posts(&self) -> Result<Vec<PostView>, PostError> {
        debug!("list_posts");
        self.within(async {
            let posts = self.posts.list().await?;
            Ok::<_, PostError>(project_posts(&self.identity, posts).await?)
        })
        .await
    }

    /// Replaces the editable fields; only the author or an admin may edit.
    pub async fn update_post(&self, post_id: &str, caller: &Caller, draft: PostDraft) -> Result<Post, PostError> {
        debug!("update_post post={post_id} caller={}", caller.user_id);
        self.within(async {
            let fields = draft.validate()?;
            let current = self.require_post(post_id).await?;
            if !caller.may_modify(&current.author) {
                return Err(PostError::forbidden("only the author or an admin may edit this post"));
            }
            self.posts
                .update_fields(post_id, fields, Utc::now())
                .await?
                .ok_or_else(|| PostError::not_found(EntityKind::Post, post_id))
        })
        .await
    }

    /// Deletes a post, then detaches it from its author and every favourites list.
    ///
    /// The detach steps run after the delete has committed. Their failures are
    /// logged and leave tombstones that readers skip.
    pub async fn delete_post(&self, post_id: &str, caller: &Caller) -> Result<(), PostError> {
        debug!("delete_post post={post_id} caller={}", caller.user_id);
        let post = self
            .within(async {
                let post = self.require_post(post_id).await?;
                if !caller.may_modify(&post.author) {
                    return Err(PostError::forbidden("only the author or an admin may delete this post"));
                }
                if !self.posts.delete(post_id).await? {
                    return Err(PostError::not_found(EntityKind::Post, post_id));
                }
                Ok(post)
            })
            .await?;

        self.detach_deleted_post(&post).await;
        Ok(())
    }

    async fn detach_deleted_post(&self, post: &Post) {
        let detached = self
            .best_effort(
                "author_posts",
                &post.id,
                self.identity.remove_from_set(&post.author, UserSetField::Posts, &post.id),
            )
            .await;
        let purged = self
            .best_effort(
                "favourites",
                &post.id,
                self.identity.remove_from_all_favourites(&post.id),
            )
            .await;

        if let (Some(detached), Some(purged)) = (detached, purged) {
            info!(
                "post {} cleanup finished: author list {}, {purged} favourites lists updated",
                post.id,
                if detached.was_applied() { "updated" } else { "unchanged" },
            );
        }
    }

    pub(super) async fn require_post(&self, post_id: &str) -> Result<Post, PostError> {
        self.posts
            .get(post_id)
            .await?
            .ok_or_else(|| PostError::not_found(EntityKind::Post, post_id))
    }
}
