use log::debug;

use super::PostManager;
use crate::{
    errors::{EntityKind, PostError},
    store::{IdentityStore, PostStore, SetMutation, UserSetField},
    types::{Caller, NewUser, Post, PostId, User},
};

impl<I, P> PostManager<I, P>
where
    I: IdentityStore,
    P: PostStore,
{
    /// Registers a user; the username must be unique ignoring case.
    pub async fn register_user(&self, user: NewUser) -> Result<User, PostError> {
        debug!("register_user username={}", user.username);
        self.within(async {
            user.validate()?;
            let username = user.username.trim().to_string();
            self.identity
                .create_user(user)
                .await?
                .ok_or_else(|| PostError::conflict(format!("username '{username}' is already taken")))
        })
        .await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, PostError> {
        debug!("get_user user={user_id}");
        self.within(self.require_user(user_id)).await
    }

    pub async fn favourite_post(&self, post_id: &str, caller: &Caller) -> Result<(), PostError> {
        debug!("favourite_post post={post_id} user={}", caller.user_id);
        self.within(async {
            self.require_post(post_id).await?;
            match self
                .identity
                .add_to_set(&caller.user_id, UserSetField::Favourites, post_id)
                .await?
            {
                SetMutation::Applied => Ok(()),
                SetMutation::Unchanged => Err(PostError::conflict("post already in favourites")),
                SetMutation::Missing => Err(PostError::not_found(EntityKind::User, &caller.user_id)),
            }
        })
        .await
    }

    /// Removes a favourite even when the post itself is already gone.
    pub async fn unfavourite_post(&self, post_id: &str, caller: &Caller) -> Result<(), PostError> {
        debug!("unfavourite_post post={post_id} user={}", caller.user_id);
        self.within(async {
            match self
                .identity
                .remove_from_set(&caller.user_id, UserSetField::Favourites, post_id)
                .await?
            {
                SetMutation::Applied => Ok(()),
                SetMutation::Unchanged => Err(PostError::conflict("post not in favourites")),
                SetMutation::Missing => Err(PostError::not_found(EntityKind::User, &caller.user_id)),
            }
        })
        .await
    }

    /// Favourite posts that still exist; ids of deleted posts are dropped from the user.
    pub async fn list_favourites(&self, user_id: &str) -> Result<Vec<Post>, PostError> {
        debug!("list_favourites user={user_id}");
        self.within(async {
            let user = self.require_user(user_id).await?;
            let ids: Vec<PostId> = user.favourites.into_iter().collect();
            self.resolve_live_posts(user_id, UserSetField::Favourites, ids).await
        })
        .await
    }

    /// Authored posts in creation order; ids of deleted posts are dropped from the user.
    pub async fn list_user_posts(&self, user_id: &str) -> Result<Vec<Post>, PostError> {
        debug!("list_user_posts user={user_id}");
        self.within(async {
            let user = self.require_user(user_id).await?;
            self.resolve_live_posts(user_id, UserSetField::Posts, user.posts).await
        })
        .await
    }

    async fn resolve_live_posts(
        &self,
        user_id: &str,
        field: UserSetField,
        ids: Vec<PostId>,
    ) -> Result<Vec<Post>, PostError> {
        let mut live = Vec::with_capacity(ids.len());
        for post_id in ids {
            match self.posts.get(&post_id).await? {
                Some(post) => live.push(post),
                None => {
                    debug!("dropping tombstone {post_id} from {} of user {user_id}", field.as_str());
                    self.best_effort(
                        field.as_str(),
                        &post_id,
                        self.identity.remove_from_set(user_id, field, &post_id),
                    )
                    .await;
                }
            }
        }
        Ok(live)
    }

    async fn require_user(&self, user_id: &str) -> Result<User, PostError> {
        self.identity
            .get_user(user_id)
            .await?
            .ok_or_else(|| PostError::not_found(EntityKind::User, user_id))
    }
}
