//! Collaborator contracts consumed by [`crate::manager::PostManager`].
//!
//! Every primitive that tests a precondition and then writes is atomic per
//! aggregate inside the store. The manager never does read-modify-write on
//! likes, comments or user relations.

pub mod memory;
pub mod redis;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
    errors::StoreError,
    search::{PostFilter, SearchPattern},
    types::{Comment, NewUser, Post, PostFields, User, UserId},
};

pub use memory::{MemoryIdentityStore, MemoryPostStore};
pub use self::redis::{RedisIdentityStore, RedisPostStore};

/// Result of a conditional set or sequence mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMutation {
    /// The precondition held and the collection changed.
    Applied,
    /// The precondition failed; nothing changed.
    Unchanged,
    /// The owning aggregate does not exist.
    Missing,
}

impl SetMutation {
    pub fn from_flag(applied: bool) -> Self {
        if applied { SetMutation::Applied } else { SetMutation::Unchanged }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, SetMutation::Applied)
    }
}

/// Post-id collections held on a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSetField {
    /// Ordered, owned back-references.
    Posts,
    /// Weak references.
    Favourites,
}

impl UserSetField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSetField::Posts => "posts",
            UserSetField::Favourites => "favourites",
        }
    }
}

pub trait IdentityStore: Send + Sync {
    /// Persists a new user; a taken username yields `Ok(None)`.
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn get_user(&self, id: &str) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn find_users_by_pattern(
        &self,
        pattern: &SearchPattern,
    ) -> impl Future<Output = Result<Vec<UserId>, StoreError>> + Send;

    /// Adds `post_id` unless already present (append for `Posts`).
    fn add_to_set(
        &self,
        user_id: &str,
        field: UserSetField,
        post_id: &str,
    ) -> impl Future<Output = Result<SetMutation, StoreError>> + Send;

    fn remove_from_set(
        &self,
        user_id: &str,
        field: UserSetField,
        post_id: &str,
    ) -> impl Future<Output = Result<SetMutation, StoreError>> + Send;

    /// Drops `post_id` from every user's favourites, returning how many users changed.
    fn remove_from_all_favourites(&self, post_id: &str) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

pub trait PostStore: Send + Sync {
    fn create(&self, post: Post) -> impl Future<Output = Result<Post, StoreError>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Post>, StoreError>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<Post>, StoreError>> + Send;

    /// Replaces the editable fields without touching likes or comments.
    fn update_fields(
        &self,
        id: &str,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Post>, StoreError>> + Send;

    /// Returns `false` when no post was removed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Add-if-absent on `likes`.
    fn add_like(&self, id: &str, user_id: &str) -> impl Future<Output = Result<SetMutation, StoreError>> + Send;

    /// Remove-if-present on `likes`.
    fn remove_like(&self, id: &str, user_id: &str) -> impl Future<Output = Result<SetMutation, StoreError>> + Send;

    /// Appends to `comments`; a comment id already in the sequence is refused.
    fn append_comment(
        &self,
        id: &str,
        comment: Comment,
    ) -> impl Future<Output = Result<SetMutation, StoreError>> + Send;

    /// Targeted removal by comment id.
    fn remove_comment(
        &self,
        id: &str,
        comment_id: &str,
    ) -> impl Future<Output = Result<SetMutation, StoreError>> + Send;

    fn find_matching(&self, filter: &PostFilter) -> impl Future<Output = Result<Vec<Post>, StoreError>> + Send;
}
