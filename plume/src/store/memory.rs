//! Process-local stores backed by `tokio::sync::RwLock` guarded maps.
//!
//! Each primitive runs under a single write guard, so conditional mutations
//! are atomic with respect to every other call on the same store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::StoreError,
    search::{PostFilter, SearchPattern},
    store::{IdentityStore, PostStore, SetMutation, UserSetField},
    types::{Comment, NewUser, Post, PostFields, User, UserId},
};

#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: RwLock<BTreeMap<UserId, User>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user as-is, replacing any user with the same id.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl IdentityStore for MemoryIdentityStore {
    async fn create_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let wanted = user.username.trim().to_lowercase();
        let taken = users.values().any(|existing| existing.username.to_lowercase() == wanted);
        if taken {
            return Ok(None);
        }
        let user = user.into_user(Utc::now());
        users.insert(user.id.clone(), user.clone());
        Ok(Some(user))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_users_by_pattern(&self, pattern: &SearchPattern) -> Result<Vec<UserId>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|user| pattern.matches_user(user))
            .map(|user| user.id.clone())
            .collect())
    }

    async fn add_to_set(&self, user_id: &str, field: UserSetField, post_id: &str) -> Result<SetMutation, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(SetMutation::Missing);
        };
        let applied = match field {
            UserSetField::Posts => {
                if user.posts.iter().any(|id| id == post_id) {
                    false
                } else {
                    user.posts.push(post_id.to_string());
                    true
                }
            }
            UserSetField::Favourites => user.favourites.insert(post_id.to_string()),
        };
        Ok(SetMutation::from_flag(applied))
    }

    async fn remove_from_set(
        &self,
        user_id: &str,
        field: UserSetField,
        post_id: &str,
    ) -> Result<SetMutation, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(SetMutation::Missing);
        };
        let applied = match field {
            UserSetField::Posts => {
                let before = user.posts.len();
                user.posts.retain(|id| id != post_id);
                user.posts.len() != before
            }
            UserSetField::Favourites => user.favourites.remove(post_id),
        };
        Ok(SetMutation::from_flag(applied))
    }

    async fn remove_from_all_favourites(&self, post_id: &str) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        let mut touched = 0;
        for user in users.values_mut() {
            if user.favourites.remove(post_id) {
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

fn by_creation(posts: &mut [Post]) {
    posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

impl PostStore for MemoryPostStore {
    async fn create(&self, post: Post) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(StoreError::other(format!("post id {} already exists", post.id)));
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut all: Vec<Post> = self.posts.read().await.values().cloned().collect();
        by_creation(&mut all);
        Ok(all)
    }

    async fn update_fields(
        &self,
        id: &str,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(id).map(|post| {
            post.apply(fields, updated_at);
            post.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.posts.write().await.remove(id).is_some())
    }

    async fn add_like(&self, id: &str, user_id: &str) -> Result<SetMutation, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(match posts.get_mut(id) {
            Some(post) => SetMutation::from_flag(post.likes.insert(user_id.to_string())),
            None => SetMutation::Missing,
        })
    }

    async fn remove_like(&self, id: &str, user_id: &str) -> Result<SetMutation, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(match posts.get_mut(id) {
            Some(post) => SetMutation::from_flag(post.likes.remove(user_id)),
            None => SetMutation::Missing,
        })
    }

    async fn append_comment(&self, id: &str, comment: Comment) -> Result<SetMutation, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(id) else {
            return Ok(SetMutation::Missing);
        };
        if post.comment(&comment.id).is_some() {
            return Ok(SetMutation::Unchanged);
        }
        post.comments.push(comment);
        Ok(SetMutation::Applied)
    }

    async fn remove_comment(&self, id: &str, comment_id: &str) -> Result<SetMutation, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(id) else {
            return Ok(SetMutation::Missing);
        };
        let before = post.comments.len();
        post.comments.retain(|comment| comment.id != comment_id);
        Ok(SetMutation::from_flag(post.comments.len() != before))
    }

    async fn find_matching(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        let mut hits: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        by_creation(&mut hits);
        Ok(hits)
    }
}
