//! Read-time resolution of user references on posts, likes and comments.
//!
//! Nothing here writes: a vanished user resolves to `None` (or is skipped for
//! likes) instead of failing the read.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::{
    errors::StoreError,
    store::IdentityStore,
    types::{Comment, CommentId, Media, Post, PostId, User, UserId},
};

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikerView {
    pub id: UserId,
    pub username: String,
    pub profile_picture: Option<String>,
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: UserId,
    pub username: String,
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub user: Option<CommentAuthor>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post with its author resolved for display.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub author: Option<AuthorSummary>,
    pub title: String,
    pub content: String,
    pub media: Media,
    pub categories: Vec<String>,
    pub is_published: bool,
    pub likes: BTreeSet<UserId>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    fn from_post(post: Post, author: Option<AuthorSummary>) -> Self {
        Self {
            id: post.id,
            author,
            title: post.title,
            content: post.content,
            media: post.media,
            categories: post.categories,
            is_published: post.is_published,
            likes: post.likes,
            comments: post.comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Looks up each distinct id once and keeps only users that still exist.
pub(crate) async fn resolve_users<'a, I, S>(identity: &I, ids: S) -> Result<HashMap<UserId, User>, StoreError>
where
    I: IdentityStore,
    S: IntoIterator<Item = &'a UserId>,
{
    let distinct: BTreeSet<&UserId> = ids.into_iter().collect();
    let mut resolved = HashMap::with_capacity(distinct.len());
    for id in distinct {
        if let Some(user) = identity.get_user(id).await? {
            resolved.insert(id.clone(), user);
        }
    }
    Ok(resolved)
}

pub(crate) async fn project_post<I: IdentityStore>(identity: &I, post: Post) -> Result<PostView, StoreError> {
    let author = identity.get_user(&post.author).await?.map(|user| AuthorSummary {
        id: user.id,
        username: user.username,
        name: user.name,
    });
    Ok(PostView::from_post(post, author))
}

pub(crate) async fn project_posts<I: IdentityStore>(identity: &I, posts: Vec<Post>) -> Result<Vec<PostView>, StoreError> {
    let users = resolve_users(identity, posts.iter().map(|post| &post.author)).await?;
    Ok(posts
        .into_iter()
        .map(|post| {
            let author = users.get(&post.author).map(|user| AuthorSummary {
                id: user.id.clone(),
                username: user.username.clone(),
                name: user.name.clone(),
            });
            PostView::from_post(post, author)
        })
        .collect())
}

pub(crate) async fn project_likes<I: IdentityStore>(identity: &I, post: &Post) -> Result<Vec<LikerView>, StoreError> {
    let users = resolve_users(identity, post.likes.iter()).await?;
    Ok(post
        .likes
        .iter()
        .filter_map(|id| users.get(id))
        .map(|user| LikerView {
            id: user.id.clone(),
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
        })
        .collect())
}

pub(crate) async fn project_comments<I: IdentityStore>(
    identity: &I,
    comments: Vec<Comment>,
) -> Result<Vec<CommentView>, StoreError> {
    let users = resolve_users(identity, comments.iter().map(|comment| &comment.user)).await?;
    Ok(comments
        .into_iter()
        .map(|comment| CommentView {
            user: users.get(&comment.user).map(|user| CommentAuthor {
                id: user.id.clone(),
                username: user.username.clone(),
            }),
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
        })
        .collect())
}
