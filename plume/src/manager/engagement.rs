use chrono::Utc;
use log::debug;

use super::PostManager;
use crate::{
    errors::{EntityKind, PostError, ValidationError},
    projection::{CommentView, LikerView, project_comments, project_likes},
    store::{IdentityStore, PostStore, SetMutation},
    types::{Caller, Comment},
};

/// Fresh ids tried before a comment append gives up.
const COMMENT_ID_ATTEMPTS: usize = 3;

impl<I, P> PostManager<I, P>
where
    I: IdentityStore,
    P: PostStore,
{
    pub async fn like_post(&self, post_id: &str, caller: &Caller) -> Result<(), PostError> {
        debug!("like_post post={post_id} user={}", caller.user_id);
        self.within(async {
            match self.posts.add_like(post_id, &caller.user_id).await? {
                SetMutation::Applied => Ok(()),
                SetMutation::Unchanged => Err(PostError::conflict("post already liked")),
                SetMutation::Missing => Err(PostError::not_found(EntityKind::Post, post_id)),
            }
        })
        .await
    }

    pub async fn unlike_post(&self, post_id: &str, caller: &Caller) -> Result<(), PostError> {
        debug!("unlike_post post={post_id} user={}", caller.user_id);
        self.within(async {
            match self.posts.remove_like(post_id, &caller.user_id).await? {
                SetMutation::Applied => Ok(()),
                SetMutation::Unchanged => Err(PostError::conflict("post not liked")),
                SetMutation::Missing => Err(PostError::not_found(EntityKind::Post, post_id)),
            }
        })
        .await
    }

    /// Appends a comment by `caller` and returns it.
    pub async fn add_comment(&self, post_id: &str, caller: &Caller, text: &str) -> Result<Comment, PostError> {
        debug!("add_comment post={post_id} user={}", caller.user_id);
        self.within(async {
            if text.trim().is_empty() {
                return Err(PostError::Validation(ValidationError::single(
                    "text",
                    "validation.required",
                    "is required",
                )));
            }
            for _ in 0..COMMENT_ID_ATTEMPTS {
                let comment = Comment::new(&caller.user_id, text, Utc::now());
                match self.posts.append_comment(post_id, comment.clone()).await? {
                    SetMutation::Applied => return Ok(comment),
                    SetMutation::Missing => return Err(PostError::not_found(EntityKind::Post, post_id)),
                    SetMutation::Unchanged => debug!("comment id {} collided on post {post_id}", comment.id),
                }
            }
            Err(PostError::conflict("could not allocate a unique comment id"))
        })
        .await
    }

    /// Removes a comment; only its author or an admin may do so.
    pub async fn delete_comment(&self, post_id: &str, comment_id: &str, caller: &Caller) -> Result<(), PostError> {
        debug!("delete_comment post={post_id} comment={comment_id} caller={}", caller.user_id);
        self.within(async {
            let post = self.require_post(post_id).await?;
            let comment = post
                .comment(comment_id)
                .ok_or_else(|| PostError::not_found(EntityKind::Comment, comment_id))?;
            if !caller.may_modify(&comment.user) {
                return Err(PostError::forbidden("only the comment author or an admin may delete this comment"));
            }
            match self.posts.remove_comment(post_id, comment_id).await? {
                SetMutation::Applied => Ok(()),
                SetMutation::Unchanged => Err(PostError::not_found(EntityKind::Comment, comment_id)),
                SetMutation::Missing => Err(PostError::not_found(EntityKind::Post, post_id)),
            }
        })
        .await
    }

    /// Likers in ascending user-id order.
    pub async fn fetch_likes(&self, post_id: &str) -> Result<Vec<LikerView>, PostError> {
        debug!("fetch_likes post={post_id}");
        self.within(async {
            let post = self.require_post(post_id).await?;
            Ok::<_, PostError>(project_likes(&self.identity, &post).await?)
        })
        .await
    }

    /// Comments in insertion order.
    pub async fn fetch_comments(&self, post_id: &str) -> Result<Vec<CommentView>, PostError> {
        debug!("fetch_comments post={post_id}");
        self.within(async {
            let post = self.require_post(post_id).await?;
            Ok::<_, PostError>(project_comments(&self.identity, post.comments).await?)
        })
        .await
    }
}
