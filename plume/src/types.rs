//! Domain model for users, posts and their embedded comments.
//!
//! Serialized field names follow the public document shape (`isPublished`,
//! `isVideo`, `createdAt`), which is also the layout the Redis store persists.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::{
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::generate_entity_id,
    validators::{is_valid_email, is_valid_url, require_text},
};

pub type UserId = String;
pub type PostId = String;
pub type CommentId = String;

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Verified identity of whoever invokes a manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner-or-admin rule shared by post edits, post deletes and comment deletes.
    pub fn may_modify(&self, owner_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Owned back-references, in creation order.
    #[serde(default)]
    pub posts: Vec<PostId>,
    /// Weak references; may briefly point at deleted posts.
    #[serde(default)]
    pub favourites: BTreeSet<PostId>,
    pub created_at: DateTime<Utc>,
}

/// Registration input for the identity store.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            email: email.into(),
            role: Role::User,
            profile_picture: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text("username", &self.username, &mut issues);
        require_text("name", &self.name, &mut issues);
        if !is_valid_email(self.email.trim()) {
            issues.push(ValidationIssue::new("email", "validation.email", "must be a valid email address"));
        }
        if let Some(picture) = &self.profile_picture
            && !is_valid_url(picture)
        {
            issues.push(ValidationIssue::new("profilePicture", "validation.url", "must be a valid URL"));
        }
        finish(issues)
    }

    /// Builds the stored user with a fresh id and empty relations.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: generate_entity_id(),
            username: self.username.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role,
            profile_picture: self.profile_picture,
            posts: Vec::new(),
            favourites: BTreeSet::new(),
            created_at: now,
        }
    }
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub is_video: bool,
}

/// Media reference as supplied by a caller; the upload already happened.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInput {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_video: Option<bool>,
}

impl MediaInput {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            is_video: None,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            is_video: Some(true),
        }
    }
}

/// Create/update payload for a post.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub media: Option<MediaInput>,
    #[serde(default)]
    pub is_published: bool,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, media: MediaInput) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            categories: Vec::new(),
            media: Some(media),
            is_published: false,
        }
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }

    /// Checks required fields and resolves defaults, reporting every problem at once.
    pub fn validate(self) -> ValidationResult<PostFields> {
        let mut issues = Vec::new();
        require_text("title", &self.title, &mut issues);
        require_text("content", &self.content, &mut issues);

        let media = match self.media {
            Some(MediaInput { url: Some(url), is_video }) if !url.trim().is_empty() => {
                let url = url.trim().to_string();
                if !is_valid_url(&url) {
                    issues.push(ValidationIssue::new("media.url", "validation.url", "must be a valid URL"));
                }
                Some(Media {
                    url,
                    is_video: is_video.unwrap_or(false),
                })
            }
            _ => {
                issues.push(ValidationIssue::new("media.url", "validation.required", "is required"));
                None
            }
        };

        finish(issues)?;
        let media = media.ok_or_else(|| ValidationError::single("media.url", "validation.required", "is required"))?;
        Ok(PostFields {
            title: self.title,
            content: self.content,
            media,
            categories: self.categories,
            is_published: self.is_published,
        })
    }
}

/// The replaceable part of a post, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub media: Media,
    pub categories: Vec<String>,
    pub is_published: bool,
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    /// Immutable after creation.
    pub author: UserId,
    pub title: String,
    pub content: String,
    pub media: Media,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub likes: BTreeSet<UserId>,
    /// Insertion order is chronological order.
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author: impl Into<UserId>, fields: PostFields, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_entity_id(),
            author: author.into(),
            title: fields.title,
            content: fields.content,
            media: fields.media,
            categories: fields.categories,
            is_published: fields.is_published,
            likes: BTreeSet::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields and refreshes `updated_at`.
    pub fn apply(&mut self, fields: PostFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.content = fields.content;
        self.media = fields.media;
        self.categories = fields.categories;
        self.is_published = fields.is_published;
        self.updated_at = now;
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.contains(user_id)
    }
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user: impl Into<UserId>, text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_entity_id(),
            user: user.into(),
            text: text.into(),
            created_at: now,
        }
    }
}

fn finish(issues: Vec<ValidationIssue>) -> ValidationResult<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(issues))
    }
}
