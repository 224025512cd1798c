//! Plume core library.
//!
//! Post aggregates with likes and comments, the users that own and favourite
//! them, and the [`PostManager`] that keeps the two consistent. Stores come in
//! an in-memory flavour and a Redis flavour driven by Lua scripts.
//!
//! ```ignore
//! use plume::{Caller, MediaInput, MemoryIdentityStore, MemoryPostStore, NewUser, PostDraft, PostManager};
//!
//! let manager = PostManager::new(MemoryIdentityStore::new(), MemoryPostStore::new());
//! let amy = manager.register_user(NewUser::new("amy", "Amy", "amy@example.com")).await?;
//! let caller = Caller::user(&amy.id);
//! let draft = PostDraft::new("Hiking in Nepal", "Day one", MediaInput::image("https://cdn.example.com/1.jpg"));
//! let post = manager.create_post(&caller, draft).await?;
//! manager.like_post(&post.id, &caller).await?;
//! ```

pub mod config;
pub mod errors;
pub mod id;
pub mod keys;
pub mod manager;
pub mod projection;
pub mod runtime;
pub mod search;
pub mod store;
pub mod types;
pub mod validators;

pub use config::{ConfigError, ManagerSettings, PlumeConfig, RedisSettings, StoreSettings};
pub use errors::*;
pub use keys::KeyContext;
pub use manager::PostManager;
pub use projection::{AuthorSummary, CommentAuthor, CommentView, LikerView, PostView};
pub use search::{PostFilter, SearchPattern};
pub use store::{
    IdentityStore, MemoryIdentityStore, MemoryPostStore, PostStore, RedisIdentityStore, RedisPostStore, SetMutation,
    UserSetField,
};
pub use types::{
    Caller, Comment, CommentId, Media, MediaInput, NewUser, Post, PostDraft, PostFields, PostId, Role, User, UserId,
};

pub use redis;
pub use redis::aio::ConnectionManager;
