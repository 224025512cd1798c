//! Redis-backed stores.
//!
//! Documents are plain JSON strings under `{prefix}:{service}:{collection}:{id}`.
//! Collections that change concurrently live beside the document in their own
//! keys so every conditional write is a single server-side script:
//!
//! | Key                                   | Type | Holds                       |
//! |---------------------------------------|------|-----------------------------|
//! | `rel:likes:{post}`                    | set  | liker user ids              |
//! | `rel:comments:{post}`                 | hash | comment id to comment JSON  |
//! | `rel:comment_order:{post}`            | list | comment ids, oldest first   |
//! | `rel:posts:{user}`                    | list | authored post ids           |
//! | `rel:favourites:{user}`               | set  | favourite post ids          |
//! | `rel:favourites_reverse:{post}`       | set  | users holding the favourite |
//! | `users:unique:username:{lowercased}`  | str  | owning user id              |

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, cmd};
use serde::{Deserialize, Serialize};

use crate::{
    errors::StoreError,
    keys::{KeyContext, POSTS, USERS},
    runtime::{
        ScriptReply, execute_command,
        commands::{
            CommentAppend, CommentRemove, FavouritesPurge, PostDelete, SetMembership, SetOp, StoreCommand, UserCreate,
        },
    },
    search::{PostFilter, SearchPattern},
    store::{IdentityStore, PostStore, SetMutation, UserSetField},
    types::{Comment, Media, NewUser, Post, PostFields, Role, User, UserId},
};

const SCAN_COUNT: usize = 1024;

const LIKES: &str = "likes";
const COMMENTS: &str = "comments";
const COMMENT_ORDER: &str = "comment_order";
const FAVOURITES: &str = "favourites";

/// Opens a managed connection that reconnects on failure.
pub async fn connect(url: &str) -> Result<ConnectionManager, StoreError> {
    let client = redis::Client::open(url)?;
    Ok(ConnectionManager::new(client).await?)
}

/// User document without its relation keys.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    id: UserId,
    username: String,
    name: String,
    email: String,
    #[serde(default)]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserDocument {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
        }
    }

    fn into_user(self, posts: Vec<String>, favourites: Vec<String>) -> User {
        User {
            id: self.id,
            username: self.username,
            name: self.name,
            email: self.email,
            role: self.role,
            profile_picture: self.profile_picture,
            posts,
            favourites: favourites.into_iter().collect(),
            created_at: self.created_at,
        }
    }
}

/// Post document without likes and comments.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDocument {
    id: String,
    author: UserId,
    title: String,
    content: String,
    media: Media,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostDocument {
    fn from_post(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            author: post.author.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            media: post.media.clone(),
            categories: post.categories.clone(),
            is_published: post.is_published,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    fn apply(&mut self, fields: PostFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.content = fields.content;
        self.media = fields.media;
        self.categories = fields.categories;
        self.is_published = fields.is_published;
        self.updated_at = now;
    }

    fn into_post(self, likes: BTreeSet<UserId>, comments: Vec<Comment>) -> Post {
        Post {
            id: self.id,
            author: self.author,
            title: self.title,
            content: self.content,
            media: self.media,
            categories: self.categories,
            is_published: self.is_published,
            likes,
            comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn set_mutation(reply: ScriptReply) -> SetMutation {
    match reply {
        ScriptReply::EntityNotFound => SetMutation::Missing,
        other => SetMutation::from_flag(other.applied()),
    }
}

/// Collects every key matching `pattern`, skipping keys under `exclude_prefix`.
async fn scan_keys(
    conn: &mut ConnectionManager,
    pattern: &str,
    exclude_prefix: &str,
) -> Result<Vec<String>, StoreError> {
    let mut cursor: u64 = 0;
    let mut keys = Vec::new();
    loop {
        let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(SCAN_COUNT)
            .query_async(conn)
            .await?;
        keys.extend(batch.into_iter().filter(|key| !key.starts_with(exclude_prefix)));
        cursor = next_cursor;
        if cursor == 0 {
            break;
        }
    }
    keys.sort();
    keys.dedup();
    Ok(keys)
}

#[derive(Clone)]
pub struct RedisIdentityStore {
    conn: ConnectionManager,
    keys: KeyContext,
}

impl RedisIdentityStore {
    pub fn new(conn: ConnectionManager, keys: KeyContext) -> Self {
        Self { conn, keys }
    }

    fn user_key(&self, user_id: &str) -> String {
        self.keys.entity(USERS, user_id)
    }

    fn unique_prefix(&self) -> String {
        format!("{}unique", self.keys.entity(USERS, ""))
    }

    fn membership(&self, user_id: &str, field: UserSetField, post_id: &str, op: SetOp) -> StoreCommand {
        let (ordered, reverse_key, reverse_member) = match field {
            UserSetField::Posts => (true, None, None),
            UserSetField::Favourites => (
                false,
                Some(self.keys.relation_reverse(FAVOURITES, post_id)),
                Some(user_id.to_string()),
            ),
        };
        StoreCommand::MutateSet(SetMembership {
            owner_key: self.user_key(user_id),
            set_key: self.keys.relation(field.as_str(), user_id),
            member: post_id.to_string(),
            op,
            ordered,
            reverse_key,
            reverse_member,
        })
    }
}

impl IdentityStore for RedisIdentityStore {
    async fn create_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let user = user.into_user(Utc::now());
        let command = StoreCommand::CreateUser(UserCreate {
            key: self.user_key(&user.id),
            username_key: self.keys.username_index(&user.username),
            user_id: user.id.clone(),
            payload_json: serde_json::to_string(&UserDocument::from_user(&user))?,
        });
        let mut conn = self.conn.clone();
        match execute_command(&mut conn, &command).await? {
            ScriptReply::UniqueViolation => Ok(None),
            ScriptReply::Done(_) => Ok(Some(user)),
            ScriptReply::EntityNotFound => Err(StoreError::Script {
                code: "create_user: entity_not_found".into(),
            }),
        }
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn.clone();
        let (doc, posts, favourites): (Option<String>, Vec<String>, Vec<String>) = redis::pipe()
            .atomic()
            .cmd("GET")
            .arg(self.user_key(id))
            .cmd("LRANGE")
            .arg(self.keys.relation(UserSetField::Posts.as_str(), id))
            .arg(0)
            .arg(-1)
            .cmd("SMEMBERS")
            .arg(self.keys.relation(UserSetField::Favourites.as_str(), id))
            .query_async(&mut conn)
            .await?;
        let Some(doc) = doc else {
            return Ok(None);
        };
        let doc: UserDocument = serde_json::from_str(&doc)?;
        Ok(Some(doc.into_user(posts, favourites)))
    }

    async fn find_users_by_pattern(&self, pattern: &SearchPattern) -> Result<Vec<UserId>, StoreError> {
        let mut conn = self.conn.clone();
        let keys = scan_keys(&mut conn, &self.keys.collection_pattern(USERS), &self.unique_prefix()).await?;
        let mut hits = Vec::new();
        for chunk in keys.chunks(SCAN_COUNT) {
            let docs: Vec<Option<String>> = cmd("MGET").arg(chunk).query_async(&mut conn).await?;
            for doc in docs.into_iter().flatten() {
                let doc: UserDocument = serde_json::from_str(&doc)?;
                if pattern.is_match(&doc.name) || pattern.is_match(&doc.username) {
                    hits.push(doc.id);
                }
            }
        }
        Ok(hits)
    }

    async fn add_to_set(&self, user_id: &str, field: UserSetField, post_id: &str) -> Result<SetMutation, StoreError> {
        let mut conn = self.conn.clone();
        let command = self.membership(user_id, field, post_id, SetOp::Add);
        Ok(set_mutation(execute_command(&mut conn, &command).await?))
    }

    async fn remove_from_set(
        &self,
        user_id: &str,
        field: UserSetField,
        post_id: &str,
    ) -> Result<SetMutation, StoreError> {
        let mut conn = self.conn.clone();
        let command = self.membership(user_id, field, post_id, SetOp::Remove);
        Ok(set_mutation(execute_command(&mut conn, &command).await?))
    }

    async fn remove_from_all_favourites(&self, post_id: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let command = StoreCommand::PurgeFavourites(FavouritesPurge {
            reverse_key: self.keys.relation_reverse(FAVOURITES, post_id),
            favourites_prefix: self.keys.relation_prefix(FAVOURITES),
            post_id: post_id.to_string(),
        });
        Ok(execute_command(&mut conn, &command).await?.counter("removed"))
    }
}

#[derive(Clone)]
pub struct RedisPostStore {
    conn: ConnectionManager,
    keys: KeyContext,
}

impl RedisPostStore {
    pub fn new(conn: ConnectionManager, keys: KeyContext) -> Self {
        Self { conn, keys }
    }

    fn post_key(&self, post_id: &str) -> String {
        self.keys.entity(POSTS, post_id)
    }

    fn like_command(&self, post_id: &str, user_id: &str, op: SetOp) -> StoreCommand {
        StoreCommand::MutateSet(SetMembership {
            owner_key: self.post_key(post_id),
            set_key: self.keys.relation(LIKES, post_id),
            member: user_id.to_string(),
            op,
            ordered: false,
            reverse_key: None,
            reverse_member: None,
        })
    }

    async fn load(&self, conn: &mut ConnectionManager, post_id: &str) -> Result<Option<Post>, StoreError> {
        let (doc, likes, order, comments): (Option<String>, Vec<String>, Vec<String>, HashMap<String, String>) =
            redis::pipe()
                .atomic()
                .cmd("GET")
                .arg(self.post_key(post_id))
                .cmd("SMEMBERS")
                .arg(self.keys.relation(LIKES, post_id))
                .cmd("LRANGE")
                .arg(self.keys.relation(COMMENT_ORDER, post_id))
                .arg(0)
                .arg(-1)
                .cmd("HGETALL")
                .arg(self.keys.relation(COMMENTS, post_id))
                .query_async(conn)
                .await?;
        let Some(doc) = doc else {
            return Ok(None);
        };
        let doc: PostDocument = serde_json::from_str(&doc)?;
        let mut thread = Vec::with_capacity(order.len());
        for comment_id in order {
            if let Some(raw) = comments.get(&comment_id) {
                thread.push(serde_json::from_str::<Comment>(raw)?);
            }
        }
        Ok(Some(doc.into_post(likes.into_iter().collect(), thread)))
    }

    async fn load_all(&self, conn: &mut ConnectionManager) -> Result<Vec<Post>, StoreError> {
        let key_prefix = self.post_key("");
        let unique_prefix = format!("{key_prefix}unique");
        let keys = scan_keys(conn, &self.keys.collection_pattern(POSTS), &unique_prefix).await?;
        let mut posts = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(post_id) = key.strip_prefix(&key_prefix) else {
                continue;
            };
            if let Some(post) = self.load(conn, post_id).await? {
                posts.push(post);
            }
        }
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }
}

impl PostStore for RedisPostStore {
    async fn create(&self, post: Post) -> Result<Post, StoreError> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(&PostDocument::from_post(&post))?;
        let written: Option<String> = cmd("SET")
            .arg(self.post_key(&post.id))
            .arg(json)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        if written.is_none() {
            return Err(StoreError::other(format!("post id {} already exists", post.id)));
        }
        Ok(post)
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let mut conn = self.conn.clone();
        self.load(&mut conn, id).await
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut conn = self.conn.clone();
        self.load_all(&mut conn).await
    }

    async fn update_fields(
        &self,
        id: &str,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.post_key(id);
        let current: Option<String> = cmd("GET").arg(&key).query_async(&mut conn).await?;
        let Some(current) = current else {
            return Ok(None);
        };
        let mut doc: PostDocument = serde_json::from_str(&current)?;
        doc.apply(fields, updated_at);
        // XX keeps a concurrent delete from being undone.
        let written: Option<String> = cmd("SET")
            .arg(&key)
            .arg(serde_json::to_string(&doc)?)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        if written.is_none() {
            return Ok(None);
        }
        self.load(&mut conn, id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let command = StoreCommand::DeletePost(PostDelete {
            key: self.post_key(id),
            likes_key: self.keys.relation(LIKES, id),
            comments_key: self.keys.relation(COMMENTS, id),
            order_key: self.keys.relation(COMMENT_ORDER, id),
        });
        Ok(execute_command(&mut conn, &command).await?.applied())
    }

    async fn add_like(&self, id: &str, user_id: &str) -> Result<SetMutation, StoreError> {
        let mut conn = self.conn.clone();
        let command = self.like_command(id, user_id, SetOp::Add);
        Ok(set_mutation(execute_command(&mut conn, &command).await?))
    }

    async fn remove_like(&self, id: &str, user_id: &str) -> Result<SetMutation, StoreError> {
        let mut conn = self.conn.clone();
        let command = self.like_command(id, user_id, SetOp::Remove);
        Ok(set_mutation(execute_command(&mut conn, &command).await?))
    }

    async fn append_comment(&self, id: &str, comment: Comment) -> Result<SetMutation, StoreError> {
        let mut conn = self.conn.clone();
        let command = StoreCommand::AppendComment(CommentAppend {
            key: self.post_key(id),
            comments_key: self.keys.relation(COMMENTS, id),
            order_key: self.keys.relation(COMMENT_ORDER, id),
            comment_id: comment.id.clone(),
            comment_json: serde_json::to_string(&comment)?,
        });
        Ok(set_mutation(execute_command(&mut conn, &command).await?))
    }

    async fn remove_comment(&self, id: &str, comment_id: &str) -> Result<SetMutation, StoreError> {
        let mut conn = self.conn.clone();
        let command = StoreCommand::RemoveComment(CommentRemove {
            key: self.post_key(id),
            comments_key: self.keys.relation(COMMENTS, id),
            order_key: self.keys.relation(COMMENT_ORDER, id),
            comment_id: comment_id.to_string(),
        });
        Ok(set_mutation(execute_command(&mut conn, &command).await?))
    }

    async fn find_matching(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        let mut conn = self.conn.clone();
        let mut posts = self.load_all(&mut conn).await?;
        posts.retain(|post| filter.matches(post));
        Ok(posts)
    }
}
