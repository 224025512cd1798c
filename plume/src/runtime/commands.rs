use serde::Serialize;

/// One atomic store mutation, serialized as the payload of its Lua script.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCommand {
    CreateUser(UserCreate),
    MutateSet(SetMembership),
    AppendComment(CommentAppend),
    RemoveComment(CommentRemove),
    DeletePost(PostDelete),
    PurgeFavourites(FavouritesPurge),
}

/// Writes a user document unless the username index entry is taken.
#[derive(Debug, Serialize)]
pub struct UserCreate {
    pub key: String,
    pub username_key: String,
    pub user_id: String,
    pub payload_json: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetOp {
    Add,
    Remove,
}

/// Conditional add/remove of `member` in a set (or ordered list) owned by `owner_key`.
#[derive(Debug, Serialize)]
pub struct SetMembership {
    /// Document that must exist for the mutation to run.
    pub owner_key: String,
    pub set_key: String,
    pub member: String,
    pub op: SetOp,
    /// Keep insertion order in a list instead of a set.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ordered: bool,
    /// Reverse index updated only when the forward mutation applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_member: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentAppend {
    pub key: String,
    pub comments_key: String,
    pub order_key: String,
    pub comment_id: String,
    pub comment_json: String,
}

#[derive(Debug, Serialize)]
pub struct CommentRemove {
    pub key: String,
    pub comments_key: String,
    pub order_key: String,
    pub comment_id: String,
}

/// Deletes a post document together with its likes and comments.
#[derive(Debug, Serialize)]
pub struct PostDelete {
    pub key: String,
    pub likes_key: String,
    pub comments_key: String,
    pub order_key: String,
}

/// Removes `post_id` from every favourites set listed in the reverse index.
#[derive(Debug, Serialize)]
pub struct FavouritesPurge {
    pub reverse_key: String,
    pub favourites_prefix: String,
    pub post_id: String,
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::CreateUser(_) => "create_user",
            StoreCommand::MutateSet(_) => "mutate_set",
            StoreCommand::AppendComment(_) => "append_comment",
            StoreCommand::RemoveComment(_) => "remove_comment",
            StoreCommand::DeletePost(_) => "delete_post",
            StoreCommand::PurgeFavourites(_) => "purge_favourites",
        }
    }
}
