use redis::Script;
use std::sync::LazyLock;

pub const USER_CREATE_SCRIPT_BODY: &str = include_str!("../../lua/user_create.lua");
pub const SET_MEMBERSHIP_SCRIPT_BODY: &str = include_str!("../../lua/set_membership.lua");
pub const COMMENT_APPEND_SCRIPT_BODY: &str = include_str!("../../lua/comment_append.lua");
pub const COMMENT_REMOVE_SCRIPT_BODY: &str = include_str!("../../lua/comment_remove.lua");
pub const POST_DELETE_SCRIPT_BODY: &str = include_str!("../../lua/post_delete.lua");
pub const FAVOURITES_PURGE_SCRIPT_BODY: &str = include_str!("../../lua/favourites_purge.lua");

pub static USER_CREATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(USER_CREATE_SCRIPT_BODY));
pub static SET_MEMBERSHIP_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(SET_MEMBERSHIP_SCRIPT_BODY));
pub static COMMENT_APPEND_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(COMMENT_APPEND_SCRIPT_BODY));
pub static COMMENT_REMOVE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(COMMENT_REMOVE_SCRIPT_BODY));
pub static POST_DELETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(POST_DELETE_SCRIPT_BODY));
pub static FAVOURITES_PURGE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(FAVOURITES_PURGE_SCRIPT_BODY));
