use redis::aio::ConnectionLike;
use serde_json::Value;

use crate::{
    errors::StoreError,
    runtime::{
        commands::StoreCommand,
        scripts::{
            COMMENT_APPEND_SCRIPT, COMMENT_REMOVE_SCRIPT, FAVOURITES_PURGE_SCRIPT, POST_DELETE_SCRIPT,
            SET_MEMBERSHIP_SCRIPT, USER_CREATE_SCRIPT,
        },
    },
};

/// Decoded answer of a store script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptReply {
    /// The script ran; the JSON object carries `applied` and any counters.
    Done(Value),
    /// The owning document did not exist, nothing was written.
    EntityNotFound,
    /// A uniqueness guard rejected the write.
    UniqueViolation,
}

impl ScriptReply {
    pub fn applied(&self) -> bool {
        match self {
            ScriptReply::Done(value) => value.get("applied").and_then(Value::as_bool).unwrap_or(false),
            _ => false,
        }
    }

    pub fn counter(&self, field: &str) -> u64 {
        match self {
            ScriptReply::Done(value) => value.get(field).and_then(Value::as_u64).unwrap_or(0),
            _ => 0,
        }
    }
}

/// Runs one command atomically on the Redis server via its Lua script.
pub async fn execute_command<C>(conn: &mut C, command: &StoreCommand) -> Result<ScriptReply, StoreError>
where
    C: ConnectionLike + Send,
{
    let script = match command {
        StoreCommand::CreateUser(_) => &*USER_CREATE_SCRIPT,
        StoreCommand::MutateSet(_) => &*SET_MEMBERSHIP_SCRIPT,
        StoreCommand::AppendComment(_) => &*COMMENT_APPEND_SCRIPT,
        StoreCommand::RemoveComment(_) => &*COMMENT_REMOVE_SCRIPT,
        StoreCommand::DeletePost(_) => &*POST_DELETE_SCRIPT,
        StoreCommand::PurgeFavourites(_) => &*FAVOURITES_PURGE_SCRIPT,
    };

    let payload = serde_json::to_string(command)?;

    let mut invocation = script.prepare_invoke();
    invocation.arg(payload);
    let raw: String = invocation.invoke_async(conn).await?;

    let value: Value = serde_json::from_str(&raw)?;
    decode_reply(command.name(), value)
}

fn decode_reply(command: &str, value: Value) -> Result<ScriptReply, StoreError> {
    match value.get("error") {
        None => Ok(ScriptReply::Done(value)),
        Some(Value::String(code)) => match code.as_str() {
            "entity_not_found" => Ok(ScriptReply::EntityNotFound),
            "unique_constraint_violation" => Ok(ScriptReply::UniqueViolation),
            other => Err(StoreError::Script {
                code: format!("{command}: {other}"),
            }),
        },
        Some(_) => Err(StoreError::Script {
            code: format!("{command}: lua_error"),
        }),
    }
}
