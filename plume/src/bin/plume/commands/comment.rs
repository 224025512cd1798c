use anyhow::Result;
use clap::Subcommand;

use super::CallerArgs;
use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Comments",
    commands: &[
        "plume comment add <POST_ID> --as <USER_ID> 'Great trip!'",
        "plume comment list <POST_ID>",
        "plume comment delete <POST_ID> <COMMENT_ID> --as <USER_ID>",
        "plume comment delete <POST_ID> <COMMENT_ID> --as <ADMIN_ID> --role admin",
    ],
}];

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a post
    #[command(name = "add")]
    Add {
        post: String,

        #[command(flatten)]
        caller: CallerArgs,

        text: String,
    },

    /// List a post's comments in order
    #[command(name = "list")]
    List { post: String },

    /// Delete a comment (its author or an admin)
    #[command(name = "delete")]
    Delete {
        post: String,

        comment: String,

        #[command(flatten)]
        caller: CallerArgs,
    },
}

pub async fn handle_comment_commands(
    command: CommentCommands,
    ctx: &CliContext,
    output: &OutputManager,
) -> Result<()> {
    let manager = ctx.manager().await?;

    match command {
        CommentCommands::Add { post, caller, text } => {
            let comment = manager.add_comment(&post, &caller.caller(), &text).await?;
            output.success(&format!("Added comment {}", comment.id));
            output.display(&comment)?;
        }
        CommentCommands::List { post } => {
            let comments = manager.fetch_comments(&post).await?;
            output.display(&comments)?;
        }
        CommentCommands::Delete { post, comment, caller } => {
            manager.delete_comment(&post, &comment, &caller.caller()).await?;
            output.success(&format!("Deleted comment {comment}"));
        }
    }

    Ok(())
}
