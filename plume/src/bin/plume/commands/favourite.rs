use anyhow::Result;
use clap::Subcommand;

use super::CallerArgs;
use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Favourites",
    commands: &[
        "plume favourite add <POST_ID> --as <USER_ID>",
        "plume favourite remove <POST_ID> --as <USER_ID>",
        "plume favourite list <USER_ID>     # Drops ids of deleted posts",
    ],
}];

#[derive(Subcommand)]
pub enum FavouriteCommands {
    /// Add a post to the caller's favourites
    #[command(name = "add")]
    Add {
        post: String,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// Remove a post from the caller's favourites
    #[command(name = "remove")]
    Remove {
        post: String,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// List a user's favourite posts
    #[command(name = "list")]
    List { user: String },
}

pub async fn handle_favourite_commands(
    command: FavouriteCommands,
    ctx: &CliContext,
    output: &OutputManager,
) -> Result<()> {
    let manager = ctx.manager().await?;

    match command {
        FavouriteCommands::Add { post, caller } => {
            manager.favourite_post(&post, &caller.caller()).await?;
            output.success(&format!("{} Added post {post} to favourites", ICONS.star));
        }
        FavouriteCommands::Remove { post, caller } => {
            manager.unfavourite_post(&post, &caller.caller()).await?;
            output.success(&format!("Removed post {post} from favourites"));
        }
        FavouriteCommands::List { user } => {
            let posts = manager.list_favourites(&user).await?;
            if posts.is_empty() {
                output.warning(&format!("User {user} has no favourites"));
            }
            output.display(&posts)?;
        }
    }

    Ok(())
}
