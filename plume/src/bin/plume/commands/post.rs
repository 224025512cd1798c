use anyhow::Result;
use clap::{Args, Subcommand};
use plume::{MediaInput, PostDraft};

use super::CallerArgs;
use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Publishing",
        commands: &[
            "plume post create --as <USER_ID> --title 'Hiking in Nepal' --content 'Day one' \\",
            "    --media-url https://cdn.example.com/1.jpg --category travel --category nepal --published",
            "plume post update <POST_ID> --as <USER_ID> --title 'Hiking in Nepal, part 2' ...",
            "plume post delete <POST_ID> --as <USER_ID>",
        ],
    },
    ExampleGroup {
        title: "Reading",
        commands: &[
            "plume post list",
            "plume post show <POST_ID>",
            "plume --output json post show <POST_ID>",
        ],
    },
    ExampleGroup {
        title: "Likes",
        commands: &[
            "plume post like <POST_ID> --as <USER_ID>",
            "plume post unlike <POST_ID> --as <USER_ID>",
            "plume post likes <POST_ID>",
        ],
    },
];

/// Editable post fields.
#[derive(Args, Debug, Clone)]
pub struct PostInputArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub content: String,

    /// URL of the already uploaded image or video
    #[arg(long)]
    pub media_url: String,

    /// Mark the media as a video
    #[arg(long)]
    pub video: bool,

    /// Category, repeatable
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    #[arg(long)]
    pub published: bool,
}

impl PostInputArgs {
    fn draft(self) -> PostDraft {
        let media = if self.video {
            MediaInput::video(self.media_url)
        } else {
            MediaInput::image(self.media_url)
        };
        PostDraft::new(self.title, self.content, media)
            .categories(self.categories)
            .published(self.published)
    }
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Create a post
    #[command(name = "create")]
    Create {
        #[command(flatten)]
        caller: CallerArgs,

        #[command(flatten)]
        input: PostInputArgs,
    },

    /// Show one post with its author
    #[command(name = "show")]
    Show { id: String },

    /// List every post, oldest first
    #[command(name = "list")]
    List,

    /// Replace the editable fields of a post
    #[command(name = "update")]
    Update {
        id: String,

        #[command(flatten)]
        caller: CallerArgs,

        #[command(flatten)]
        input: PostInputArgs,
    },

    /// Delete a post and detach it from its author and favourites
    #[command(name = "delete")]
    Delete {
        id: String,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// Like a post
    #[command(name = "like")]
    Like {
        id: String,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// Remove a like
    #[command(name = "unlike")]
    Unlike {
        id: String,

        #[command(flatten)]
        caller: CallerArgs,
    },

    /// List the users who liked a post
    #[command(name = "likes")]
    Likes { id: String },
}

pub async fn handle_post_commands(command: PostCommands, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let manager = ctx.manager().await?;

    match command {
        PostCommands::Create { caller, input } => {
            let post = manager.create_post(&caller.caller(), input.draft()).await?;
            output.success(&format!("Created post {}", post.id));
            output.display(&post)?;
        }
        PostCommands::Show { id } => {
            let post = manager.get_post(&id).await?;
            output.display(&post)?;
        }
        PostCommands::List => {
            let posts = manager.list_posts().await?;
            output.display(&posts)?;
        }
        PostCommands::Update { id, caller, input } => {
            let post = manager.update_post(&id, &caller.caller(), input.draft()).await?;
            output.success(&format!("Updated post {}", post.id));
            output.display(&post)?;
        }
        PostCommands::Delete { id, caller } => {
            manager.delete_post(&id, &caller.caller()).await?;
            output.success(&format!("Deleted post {id}"));
        }
        PostCommands::Like { id, caller } => {
            manager.like_post(&id, &caller.caller()).await?;
            output.success(&format!("Liked post {id}"));
        }
        PostCommands::Unlike { id, caller } => {
            manager.unlike_post(&id, &caller.caller()).await?;
            output.success(&format!("Removed like from post {id}"));
        }
        PostCommands::Likes { id } => {
            let likers = manager.fetch_likes(&id).await?;
            output.display(&likers)?;
        }
    }

    Ok(())
}
