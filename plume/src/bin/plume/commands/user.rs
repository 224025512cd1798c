use anyhow::Result;
use clap::Subcommand;
use plume::{NewUser, Role};

use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Register",
        commands: &[
            "plume user create --username amy --name Amy --email amy@example.com",
            "plume user create --username root --name Ops --email ops@example.com --role admin",
        ],
    },
    ExampleGroup {
        title: "Inspect",
        commands: &[
            "plume user show <USER_ID>",
            "plume user posts <USER_ID>      # Authored posts, oldest first",
        ],
    },
];

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    #[command(name = "create")]
    Create {
        #[arg(long)]
        username: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "user")]
        role: Role,

        /// URL of an already uploaded picture
        #[arg(long)]
        profile_picture: Option<String>,
    },

    /// Show a user with relation counts
    #[command(name = "show")]
    Show { id: String },

    /// List the posts a user authored
    #[command(name = "posts")]
    Posts { id: String },
}

pub async fn handle_user_commands(command: UserCommands, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let manager = ctx.manager().await?;

    match command {
        UserCommands::Create {
            username,
            name,
            email,
            role,
            profile_picture,
        } => {
            let mut new_user = NewUser::new(username, name, email).with_role(role);
            if let Some(url) = profile_picture {
                new_user = new_user.with_profile_picture(url);
            }
            let user = manager.register_user(new_user).await?;
            output.success(&format!("Created user @{}", user.username));
            output.display(&user)?;
        }
        UserCommands::Show { id } => {
            let user = manager.get_user(&id).await?;
            output.display(&user)?;
        }
        UserCommands::Posts { id } => {
            let posts = manager.list_user_posts(&id).await?;
            output.display(&posts)?;
        }
    }

    Ok(())
}
