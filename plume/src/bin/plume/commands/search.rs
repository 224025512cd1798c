use anyhow::Result;
use clap::Args;

use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Search",
    commands: &[
        "plume search nepal      # Title, category or author match",
        "plume search amy        # Every post by users named like 'amy'",
        "plume --output compact search 'c++'",
    ],
}];

#[derive(Args)]
pub struct SearchArgs {
    /// Case-insensitive text to look for
    pub query: String,
}

pub async fn handle_search(args: SearchArgs, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let manager = ctx.manager().await?;
    let posts = manager.search(&args.query).await?;
    output.info(&format!("{} post(s) match '{}'", posts.len(), args.query.trim()));
    output.display(&posts)?;
    Ok(())
}
