mod commands;
mod context;
mod examples;
mod output;
mod theme;
mod utils;
mod views;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Style},
    },
};
use colored::{Color, Colorize, control::ShouldColorize};
use plume::PostError;
use std::fmt::Write;

use commands::{
    comment::{CommentCommands, handle_comment_commands},
    favourite::{FavouriteCommands, handle_favourite_commands},
    post::{PostCommands, handle_post_commands},
    search::{SearchArgs, handle_search},
    user::{UserCommands, handle_user_commands},
};
use context::CliContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENV_VARS: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL when no config file or --redis-url is given"),
    ("RUST_LOG", "Log filter, e.g. plume=debug"),
];

#[derive(Parser)]
#[command(name = "plume")]
#[command(version = "0.1.0")]
#[command(
    about = "Operator CLI for the Plume post store",
    long_about = r#"Operator CLI for the Plume post store that provides:

• Post publishing, editing and deletion with author/admin checks
• Likes, comments and favourites backed by atomic Redis scripts
• Search across titles, categories and author names

Commands:
  user       Register and inspect users
  post       Create, read, update, delete and like posts
  comment    Add, list and delete comments
  favourite  Manage a user's favourite posts
  search     Find posts by title, category or author
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Redis URL, overriding .plume/config.toml
    #[arg(long, global = true, value_name = "URL")]
    redis_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parses argv against the themed command tree; clap prints help and usage errors itself.
    fn parse_themed() -> Self {
        let color = ShouldColorize::from_env().should_colorize();
        themed_command(color)
            .try_get_matches()
            .and_then(|matches| Cli::from_arg_matches(&matches))
            .unwrap_or_else(|err| err.exit())
    }
}

fn themed_command(color: bool) -> Command {
    let mut root = Cli::command()
        .after_long_help(env_appendix(color))
        .color(if color { ColorChoice::Auto } else { ColorChoice::Never })
        .styles(help_styles());
    for entry in command_examples() {
        if let Some(sub) = root.find_subcommand_mut(entry.name) {
            *sub = sub.clone().after_long_help(examples_block(entry.groups, color));
        }
    }
    root
}

fn paint(text: &str, color: Color, bold: bool, enabled: bool) -> String {
    match (enabled, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    }
}

fn examples_block(groups: &[ExampleGroup], color: bool) -> String {
    let mut out = format!("{}\n", paint("Examples:", THEME.highlight, true, color));
    let arrow = paint(ICONS.arrow, THEME.secondary, false, color);
    let sections: Vec<String> = groups
        .iter()
        .map(|group| {
            let mut section = format!("  {}\n", paint(group.title, THEME.primary, true, color));
            for line in group.commands {
                let _ = writeln!(section, "    {arrow} {}", paint(line, THEME.secondary, false, color));
            }
            section
        })
        .collect();
    out.push_str(&sections.join("\n"));
    out
}

fn env_appendix(color: bool) -> String {
    let mut out = format!("{}\n", paint("Environment Variables:", THEME.highlight, true, color));
    for (name, about) in ENV_VARS {
        let _ = writeln!(
            out,
            "  {}  {}",
            paint(name, THEME.key, true, color),
            paint(about, THEME.value, false, color)
        );
    }
    let _ = writeln!(
        out,
        "\n{} {}",
        paint("Tip:", THEME.highlight, true, color),
        paint("Run 'plume <command> --help' for per-command examples.", THEME.secondary, false, color)
    );
    out
}

fn help_styles() -> Styles {
    let fg = |color: Color| Style::new().fg_color(Some(ansi(color).into()));
    Styles::styled()
        .usage(fg(THEME.primary).bold())
        .header(fg(THEME.highlight).bold())
        .literal(fg(THEME.secondary))
        .placeholder(fg(THEME.muted))
        .valid(fg(THEME.success))
        .invalid(fg(THEME.warning))
        .error(fg(THEME.error).bold())
}

/// Theme colors are all plain ANSI; anything else renders white.
fn ansi(color: Color) -> AnsiColor {
    match color {
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::Magenta => AnsiColor::Magenta,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightBlue => AnsiColor::BrightBlue,
        Color::BrightCyan => AnsiColor::BrightCyan,
        _ => AnsiColor::White,
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Register and inspect users
    #[command(subcommand)]
    User(UserCommands),

    /// Create, read, update, delete and like posts
    #[command(subcommand)]
    Post(PostCommands),

    /// Add, list and delete comments
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Manage favourite posts
    #[command(subcommand)]
    Favourite(FavouriteCommands),

    /// Find posts by title, category or author
    Search(SearchArgs),
}

/// `Error [<kind>]: <message>` for manager errors, plain text otherwise.
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PostError>() {
        Some(post_error) => format!("Error [{}]: {post_error}", post_error.kind()),
        None => format!("Error: {err:#}"),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_themed();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli, &output).await {
        eprintln!("{}", describe_error(&err));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let ctx = CliContext::find(cli.redis_url)?;
    match &ctx.config_path {
        Some(path) => output.verbose(&format!("Using config {}", path.display())),
        None => output.verbose("No .plume/config.toml found, using defaults"),
    }
    if let Some(limit) = ctx.config.manager.operation_timeout() {
        output.verbose(&format!("Operation deadline {limit:?}"));
    }

    match cli.command {
        Commands::User(command) => handle_user_commands(command, &ctx, output).await?,
        Commands::Post(command) => handle_post_commands(command, &ctx, output).await?,
        Commands::Comment(command) => handle_comment_commands(command, &ctx, output).await?,
        Commands::Favourite(command) => handle_favourite_commands(command, &ctx, output).await?,
        Commands::Search(args) => handle_search(args, &ctx, output).await?,
    }

    Ok(())
}
