use comfy_table::Table;
use plume::{Comment, CommentView, LikerView, Post, PostView, User};

use crate::{
    output::{GlobalOptions, TableDisplay, TableRow, record_table},
    theme::ICONS,
    utils::{format_datetime, join_or_dash, truncate},
};

const TITLE_WIDTH: usize = 40;
const TEXT_WIDTH: usize = 60;

impl TableDisplay for User {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        record_table(
            &[
                ("ID", self.id.clone()),
                ("Username", self.username.clone()),
                ("Name", self.name.clone()),
                ("Email", self.email.clone()),
                ("Role", format!("{:?}", self.role).to_lowercase()),
                ("Profile picture", self.profile_picture.clone().unwrap_or_else(|| "-".into())),
                ("Posts", self.posts.len().to_string()),
                ("Favourites", self.favourites.len().to_string()),
                ("Created", format_datetime(self.created_at)),
            ],
            options,
        )
    }

    fn to_compact(&self) -> String {
        format!("{} @{} {}", self.id, self.username, self.name)
    }
}

fn post_rows(post: &Post, author: String) -> Vec<(&'static str, String)> {
    let media_kind = if post.media.is_video { "video" } else { "image" };
    vec![
        ("ID", post.id.clone()),
        ("Title", post.title.clone()),
        ("Author", author),
        ("Content", truncate(&post.content, TEXT_WIDTH)),
        ("Media", format!("{} ({media_kind})", post.media.url)),
        ("Categories", join_or_dash(&post.categories)),
        ("Published", post.is_published.to_string()),
        ("Likes", post.likes.len().to_string()),
        ("Comments", post.comments.len().to_string()),
        ("Created", format_datetime(post.created_at)),
        ("Updated", format_datetime(post.updated_at)),
    ]
}

impl TableDisplay for Post {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        record_table(&post_rows(self, self.author.clone()), options)
    }

    fn to_compact(&self) -> String {
        TableRow::compact(self)
    }
}

impl TableRow for Post {
    const HEADERS: &'static [&'static str] = &["ID", "Title", "Author", "Categories", "Likes", "Comments"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate(&self.title, TITLE_WIDTH),
            self.author.clone(),
            join_or_dash(&self.categories),
            self.likes.len().to_string(),
            self.comments.len().to_string(),
        ]
    }

    fn compact(&self) -> String {
        format!("{} {} {} {}", self.id, self.title, ICONS.heart, self.likes.len())
    }
}

fn author_label(view: &PostView) -> String {
    view.author
        .as_ref()
        .map(|author| format!("{} (@{})", author.name, author.username))
        .unwrap_or_else(|| "[deleted user]".to_string())
}

impl TableDisplay for PostView {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let rows = [
            ("ID", self.id.clone()),
            ("Title", self.title.clone()),
            ("Author", author_label(self)),
            ("Content", truncate(&self.content, TEXT_WIDTH)),
            (
                "Media",
                format!("{} ({})", self.media.url, if self.media.is_video { "video" } else { "image" }),
            ),
            ("Categories", join_or_dash(&self.categories)),
            ("Published", self.is_published.to_string()),
            ("Likes", self.likes.len().to_string()),
            ("Comments", self.comments.len().to_string()),
            ("Created", format_datetime(self.created_at)),
            ("Updated", format_datetime(self.updated_at)),
        ];
        record_table(&rows, options)
    }

    fn to_compact(&self) -> String {
        TableRow::compact(self)
    }
}

impl TableRow for PostView {
    const HEADERS: &'static [&'static str] = &["ID", "Title", "Author", "Categories", "Likes", "Comments"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate(&self.title, TITLE_WIDTH),
            author_label(self),
            join_or_dash(&self.categories),
            self.likes.len().to_string(),
            self.comments.len().to_string(),
        ]
    }

    fn compact(&self) -> String {
        let username = self.author.as_ref().map(|author| author.username.as_str()).unwrap_or("?");
        format!("{} {} @{username} {} {}", self.id, self.title, ICONS.heart, self.likes.len())
    }
}

impl TableDisplay for Comment {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        record_table(
            &[
                ("ID", self.id.clone()),
                ("User", self.user.clone()),
                ("Text", truncate(&self.text, TEXT_WIDTH)),
                ("Created", format_datetime(self.created_at)),
            ],
            options,
        )
    }

    fn to_compact(&self) -> String {
        format!("{} {}: {}", self.id, self.user, self.text)
    }
}

impl TableRow for CommentView {
    const HEADERS: &'static [&'static str] = &["ID", "User", "Text", "Created"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            commenter(self),
            truncate(&self.text, TEXT_WIDTH),
            format_datetime(self.created_at),
        ]
    }

    fn compact(&self) -> String {
        format!("{} {}: {}", self.id, commenter(self), self.text)
    }
}

fn commenter(view: &CommentView) -> String {
    view.user
        .as_ref()
        .map(|user| format!("@{}", user.username))
        .unwrap_or_else(|| "[deleted user]".to_string())
}

impl TableRow for LikerView {
    const HEADERS: &'static [&'static str] = &["ID", "Username", "Profile picture"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.username.clone(),
            self.profile_picture.clone().unwrap_or_else(|| "-".into()),
        ]
    }

    fn compact(&self) -> String {
        format!("{} @{}", self.id, self.username)
    }
}
