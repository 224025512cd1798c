//! # Pattern matching for post search
//!
//! Search is a two-stage join without an index: users whose `name` or
//! `username` contains the query select a set of author ids, then posts match
//! when their `title` contains the query, any category contains it, or their
//! author is in that set.
//!
//! | Field        | Match rule                                  |
//! |--------------|---------------------------------------------|
//! | `title`      | case-insensitive substring                  |
//! | `categories` | any entry is a case-insensitive substring   |
//! | `author`     | member of the author id set                 |
//! | user `name` / `username` | case-insensitive substring      |
//!
//! The query is matched literally: regex metacharacters in it are escaped, so
//! `c++` finds posts about C++ instead of failing to compile.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::{
    errors::{ValidationError, ValidationResult},
    types::{Post, User, UserId},
};

/// Upper bound on the compiled pattern size; queries are short substrings.
const PATTERN_SIZE_LIMIT: usize = 1 << 16;

/// A validated, case-insensitive literal substring matcher.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    query: String,
    regex: Regex,
}

impl SearchPattern {
    pub fn new(query: &str) -> ValidationResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::single("query", "validation.required", "is required"));
        }
        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|_| ValidationError::single("query", "validation.length", "is too long"))?;
        Ok(Self {
            query: query.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn matches_user(&self, user: &User) -> bool {
        self.is_match(&user.name) || self.is_match(&user.username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSearchField {
    Title,
    Categories,
}

/// Disjunction evaluated by [`crate::store::PostStore::find_matching`].
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub pattern: SearchPattern,
    pub fields: Vec<PostSearchField>,
    pub authors: BTreeSet<UserId>,
}

impl PostFilter {
    /// Matches `title` and `categories`, with no author clause.
    pub fn new(pattern: SearchPattern) -> Self {
        Self {
            pattern,
            fields: vec![PostSearchField::Title, PostSearchField::Categories],
            authors: BTreeSet::new(),
        }
    }

    pub fn with_authors<I>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        self.authors.extend(authors);
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        let field_hit = self.fields.iter().any(|field| match field {
            PostSearchField::Title => self.pattern.is_match(&post.title),
            PostSearchField::Categories => post.categories.iter().any(|category| self.pattern.is_match(category)),
        });
        field_hit || self.authors.contains(&post.author)
    }
}
