/// Redis key layout shared by the identity and post stores.
#[derive(Debug, Clone)]
pub struct KeyContext {
    pub prefix: String,
    pub service: String,
}

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";

impl KeyContext {
    pub fn new(prefix: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
        }
    }

    pub fn entity(&self, collection: &str, entity_id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, collection, entity_id)
    }

    /// SCAN pattern matching every document of a collection.
    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}:{}:{}:*", self.prefix, self.service, collection)
    }

    pub fn relation(&self, alias: &str, left_id: &str) -> String {
        format!("{}:{}:rel:{}:{}", self.prefix, self.service, alias, left_id)
    }

    /// Prefix of [`KeyContext::relation`] keys, for scripts that derive keys from ids.
    pub fn relation_prefix(&self, alias: &str) -> String {
        format!("{}:{}:rel:{}:", self.prefix, self.service, alias)
    }

    pub fn relation_reverse(&self, alias: &str, right_id: &str) -> String {
        format!("{}:{}:rel:{}_reverse:{}", self.prefix, self.service, alias, right_id)
    }

    /// Index from a lowercased username to the owning user id.
    pub fn username_index(&self, username: &str) -> String {
        format!(
            "{}:{}:{}:unique:username:{}",
            self.prefix,
            self.service,
            USERS,
            username.to_lowercase()
        )
    }
}
