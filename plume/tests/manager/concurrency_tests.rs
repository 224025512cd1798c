use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use plume::{
    Comment, PostFields, PostFilter, PostStore, SetMutation, StoreError,
};

use crate::support::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_likes_from_one_user_apply_once() {
    let manager = Arc::new(manager());
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Popular", &[]).await;

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let post_id = post.id.clone();
            let caller = Caller::user(&bob.id);
            tokio::spawn(async move { manager.like_post(&post_id, &caller).await })
        })
        .collect();

    let mut applied = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(()) => applied += 1,
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Conflict, "unexpected error: {err}");
                conflicts += 1;
            }
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(conflicts, 49);

    let view = manager.get_post(&post.id).await.expect("get");
    assert_eq!(view.likes.len(), 1);
    assert!(view.likes.contains(&bob.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_likes_from_many_users_all_land() {
    let manager = Arc::new(manager());
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Popular", &[]).await;
    let mut fans = Vec::new();
    for index in 0..20 {
        fans.push(register(&manager, &format!("fan{index}"), "Fan").await);
    }

    let handles: Vec<_> = fans
        .iter()
        .map(|fan| {
            let manager = Arc::clone(&manager);
            let post_id = post.id.clone();
            let caller = Caller::user(&fan.id);
            tokio::spawn(async move { manager.like_post(&post_id, &caller).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("like");
    }

    assert_eq!(manager.fetch_likes(&post.id).await.expect("likes").len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_comments_keep_distinct_ids() {
    let manager = Arc::new(manager());
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Chatty", &[]).await;

    let handles: Vec<_> = (0..25)
        .map(|index| {
            let manager = Arc::clone(&manager);
            let post_id = post.id.clone();
            let caller = Caller::user(&amy.id);
            tokio::spawn(async move { manager.add_comment(&post_id, &caller, &format!("comment {index}")).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("comment");
    }

    let comments = manager.fetch_comments(&post.id).await.expect("comments");
    assert_eq!(comments.len(), 25);
    let mut ids: Vec<&str> = comments.iter().map(|comment| comment.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 25);
}

/// Post store whose listing stalls long enough to trip a short deadline.
struct SlowListing {
    inner: MemoryPostStore,
    delay: Duration,
}

impl PostStore for SlowListing {
    async fn create(&self, post: Post) -> Result<Post, StoreError> {
        self.inner.create(post).await
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list().await
    }

    async fn update_fields(
        &self,
        id: &str,
        fields: PostFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, StoreError> {
        self.inner.update_fields(id, fields, updated_at).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }

    async fn add_like(&self, id: &str, user_id: &str) -> Result<SetMutation, StoreError> {
        self.inner.add_like(id, user_id).await
    }

    async fn remove_like(&self, id: &str, user_id: &str) -> Result<SetMutation, StoreError> {
        self.inner.remove_like(id, user_id).await
    }

    async fn append_comment(&self, id: &str, comment: Comment) -> Result<SetMutation, StoreError> {
        self.inner.append_comment(id, comment).await
    }

    async fn remove_comment(&self, id: &str, comment_id: &str) -> Result<SetMutation, StoreError> {
        self.inner.remove_comment(id, comment_id).await
    }

    async fn find_matching(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        self.inner.find_matching(filter).await
    }
}

#[tokio::test]
async fn slow_store_surfaces_timeout() {
    let manager = PostManager::new(
        MemoryIdentityStore::new(),
        SlowListing {
            inner: MemoryPostStore::new(),
            delay: Duration::from_millis(500),
        },
    )
    .with_timeout(Some(Duration::from_millis(20)));

    let err = manager.list_posts().await.expect_err("deadline");
    assert_eq!(err.kind(), ErrorKind::Timeout);

    let relaxed = manager.with_timeout(None);
    assert!(relaxed.list_posts().await.expect("no deadline").is_empty());
}
