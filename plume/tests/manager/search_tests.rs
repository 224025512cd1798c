use crate::support::*;

async fn nepal_fixture() -> (MemoryManager, Post) {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy Hiker").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Hiking in Nepal", &["travel", "nepal"]).await;
    publish(&manager, &bob, "Baking bread", &["food"]).await;
    (manager, post)
}

fn ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|post| post.id.as_str()).collect()
}

#[tokio::test]
async fn search_matches_category() {
    let (manager, post) = nepal_fixture().await;
    let hits = manager.search("nepal").await.expect("search");
    assert_eq!(ids(&hits), vec![post.id.as_str()]);
}

#[tokio::test]
async fn search_matches_author_username() {
    let (manager, post) = nepal_fixture().await;
    let hits = manager.search("amy").await.expect("search");
    assert_eq!(ids(&hits), vec![post.id.as_str()]);
}

#[tokio::test]
async fn search_matches_author_name_case_insensitively() {
    let (manager, post) = nepal_fixture().await;
    let hits = manager.search("HIKER").await.expect("search");
    assert_eq!(ids(&hits), vec![post.id.as_str()]);
}

#[tokio::test]
async fn search_without_hits_is_empty() {
    let (manager, _) = nepal_fixture().await;
    assert!(manager.search("xyz123").await.expect("search").is_empty());
}

#[tokio::test]
async fn search_returns_each_post_once() {
    let (manager, post) = nepal_fixture().await;
    // "hik" hits the title and the author's name.
    let hits = manager.search("hik").await.expect("search");
    assert_eq!(ids(&hits), vec![post.id.as_str()]);
}

#[tokio::test]
async fn search_requires_a_query() {
    let (manager, _) = nepal_fixture().await;
    assert_kind(manager.search("").await, ErrorKind::Validation);
    assert_kind(manager.search("   ").await, ErrorKind::Validation);
}

#[tokio::test]
async fn search_treats_metacharacters_literally() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Modern C++ tricks", &[]).await;
    publish(&manager, &amy, "C is fine", &[]).await;

    let hits = manager.search("c++").await.expect("search");
    assert_eq!(ids(&hits), vec![post.id.as_str()]);
    assert!(manager.search(".*").await.expect("search").is_empty());
}
