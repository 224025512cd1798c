use crate::support::*;

#[tokio::test]
async fn create_post_starts_empty_and_links_author() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;

    let post = publish(&manager, &amy, "Hiking in Nepal", &["travel", "nepal"]).await;
    assert!(post.likes.is_empty());
    assert!(post.comments.is_empty());
    assert_eq!(post.author, amy.id);
    assert_eq!(post.created_at, post.updated_at);
    assert!(!post.media.is_video);

    let stored = manager.get_user(&amy.id).await.expect("user");
    assert_eq!(stored.posts, vec![post.id.clone()]);
}

#[tokio::test]
async fn create_post_reports_every_missing_field() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;

    let err = manager
        .create_post(&Caller::user(&amy.id), PostDraft::default())
        .await
        .expect_err("empty draft");
    let PostError::Validation(validation) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(validation.has_field("title"));
    assert!(validation.has_field("content"));
    assert!(validation.has_field("media.url"));
}

#[tokio::test]
async fn create_post_for_unknown_author_is_not_found() {
    let manager = manager();
    let result = manager.create_post(&Caller::user("ghost"), draft("Orphan", &[])).await;
    assert_kind(result, ErrorKind::NotFound);
    assert!(manager.posts().is_empty().await);
}

#[tokio::test]
async fn get_post_resolves_author() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Hiking in Nepal", &[]).await;

    let view = manager.get_post(&post.id).await.expect("get post");
    let author = view.author.expect("author summary");
    assert_eq!(author.username, "amy");
    assert_eq!(author.name, "Amy");
    assert_eq!(view.title, "Hiking in Nepal");

    assert_kind(manager.get_post("missing").await, ErrorKind::NotFound);
}

#[tokio::test]
async fn list_posts_returns_everything_oldest_first() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let first = publish(&manager, &amy, "First", &[]).await;
    let second = publish(&manager, &bob, "Second", &[]).await;

    let posts = manager.list_posts().await.expect("list");
    let ids: Vec<&str> = posts.iter().map(|post| post.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id.as_str()));
    assert!(ids.contains(&second.id.as_str()));
    assert!(posts.iter().all(|post| post.author.is_some()));
}

#[tokio::test]
async fn update_post_replaces_fields_and_keeps_engagement() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Draft title", &["misc"]).await;
    manager.like_post(&post.id, &Caller::user(&bob.id)).await.expect("like");
    manager
        .add_comment(&post.id, &Caller::user(&bob.id), "nice")
        .await
        .expect("comment");

    let updated = manager
        .update_post(
            &post.id,
            &Caller::user(&amy.id),
            PostDraft::new("Final title", "New body", MediaInput::video("https://cdn.example.com/v.mp4"))
                .categories(["travel"]),
        )
        .await
        .expect("update");

    assert_eq!(updated.title, "Final title");
    assert_eq!(updated.categories, vec!["travel"]);
    assert!(updated.media.is_video);
    assert!(!updated.is_published);
    assert!(updated.updated_at >= post.updated_at);
    assert!(updated.is_liked_by(&bob.id));
    assert_eq!(updated.comments.len(), 1);
}

#[tokio::test]
async fn update_post_requires_author_or_admin() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Mine", &[]).await;

    let result = manager
        .update_post(&post.id, &Caller::user(&bob.id), draft("Hijacked", &[]))
        .await;
    assert_kind(result, ErrorKind::Forbidden);
    let unchanged = manager.get_post(&post.id).await.expect("get");
    assert_eq!(unchanged.title, "Mine");

    let edited = manager
        .update_post(&post.id, &Caller::admin(&bob.id), draft("Moderated", &[]))
        .await
        .expect("admin edit");
    assert_eq!(edited.title, "Moderated");

    assert_kind(
        manager.update_post("missing", &Caller::user(&amy.id), draft("x", &[])).await,
        ErrorKind::NotFound,
    );
}

#[tokio::test]
async fn delete_post_detaches_author_and_favourites() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let cat = register(&manager, "cat", "Cat").await;
    let post = publish(&manager, &amy, "Short lived", &[]).await;
    let keeper = publish(&manager, &amy, "Keeper", &[]).await;
    manager.favourite_post(&post.id, &Caller::user(&bob.id)).await.expect("fav bob");
    manager.favourite_post(&post.id, &Caller::user(&cat.id)).await.expect("fav cat");
    manager.favourite_post(&keeper.id, &Caller::user(&cat.id)).await.expect("fav keeper");

    manager.delete_post(&post.id, &Caller::user(&amy.id)).await.expect("delete");

    assert_kind(manager.get_post(&post.id).await, ErrorKind::NotFound);
    let amy = manager.get_user(&amy.id).await.expect("amy");
    assert_eq!(amy.posts, vec![keeper.id.clone()]);
    let bob = manager.get_user(&bob.id).await.expect("bob");
    assert!(bob.favourites.is_empty());
    let cat = manager.get_user(&cat.id).await.expect("cat");
    assert_eq!(cat.favourites.iter().collect::<Vec<_>>(), vec![&keeper.id]);
}

#[tokio::test]
async fn delete_post_by_stranger_is_forbidden() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Mine", &[]).await;

    assert_kind(
        manager.delete_post(&post.id, &Caller::user(&bob.id)).await,
        ErrorKind::Forbidden,
    );
    assert!(manager.get_post(&post.id).await.is_ok());
}

#[tokio::test]
async fn admin_delete_cleans_up_the_author_not_the_admin() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let root = register(&manager, "root", "Ops").await;
    let post = publish(&manager, &amy, "Spam", &[]).await;
    let own = publish(&manager, &root, "Announcement", &[]).await;

    manager.delete_post(&post.id, &Caller::admin(&root.id)).await.expect("admin delete");

    assert!(manager.get_user(&amy.id).await.expect("amy").posts.is_empty());
    assert_eq!(manager.get_user(&root.id).await.expect("root").posts, vec![own.id]);
}

#[tokio::test]
async fn deleting_twice_is_not_found() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Once", &[]).await;
    let caller = Caller::user(&amy.id);

    manager.delete_post(&post.id, &caller).await.expect("delete");
    assert_kind(manager.delete_post(&post.id, &caller).await, ErrorKind::NotFound);
}

#[tokio::test]
async fn not_found_names_the_missing_entity() {
    let manager = manager();
    let err = manager.get_post("p404").await.expect_err("missing");
    assert!(matches!(
        err,
        PostError::NotFound {
            entity: EntityKind::Post,
            ..
        }
    ));
    assert_eq!(err.to_string(), "post not found");
}
