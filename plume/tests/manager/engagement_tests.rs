use crate::support::*;

#[tokio::test]
async fn like_then_like_again_conflicts() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Likeable", &[]).await;
    let caller = Caller::user(&bob.id);

    manager.like_post(&post.id, &caller).await.expect("first like");
    let view = manager.get_post(&post.id).await.expect("get");
    assert!(view.likes.contains(&bob.id));

    let err = manager.like_post(&post.id, &caller).await.expect_err("second like");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "post already liked");
    assert_eq!(manager.get_post(&post.id).await.expect("get").likes.len(), 1);
}

#[tokio::test]
async fn unlike_then_unlike_again_conflicts() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Likeable", &[]).await;
    let caller = Caller::user(&bob.id);

    assert_kind(manager.unlike_post(&post.id, &caller).await, ErrorKind::Conflict);

    manager.like_post(&post.id, &caller).await.expect("like");
    manager.unlike_post(&post.id, &caller).await.expect("unlike");
    assert!(!manager.get_post(&post.id).await.expect("get").likes.contains(&bob.id));

    let err = manager.unlike_post(&post.id, &caller).await.expect_err("second unlike");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "post not liked");
}

#[tokio::test]
async fn likes_on_missing_post_are_not_found() {
    let manager = manager();
    let bob = register(&manager, "bob", "Bob").await;
    assert_kind(manager.like_post("missing", &Caller::user(&bob.id)).await, ErrorKind::NotFound);
    assert_kind(manager.unlike_post("missing", &Caller::user(&bob.id)).await, ErrorKind::NotFound);
    assert_kind(manager.fetch_likes("missing").await, ErrorKind::NotFound);
}

#[tokio::test]
async fn fetch_likes_resolves_usernames_and_pictures() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = manager
        .register_user(NewUser::new("bob", "Bob", "bob@example.com").with_profile_picture("https://cdn.example.com/bob.png"))
        .await
        .expect("bob");
    let post = publish(&manager, &amy, "Likeable", &[]).await;
    manager.like_post(&post.id, &Caller::user(&amy.id)).await.expect("amy likes");
    manager.like_post(&post.id, &Caller::user(&bob.id)).await.expect("bob likes");

    let likers = manager.fetch_likes(&post.id).await.expect("likes");
    assert_eq!(likers.len(), 2);
    let mut ids: Vec<&str> = likers.iter().map(|liker| liker.id.as_str()).collect();
    let listed = ids.clone();
    ids.sort();
    assert_eq!(listed, ids, "likers come back in user-id order");

    let bob_view = likers.iter().find(|liker| liker.username == "bob").expect("bob listed");
    assert_eq!(bob_view.profile_picture.as_deref(), Some("https://cdn.example.com/bob.png"));
    let amy_view = likers.iter().find(|liker| liker.username == "amy").expect("amy listed");
    assert!(amy_view.profile_picture.is_none());
}

#[tokio::test]
async fn add_comment_appends_with_fresh_id() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Discuss", &[]).await;

    let first = manager
        .add_comment(&post.id, &Caller::user(&amy.id), "first!")
        .await
        .expect("first comment");
    let second = manager
        .add_comment(&post.id, &Caller::user(&bob.id), "Great trip")
        .await
        .expect("second comment");
    assert_ne!(first.id, second.id);
    assert_eq!(second.user, bob.id);

    let comments = manager.fetch_comments(&post.id).await.expect("comments");
    assert_eq!(comments.len(), 2);
    let last = comments.last().expect("last comment");
    assert_eq!(last.text, "Great trip");
    assert_eq!(last.id, second.id);
    assert_eq!(last.user.as_ref().map(|user| user.username.as_str()), Some("bob"));
    assert_eq!(comments[0].text, "first!");
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Discuss", &[]).await;

    assert_kind(
        manager.add_comment(&post.id, &Caller::user(&amy.id), "   ").await,
        ErrorKind::Validation,
    );
    assert_kind(
        manager.add_comment("missing", &Caller::user(&amy.id), "hello").await,
        ErrorKind::NotFound,
    );
}

#[tokio::test]
async fn author_deletes_own_comment_once() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Discuss", &[]).await;
    let caller = Caller::user(&bob.id);
    manager.add_comment(&post.id, &Caller::user(&amy.id), "keep me").await.expect("keep");
    let comment = manager.add_comment(&post.id, &caller, "oops").await.expect("comment");

    manager
        .delete_comment(&post.id, &comment.id, &caller)
        .await
        .expect("delete own comment");
    let comments = manager.fetch_comments(&post.id).await.expect("comments");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "keep me");

    let err = manager
        .delete_comment(&post.id, &comment.id, &caller)
        .await
        .expect_err("second delete");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "comment not found");
}

#[tokio::test]
async fn stranger_cannot_delete_comment_but_admin_can() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let mallory = register(&manager, "mallory", "Mallory").await;
    let post = publish(&manager, &amy, "Discuss", &[]).await;
    let comment = manager
        .add_comment(&post.id, &Caller::user(&bob.id), "hello")
        .await
        .expect("comment");

    // The post author is not the comment author.
    assert_kind(
        manager.delete_comment(&post.id, &comment.id, &Caller::user(&amy.id)).await,
        ErrorKind::Forbidden,
    );
    assert_kind(
        manager.delete_comment(&post.id, &comment.id, &Caller::user(&mallory.id)).await,
        ErrorKind::Forbidden,
    );
    assert_eq!(manager.fetch_comments(&post.id).await.expect("comments").len(), 1);

    manager
        .delete_comment(&post.id, &comment.id, &Caller::admin(&mallory.id))
        .await
        .expect("admin delete");
    assert!(manager.fetch_comments(&post.id).await.expect("comments").is_empty());
}

#[tokio::test]
async fn delete_comment_on_missing_post_is_not_found() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let err = manager
        .delete_comment("missing", "c1", &Caller::user(&amy.id))
        .await
        .expect_err("missing post");
    assert!(matches!(
        err,
        PostError::NotFound {
            entity: EntityKind::Post,
            ..
        }
    ));
}

#[tokio::test]
async fn comments_of_vanished_users_still_list() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Discuss", &[]).await;
    manager
        .add_comment(&post.id, &Caller::user("departed"), "bye")
        .await
        .expect("comment from unknown id");

    let comments = manager.fetch_comments(&post.id).await.expect("comments");
    assert_eq!(comments.len(), 1);
    assert!(comments[0].user.is_none());
}
