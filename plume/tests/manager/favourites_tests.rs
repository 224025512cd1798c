use plume::PostStore;

use crate::support::*;

#[tokio::test]
async fn favourite_and_unfavourite_round_out_conflicts() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Keeper", &[]).await;
    let caller = Caller::user(&bob.id);

    manager.favourite_post(&post.id, &caller).await.expect("favourite");
    let err = manager.favourite_post(&post.id, &caller).await.expect_err("again");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "post already in favourites");

    let favourites = manager.list_favourites(&bob.id).await.expect("list");
    assert_eq!(favourites.len(), 1);
    assert_eq!(favourites[0].id, post.id);

    manager.unfavourite_post(&post.id, &caller).await.expect("unfavourite");
    let err = manager.unfavourite_post(&post.id, &caller).await.expect_err("again");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "post not in favourites");
    assert!(manager.list_favourites(&bob.id).await.expect("list").is_empty());
}

#[tokio::test]
async fn favouriting_requires_post_and_user() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let post = publish(&manager, &amy, "Keeper", &[]).await;

    let err = manager
        .favourite_post("missing", &Caller::user(&amy.id))
        .await
        .expect_err("missing post");
    assert!(matches!(
        err,
        PostError::NotFound {
            entity: EntityKind::Post,
            ..
        }
    ));

    let err = manager
        .favourite_post(&post.id, &Caller::user("ghost"))
        .await
        .expect_err("missing user");
    assert!(matches!(
        err,
        PostError::NotFound {
            entity: EntityKind::User,
            ..
        }
    ));
}

#[tokio::test]
async fn unfavourite_works_after_post_is_gone() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let post = publish(&manager, &amy, "Fleeting", &[]).await;
    let caller = Caller::user(&bob.id);
    manager.favourite_post(&post.id, &caller).await.expect("favourite");

    // Bypass the manager so the favourite survives as a dangling id.
    assert!(manager.posts().delete(&post.id).await.expect("raw delete"));

    manager.unfavourite_post(&post.id, &caller).await.expect("unfavourite");
    assert!(manager.get_user(&bob.id).await.expect("bob").favourites.is_empty());
}

#[tokio::test]
async fn listing_favourites_drops_deleted_posts() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let bob = register(&manager, "bob", "Bob").await;
    let kept = publish(&manager, &amy, "Kept", &[]).await;
    let gone = publish(&manager, &amy, "Gone", &[]).await;
    let caller = Caller::user(&bob.id);
    manager.favourite_post(&kept.id, &caller).await.expect("favourite kept");
    manager.favourite_post(&gone.id, &caller).await.expect("favourite gone");

    assert!(manager.posts().delete(&gone.id).await.expect("raw delete"));

    let favourites = manager.list_favourites(&bob.id).await.expect("list");
    assert_eq!(favourites.len(), 1);
    assert_eq!(favourites[0].id, kept.id);

    let bob = manager.get_user(&bob.id).await.expect("bob");
    assert!(bob.favourites.contains(&kept.id));
    assert!(!bob.favourites.contains(&gone.id));
}

#[tokio::test]
async fn listing_user_posts_keeps_order_and_drops_deleted() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let first = publish(&manager, &amy, "First", &[]).await;
    let second = publish(&manager, &amy, "Second", &[]).await;
    let third = publish(&manager, &amy, "Third", &[]).await;

    assert!(manager.posts().delete(&second.id).await.expect("raw delete"));

    let posts = manager.list_user_posts(&amy.id).await.expect("list");
    let ids: Vec<&str> = posts.iter().map(|post| post.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), third.id.as_str()]);
    assert_eq!(
        manager.get_user(&amy.id).await.expect("amy").posts,
        vec![first.id.clone(), third.id.clone()]
    );
}

#[tokio::test]
async fn usernames_are_unique_ignoring_case() {
    let manager = manager();
    register(&manager, "amy", "Amy").await;

    let err = manager
        .register_user(NewUser::new("AMY", "Other Amy", "other@example.com"))
        .await
        .expect_err("taken");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "username 'AMY' is already taken");
}

#[tokio::test]
async fn invalid_users_are_rejected() {
    let manager = manager();
    assert_kind(
        manager.register_user(NewUser::new("", "Nobody", "nobody@example.com")).await,
        ErrorKind::Validation,
    );
    assert_kind(
        manager.register_user(NewUser::new("amy", "Amy", "not-an-email")).await,
        ErrorKind::Validation,
    );
}

#[tokio::test]
async fn unknown_users_are_not_found() {
    let manager = manager();
    assert_kind(manager.get_user("ghost").await, ErrorKind::NotFound);
    assert_kind(manager.list_favourites("ghost").await, ErrorKind::NotFound);
    assert_kind(manager.list_user_posts("ghost").await, ErrorKind::NotFound);
}

#[tokio::test]
async fn seeded_admin_moderates_posts() {
    let manager = manager();
    let amy = register(&manager, "amy", "Amy").await;
    let moderator = NewUser::new("mod", "Moderator", "mod@example.com")
        .with_role(Role::Admin)
        .into_user(chrono::Utc::now());
    manager.identity().insert(moderator.clone()).await;
    assert_eq!(manager.identity().len().await, 2);

    let fetched = manager.get_user(&moderator.id).await.expect("seeded user");
    assert_eq!(fetched.role, Role::Admin);

    let post = publish(&manager, &amy, "Off topic", &[]).await;
    assert_eq!(manager.posts().len().await, 1);
    manager
        .delete_post(&post.id, &Caller::new(&moderator.id, fetched.role))
        .await
        .expect("admin delete");
    assert!(manager.posts().is_empty().await);
    assert!(manager.get_user(&amy.id).await.expect("amy").posts.is_empty());
}
