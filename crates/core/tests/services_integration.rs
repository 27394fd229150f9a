//! Service-level tests against a migrated in-memory SQLite database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use flock_common::AppError;
use flock_core::{
    CreatePostInput, CreateUserInput, FeedService, FollowingService, UpdateProfileInput,
    UserService,
};
use flock_db::entities::user;
use flock_db::repositories::{FollowerRepository, PostRepository, UserRepository};
use flock_db::test_utils::TestDatabase;

struct App {
    db: TestDatabase,
    users: UserService,
    following: FollowingService,
    feed: FeedService,
}

async fn setup() -> App {
    let db = TestDatabase::sqlite_memory()
        .await
        .expect("Failed to open in-memory database");
    let user_repo = UserRepository::new(db.shared());

    App {
        users: UserService::new(user_repo.clone()),
        following: FollowingService::new(FollowerRepository::new(db.shared()), user_repo.clone()),
        feed: FeedService::with_posts_per_page(PostRepository::new(db.shared()), user_repo, 2),
        db,
    }
}

fn at(hour: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap().into()
}

async fn register(app: &App, username: &str) -> user::Model {
    app.users
        .register(CreateUserInput {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: format!("{username}-password"),
            about_me: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let app = setup().await;
    let alice = register(&app, "alice").await;

    assert!(alice.password_hash.is_some());
    assert_ne!(alice.password_hash.as_deref(), Some("alice-password"));

    let ok = app.users.authenticate("alice", "alice-password").await.unwrap();
    assert_eq!(ok.map(|u| u.id), Some(alice.id));

    assert!(app.users.authenticate("alice", "nope").await.unwrap().is_none());
    assert!(app.users.authenticate("bob", "alice-password").await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = setup().await;
    register(&app, "alice").await;

    let result = app
        .users
        .register(CreateUserInput {
            username: "alice".to_string(),
            email: "elsewhere@example.com".to_string(),
            password: "pw".to_string(),
            about_me: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_load_user() {
    let app = setup().await;
    let alice = register(&app, "alice").await;

    let loaded = app.users.load_user(&alice.id.to_string()).await.unwrap();
    assert_eq!(loaded.map(|u| u.username), Some("alice".to_string()));

    assert!(app.users.load_user("abc").await.unwrap().is_none());
    assert!(app.users.load_user("999").await.unwrap().is_none());
}

#[tokio::test]
async fn test_profile_password_and_poster_updates() {
    let app = setup().await;
    let alice = register(&app, "alice").await;

    let updated = app
        .users
        .update_about_me(
            alice.id,
            UpdateProfileInput {
                about_me: Some("hello there".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.about_me.as_deref(), Some("hello there"));

    app.users.change_password(alice.id, "rotated").await.unwrap();
    assert!(app.users.authenticate("alice", "alice-password").await.unwrap().is_none());
    assert!(app.users.authenticate("alice", "rotated").await.unwrap().is_some());

    let poster = app.users.set_poster(alice.id, true).await.unwrap();
    assert!(poster.is_poster());
    let reloaded = app.users.load_user(&alice.id.to_string()).await.unwrap();
    assert!(reloaded.unwrap().poster);

    app.users.touch_last_seen(alice.id).await.unwrap();
    assert!(matches!(
        app.users.touch_last_seen(alice.id + 100).await,
        Err(AppError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_follow_is_idempotent() {
    let app = setup().await;
    let a = register(&app, "a").await;
    let b = register(&app, "b").await;

    assert!(app.following.follow(a.id, b.id).await.unwrap());
    assert!(!app.following.follow(a.id, b.id).await.unwrap());

    assert!(app.following.is_following(a.id, b.id).await.unwrap());
    assert_eq!(app.following.following_count(a.id).await.unwrap(), 1);
    assert_eq!(app.following.followers_count(b.id).await.unwrap(), 1);

    let followed: Vec<i32> = app
        .following
        .followed_users(a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(followed, vec![b.id]);

    // b has not posted yet
    assert!(app.following.followed_users_with_posts(a.id).await.unwrap().is_empty());

    app.feed
        .create_post(
            b.id,
            CreatePostInput {
                body: "first".to_string(),
                url: None,
            },
        )
        .await
        .unwrap();
    let with_posts = app.following.followed_users_with_posts(a.id).await.unwrap();
    assert_eq!(with_posts.len(), 1);
    assert_eq!(with_posts[0].id, b.id);
}

#[tokio::test]
async fn test_follow_rules() {
    let app = setup().await;
    let a = register(&app, "a").await;

    assert!(matches!(
        app.following.follow(a.id, a.id).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        app.following.follow(a.id, a.id + 100).await,
        Err(AppError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_unfollow() {
    let app = setup().await;
    let a = register(&app, "a").await;
    let b = register(&app, "b").await;

    assert!(!app.following.unfollow(a.id, b.id).await.unwrap());

    app.following.follow(a.id, b.id).await.unwrap();
    assert!(app.following.unfollow(a.id, b.id).await.unwrap());
    assert!(!app.following.is_following(a.id, b.id).await.unwrap());
    assert!(app.following.followers(b.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_scenario() {
    let app = setup().await;
    let u1 = register(&app, "u1").await;
    let u2 = register(&app, "u2").await;

    let p1 = app.db.insert_post(u1.id, "P1", at(10)).await.unwrap();
    let p2 = app.db.insert_post(u1.id, "P2", at(11)).await.unwrap();
    let own = app
        .db
        .insert_post(u2.id, "mine", at(10) + chrono::Duration::minutes(30))
        .await
        .unwrap();

    // Before following, only own posts
    let before: Vec<i32> = app
        .feed
        .followed_posts(u2.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(before, vec![own.id]);

    app.following.follow(u2.id, u1.id).await.unwrap();

    let feed: Vec<i32> = app
        .feed
        .followed_posts(u2.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(feed, vec![p2.id, own.id, p1.id]);

    let page1 = app.feed.followed_posts_page(u2.id, 1).await.unwrap();
    assert_eq!(page1.items.len(), 2);
    assert!(page1.has_next());
    let page2 = app.feed.followed_posts_page(u2.id, 2).await.unwrap();
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].id, p1.id);
    assert!(!page2.has_next());

    let beyond = app.feed.followed_posts_page(u2.id, u64::MAX).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 3);
}

#[tokio::test]
async fn test_create_post_and_pages() {
    let app = setup().await;
    let a = register(&app, "a").await;
    let b = register(&app, "b").await;

    let post = app
        .feed
        .create_post(
            a.id,
            CreatePostInput {
                body: "hello world".to_string(),
                url: Some("https://example.com".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(post.user_id, a.id);
    assert_eq!(app.feed.get_post(post.id).await.unwrap().body, "hello world");
    assert_eq!(app.feed.post_count(a.id).await.unwrap(), 1);
    assert_eq!(app.feed.post_count(b.id).await.unwrap(), 0);

    app.db.insert_post(b.id, "from b", at(1)).await.unwrap();

    let own = app.feed.user_posts_page(a.id, 1).await.unwrap();
    assert_eq!(own.total, 1);

    let explore = app.feed.explore_page(1).await.unwrap();
    assert_eq!(explore.total, 2);
    assert_eq!(explore.items[0].id, post.id);

    assert!(matches!(
        app.feed.user_posts_page(a.id + 100, 1).await,
        Err(AppError::UserNotFound(_))
    ));
}
