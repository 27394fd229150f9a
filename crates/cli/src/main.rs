//! flock command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use flock_common::{AppError, Config, generate_secret_key};
use flock_core::{CreatePostInput, CreateUserInput, FeedService, FollowingService, UserService};
use flock_db::entities::user;
use flock_db::repositories::{FollowerRepository, PostRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flock")]
#[command(version)]
#[command(about = "Users, follows and feeds for a small social app")]
struct Cli {
    /// Read configuration from this file instead of `config/`
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the user, post and followers tables
    Migrate,

    /// Print a new random secret key
    GenSecret,

    /// Register a new user
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Profile text (max 140 chars)
        #[arg(long)]
        about_me: Option<String>,
    },

    /// Check credentials and print the session identifier
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Follow a user
    Follow {
        /// Acting user
        #[arg(short, long = "as")]
        user: String,

        /// User to follow
        target: String,
    },

    /// Unfollow a user
    Unfollow {
        /// Acting user
        #[arg(short, long = "as")]
        user: String,

        /// User to unfollow
        target: String,
    },

    /// List a user's followers
    Followers {
        username: String,

        /// Only followers who have posted
        #[arg(long)]
        with_posts: bool,
    },

    /// List the users a user follows
    Following {
        username: String,

        /// Only followed users who have posted
        #[arg(long)]
        with_posts: bool,
    },

    /// Publish a post
    Post {
        /// Acting user
        #[arg(short, long = "as")]
        user: String,

        /// Post text (max 140 chars)
        body: String,

        #[arg(long)]
        url: Option<String>,
    },

    /// Show a user's feed
    Feed {
        username: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u64,
    },

    /// Show a user's own posts
    Posts {
        username: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u64,
    },

    /// Show every user's posts
    Explore {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u64,
    },

    /// Print a single post
    Show {
        id: i32,
    },

    /// Resolve a session identifier to a user
    Whois {
        /// Session identifier printed by `login`
        id: String,
    },
}

struct Services {
    users: UserService,
    following: FollowingService,
    feed: FeedService,
}

#[derive(Serialize)]
struct Profile {
    #[serde(flatten)]
    user: user::Model,
    avatar: String,
    posts: u64,
    followers: u64,
    following: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flock=info,sea_orm=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if matches!(cli.command, Commands::GenSecret) {
        println!("{}", generate_secret_key());
        return Ok(());
    }

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    // Connect to database
    let db = flock_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    flock_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let user_repo = UserRepository::new(db.clone());
    let services = Services {
        users: UserService::new(user_repo.clone()),
        following: FollowingService::new(FollowerRepository::new(db.clone()), user_repo.clone()),
        feed: FeedService::new(PostRepository::new(db), user_repo, &config),
    };

    if let Err(e) = run(cli.command, &services).await {
        e.log();
        return Err(e.into());
    }
    Ok(())
}

async fn run(command: Commands, services: &Services) -> Result<(), AppError> {
    match command {
        Commands::Migrate | Commands::GenSecret => {}
        Commands::Register {
            username,
            email,
            password,
            about_me,
        } => {
            let user = services
                .users
                .register(CreateUserInput {
                    username,
                    email,
                    password,
                    about_me,
                })
                .await?;
            print_json(&user)?;
        }
        Commands::Login { username, password } => {
            let user = services
                .users
                .authenticate(&username, &password)
                .await?
                .ok_or(AppError::Unauthorized)?;
            services.users.touch_last_seen(user.id).await?;
            println!("{}", user.id);
        }
        Commands::Follow { user, target } => {
            let (actor, target) = resolve_pair(services, &user, &target).await?;
            let created = services.following.follow(actor.id, target.id).await?;
            services.users.touch_last_seen(actor.id).await?;
            if created {
                println!("You are following {}!", target.username);
            } else {
                println!("You are already following {}.", target.username);
            }
        }
        Commands::Unfollow { user, target } => {
            let (actor, target) = resolve_pair(services, &user, &target).await?;
            let removed = services.following.unfollow(actor.id, target.id).await?;
            services.users.touch_last_seen(actor.id).await?;
            if removed {
                println!("You are not following {}.", target.username);
            } else {
                println!("You were not following {}.", target.username);
            }
        }
        Commands::Followers {
            username,
            with_posts,
        } => {
            let user = services.users.get_by_username(&username).await?;
            let users = if with_posts {
                services.following.followers_with_posts(user.id).await?
            } else {
                services.following.followers(user.id).await?
            };
            print_json(&users)?;
        }
        Commands::Following {
            username,
            with_posts,
        } => {
            let user = services.users.get_by_username(&username).await?;
            let users = if with_posts {
                services.following.followed_users_with_posts(user.id).await?
            } else {
                services.following.followed_users(user.id).await?
            };
            print_json(&users)?;
        }
        Commands::Post { user, body, url } => {
            let author = services.users.get_by_username(&user).await?;
            let post = services
                .feed
                .create_post(author.id, CreatePostInput { body, url })
                .await?;
            services.users.touch_last_seen(author.id).await?;
            print_json(&post)?;
        }
        Commands::Feed { username, page } => {
            let user = services.users.get_by_username(&username).await?;
            let page = services.feed.followed_posts_page(user.id, page).await?;
            print_json(&page)?;
        }
        Commands::Posts { username, page } => {
            let user = services.users.get_by_username(&username).await?;
            let page = services.feed.user_posts_page(user.id, page).await?;
            print_json(&page)?;
        }
        Commands::Explore { page } => {
            print_json(&services.feed.explore_page(page).await?)?;
        }
        Commands::Show { id } => {
            print_json(&services.feed.get_post(id).await?)?;
        }
        Commands::Whois { id } => {
            let Some(user) = services.users.load_user(&id).await? else {
                println!("No user for session {id:?}");
                return Ok(());
            };
            let profile = Profile {
                avatar: user.avatar(128),
                posts: services.feed.post_count(user.id).await?,
                followers: services.following.followers_count(user.id).await?,
                following: services.following.following_count(user.id).await?,
                user,
            };
            print_json(&profile)?;
        }
    }
    Ok(())
}

async fn resolve_pair(
    services: &Services,
    actor: &str,
    target: &str,
) -> Result<(user::Model, user::Model), AppError> {
    let actor = services.users.get_by_username(actor).await?;
    let target = services.users.get_by_username(target).await?;
    Ok((actor, target))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode output: {e}")))?;
    println!("{json}");
    Ok(())
}
