mod config;
mod error;
mod models;
mod utils;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{debug, error, info};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{CourseId, ProviderKind};
use crate::utils::catalog::{CatalogClient, FEATURED_COURSES};
use crate::utils::enrollment::{dashboard, enroll};
use crate::utils::favorites::FavoritesStore;
use crate::utils::filter::{categories, visible_courses, CategoryFilter, SortMode};
use crate::utils::identity::FirebaseIdentity;
use crate::utils::render::{
    auth_error_message, category_list, course_details, course_listing, dashboard_summary,
};
use crate::utils::session::{validate_new_password, SessionFacade};
use crate::utils::storage::{JsonFileStore, KeyValueStore};

type SharedStore = Arc<Mutex<JsonFileStore>>;

#[derive(Parser)]
#[command(name = "course-catalog", version, about = "Browse courses, keep favorites and manage your session")]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List courses, filtered and sorted
    Courses {
        /// Case-insensitive text matched against title, description and category
        #[arg(short, long, default_value = "")]
        query: String,
        /// "all" or an exact category label
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
        /// name, price-low or price-high
        #[arg(short, long, default_value = "name")]
        sort: SortMode,
    },
    /// Show the featured courses from the home page
    Featured,
    /// List the categories available for filtering
    Categories,
    /// Show one course
    Course { id: CourseId },
    /// Manage favorite courses
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Enroll in a course (simulated)
    Enroll { id: CourseId },
    /// Show the learner dashboard
    Dashboard,
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account with email and password
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Repeat the password; defaults to --password
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign in with an external identity provider (google or github)
    SignInWith { provider: ProviderKind },
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand, Clone, Copy)]
enum FavoritesAction {
    List,
    Add { id: CourseId },
    Remove { id: CourseId },
    Toggle { id: CourseId },
}

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() {
    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = TermLogger::init(level, simplelog::Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli.command).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::from_env()?;
    let storage: SharedStore = Arc::new(Mutex::new(JsonFileStore::open(&config.storage_path)));

    match command {
        Command::Courses { query, category, sort } => {
            let catalog = catalog_client(&config)?
                .fetch_courses()
                .await
                .context("Failed to load courses")?;
            let favorites = favorites_store(&storage);
            let visible = visible_courses(&catalog, &query, &category, sort);
            debug!("{} of {} course(s) visible, sorted {}", visible.len(), catalog.len(), sort);
            print!("{}", course_listing(&visible, |id| favorites.is_favorite(id)));
        }
        Command::Featured => {
            let featured = catalog_client(&config)?
                .fetch_featured()
                .await
                .context("Failed to load featured courses")?;
            let favorites = favorites_store(&storage);
            debug!("Showing up to {} featured course(s)", FEATURED_COURSES);
            let listed: Vec<_> = featured.iter().collect();
            print!("{}", course_listing(&listed, |id| favorites.is_favorite(id)));
        }
        Command::Categories => {
            let catalog = catalog_client(&config)?
                .fetch_courses()
                .await
                .context("Failed to load courses")?;
            print!("{}", category_list(&categories(&catalog)));
        }
        Command::Course { id } => {
            let course = catalog_client(&config)?
                .fetch_course(id)
                .await
                .context("Failed to load course details")?;
            let favorites = favorites_store(&storage);
            print!("{}", course_details(&course, favorites.is_favorite(course.id)));
        }
        Command::Favorites { action } => {
            favorites_command(&config, &storage, action.unwrap_or(FavoritesAction::List)).await?;
        }
        Command::Enroll { id } => {
            let session = session_facade(&config, &storage)?;
            let course = catalog_client(&config)?
                .fetch_course(id)
                .await
                .context("Failed to load course details")?;
            info!("Enrolling in {}...", course.title);
            enroll(session.current(), &course, config.enroll_delay).await?;
            println!("Successfully enrolled! You've been enrolled in {}. Start learning now!", course.title);
        }
        Command::Dashboard => {
            let session = session_facade(&config, &storage)?;
            let principal = require_principal(session.current())?;
            let board = dashboard(principal, &catalog_client(&config)?)
                .await
                .context("Failed to load enrolled courses")?;
            print!("{}", dashboard_summary(&board));
        }
        Command::SignIn { email, password } => {
            let mut session = session_facade(&config, &storage)?;
            session
                .sign_in(&email, &password)
                .await
                .map_err(|e| anyhow!(auth_error_message(&e, None)))?;
            println!("Login successful. Welcome back!");
        }
        Command::SignUp { email, password, confirm } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            validate_new_password(&password, &confirm).map_err(|e| anyhow!(auth_error_message(&e, None)))?;
            let mut session = session_facade(&config, &storage)?;
            session
                .sign_up(&email, &password)
                .await
                .map_err(|e| anyhow!(auth_error_message(&e, None)))?;
            println!("Account created! Your learning journey begins now.");
        }
        Command::SignInWith { provider } => {
            let mut session = session_facade(&config, &storage)?;
            session
                .sign_in_with_provider(provider)
                .await
                .map_err(|e| anyhow!(auth_error_message(&e, Some(provider))))?;
            println!("Welcome! You have successfully logged in with {}.", provider);
        }
        Command::Logout => {
            let mut session = session_facade(&config, &storage)?;
            // Subscribing reports the current state once; a second call means logout changed it.
            let calls = Arc::new(AtomicUsize::new(0));
            let watch = {
                let calls = Arc::clone(&calls);
                session.subscribe(move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                })
            };
            let result = session.logout().await;
            session.unsubscribe(watch);
            result.map_err(|e| anyhow!(auth_error_message(&e, None)))?;
            if calls.load(Ordering::SeqCst) > 1 {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        Command::Whoami => {
            let session = session_facade(&config, &storage)?;
            match session.current() {
                Some(principal) => {
                    println!("{}", principal.greeting_name());
                    println!("uid:   {}", principal.uid);
                    if let Some(email) = &principal.email {
                        println!("email: {}", email);
                    }
                    if let Some(photo) = &principal.photo_url {
                        println!("photo: {}", photo);
                    }
                }
                None => println!("Not signed in."),
            }
        }
    }

    Ok(())
}

async fn favorites_command(config: &Config, storage: &SharedStore, action: FavoritesAction) -> Result<()> {
    let mut favorites = favorites_store(storage);

    match action {
        FavoritesAction::List => {
            let session = session_facade(config, storage)?;
            require_principal(session.current())?;
            if favorites.ids().is_empty() {
                println!("No favorites yet. Browse courses and save the ones you like.");
                return Ok(());
            }
            let courses = catalog_client(config)?.fetch_many(favorites.ids()).await;
            let listed: Vec<_> = courses.iter().collect();
            print!("{}", course_listing(&listed, |_| true));
        }
        FavoritesAction::Add { id } => {
            if changes(&mut favorites, |f| f.add(id)) {
                println!("Course saved to your favorites!");
            } else {
                println!("Course is already in your favorites.");
            }
        }
        FavoritesAction::Remove { id } => {
            if changes(&mut favorites, |f| f.remove(id)) {
                println!("Course removed from your favorites.");
            } else {
                println!("Course wasn't in your favorites.");
            }
        }
        FavoritesAction::Toggle { id } => {
            if favorites.toggle(id) {
                println!("Course saved to your favorites!");
            } else {
                println!("Course removed from your favorites.");
            }
        }
    }
    Ok(())
}

// Runs one mutation with a temporary observer; true when it notified.
fn changes<S, F>(favorites: &mut FavoritesStore<S>, mutation: F) -> bool
where
    S: KeyValueStore,
    F: FnOnce(&mut FavoritesStore<S>),
{
    let changed = Arc::new(AtomicBool::new(false));
    let watch = {
        let changed = Arc::clone(&changed);
        favorites.subscribe(move |_| changed.store(true, Ordering::SeqCst))
    };
    mutation(favorites);
    favorites.unsubscribe(watch);
    changed.load(Ordering::SeqCst)
}

fn catalog_client(config: &Config) -> Result<CatalogClient, CatalogError> {
    CatalogClient::new(config.catalog_url.clone())
}

fn favorites_store(storage: &SharedStore) -> FavoritesStore<SharedStore> {
    let mut favorites = FavoritesStore::load(Arc::clone(storage));
    favorites.subscribe(|ids| debug!("Favorites now hold {} course(s)", ids.len()));
    favorites
}

fn session_facade(
    config: &Config,
    storage: &SharedStore,
) -> Result<SessionFacade<FirebaseIdentity, SharedStore>> {
    let provider = FirebaseIdentity::new(
        config.identity_url.clone(),
        config.firebase_api_key.clone(),
        config.credentials.clone(),
    )?;
    let mut session = SessionFacade::restore(provider, Arc::clone(storage));
    session.subscribe(|principal| match principal {
        Some(p) => debug!("Session: signed in as {}", p.uid),
        None => debug!("Session: signed out"),
    });
    Ok(session)
}

fn require_principal(principal: Option<&models::Principal>) -> Result<&models::Principal> {
    match principal {
        Some(principal) => Ok(principal),
        None => bail!("Please sign in first (course-catalog sign-in --email ... --password ...)"),
    }
}
