//! Database seeder for Herkey development and testing.
//!
//! Seeds a host and a guest account plus one live event with both of them
//! registered as participants. Safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use std::process::ExitCode;
use std::sync::Arc;

use herkey_core::auth::{AuthService, CreateUserInput, UserRepository as _};
use herkey_core::event::{CreateEventInput, EventService, EventType};
use herkey_core::participant::ParticipantType;
use herkey_db::{EventRepository, ParticipantRepository, UserRepository};
use sea_orm::DatabaseConnection;

/// Password shared by every seeded account.
const DEV_PASSWORD: &str = "herkey-dev-password";
/// Title of the seeded event; used to detect a previous run.
const DEMO_EVENT_TITLE: &str = "Herkey launch stream";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL must be set in environment");
        return ExitCode::FAILURE;
    };

    println!("Connecting to database...");
    let db = match herkey_db::connect(&database_url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Seeding users...");
    let Some(host_id) = seed_user(&db, "host", "Hana", "Host").await else {
        return ExitCode::FAILURE;
    };
    let Some(guest_id) = seed_user(&db, "guest", "Gus", "Guest").await else {
        return ExitCode::FAILURE;
    };

    println!("Seeding demo event...");
    if !seed_event(&db, host_id, guest_id).await {
        return ExitCode::FAILURE;
    }

    println!("Seeding complete!");
    ExitCode::SUCCESS
}

/// Creates the user unless the username exists; returns its ID either way.
async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> Option<i32> {
    let repo = UserRepository::new(db.clone());

    match repo.find_by_username(username).await {
        Ok(Some(user)) => {
            println!("  User '{username}' already exists (id {}), skipping...", user.id);
            return Some(user.id);
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Failed to look up user '{username}': {e}");
            return None;
        }
    }

    let service = AuthService::new(Arc::new(repo));
    match service
        .register(CreateUserInput {
            username: username.to_string(),
            password: DEV_PASSWORD.to_string(),
            email: format!("{username}@herkey.dev"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
        .await
    {
        Ok(user) => {
            println!("  Created user '{username}' (id {})", user.id);
            Some(user.id)
        }
        Err(e) => {
            eprintln!("Failed to insert user '{username}': {e}");
            None
        }
    }
}

/// Creates the demo event with a host and a guest unless it already exists.
async fn seed_event(db: &DatabaseConnection, host_id: i32, guest_id: i32) -> bool {
    let service = EventService::new(
        Arc::new(EventRepository::new(db.clone())),
        Arc::new(ParticipantRepository::new(db.clone())),
    );

    match service.list().await {
        Ok(events) if events.iter().any(|d| d.event.title == DEMO_EVENT_TITLE) => {
            println!("  Demo event already exists, skipping...");
            return true;
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Failed to list events: {e}");
            return false;
        }
    }

    let event = match service
        .create(CreateEventInput {
            title: DEMO_EVENT_TITLE.to_string(),
            description: Some("Seeded event for local development.".to_string()),
            event_type: EventType::Live,
            active: true,
            ..Default::default()
        })
        .await
    {
        Ok(event) => event,
        Err(e) => {
            eprintln!("Failed to insert demo event: {e}");
            return false;
        }
    };
    println!("  Created event '{DEMO_EVENT_TITLE}' ({})", event.id);

    for (user_id, participant_type) in [
        (host_id, ParticipantType::Host),
        (guest_id, ParticipantType::Participant),
    ] {
        if let Err(e) = service
            .add_participant(event.id, user_id, participant_type)
            .await
        {
            eprintln!("Failed to add participant {user_id}: {e}");
            return false;
        }
        println!("  Added user {user_id} as {}", participant_type.as_str());
    }

    true
}
