use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_identity_store::{NewUser, Patch, UserPatch, UserSearchField};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,user_identity_store=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect and apply pending migrations
    let store = user_identity_store::init().await?;

    let alice = store
        .create_user(NewUser::new(Some("alice"), Some("bio-text")))
        .await?;
    let bob = store.create_user(NewUser::new(Some("bob"), None)).await?;
    tracing::info!(?alice, ?bob, "Created users");

    let updated = store
        .update_user(
            bob.id,
            UserPatch {
                one: Patch::Missing,
                two: Patch::Some("joined later".to_string()),
            },
        )
        .await?;
    tracing::info!(?updated, "Updated bob");

    let found = store
        .get_user_by(UserSearchField::InternalId(alice.internal_id))
        .await?;
    tracing::info!(?found, "Looked up alice by internal id");

    for user in store.get_all_users().await? {
        println!(
            "id={} internal_id={} one={:?} two={:?}",
            user.id, user.internal_id, user.one, user.two
        );
    }

    Ok(())
}
