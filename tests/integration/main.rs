//! Live tests against zwiftpower.com.
//!
//! These tests need ZwiftPower credentials in the system keyring
//! (`zwift-racing-api set-credentials`) and the ids to query:
//!
//! ```text
//! ZP_TEST_RIDER_ID=... ZP_TEST_TEAM_ID=... cargo test --test integration -- --ignored
//! ```

use zwift_racing_api::config::Config;
use zwift_racing_api::credentials::{Credentials, KeyringStore};
use zwift_racing_api::zwiftpower::{ZwiftFetch, ZwiftPowerClient};

/// Build a live client, or `None` when credentials are not configured.
fn live_client() -> Option<ZwiftPowerClient> {
    let config = Config::load().ok()?;
    let credentials = Credentials::load(&KeyringStore::new(), &config.keyring_service).ok()?;
    ZwiftPowerClient::new(&config, credentials).ok()
}

fn env_id(name: &str) -> Option<i64> {
    std::env::var(name).ok()?.parse().ok()
}

#[tokio::test]
#[ignore = "requires ZwiftPower credentials in the keyring"]
async fn test_fetch_rider() {
    let (Some(client), Some(zwift_id)) = (live_client(), env_id("ZP_TEST_RIDER_ID")) else {
        println!("Skipping: credentials or ZP_TEST_RIDER_ID not set");
        return;
    };

    let riders = client.fetch_riders(&[zwift_id]).await;
    assert!(riders.is_ok(), "Failed to fetch rider: {:?}", riders.err());

    let riders = riders.unwrap();
    let rider = riders.get(&zwift_id).expect("rider should exist");
    println!("Rider: {:?} ({} races)", rider.name(), rider.race_count());
}

#[tokio::test]
#[ignore = "requires ZwiftPower credentials in the keyring"]
async fn test_fetch_team() {
    let (Some(client), Some(team_id)) = (live_client(), env_id("ZP_TEST_TEAM_ID")) else {
        println!("Skipping: credentials or ZP_TEST_TEAM_ID not set");
        return;
    };

    let teams = client.fetch_teams(&[team_id]).await;
    assert!(teams.is_ok(), "Failed to fetch team: {:?}", teams.err());

    let teams = teams.unwrap();
    let team = teams.get(&team_id).expect("team should exist");
    assert!(team.rider_count() > 0);
    println!("Team {} has {} riders", team_id, team.rider_count());
}
