//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire `notekeeper_core` against the in-process note service and the
//!   development identity provider.
//! - Run one scripted session and print each step deterministically.
//!
//! Usage: `notekeeper_cli [LOG_DIR]`. With `LOG_DIR` (absolute) set, events
//! are written to rolling log files there.

use log::error;
use notekeeper_core::{
    build_session, init_logging, ClientConfig, ConfigError, DevIdentityProvider,
    InMemoryActorFactory, InMemoryNoteService, LocalAuthClient, MemorySessionStorage, Network,
    NoteStore, Principal, ServiceAddress,
};
use std::process::ExitCode;
use std::sync::Arc;

const LOCAL_SERVICE_ADDRESS: &str = "bkyz2-fmaaa-aaaaa-qaaaq-cai";
const DEV_PRINCIPAL: &str = "rdmx6-jaaaa-aaaaa-aaadq-cai";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = load_config()?;
    if let Some(log_dir) = std::env::args().nth(1) {
        init_logging(config.log_level, &log_dir)?;
    }
    println!("notekeeper_core version={}", notekeeper_core::core_version());
    println!(
        "network={:?} service={} identity_provider={}",
        config.network, config.service_address, config.identity_provider
    );

    let dev_principal = Principal::from_text(DEV_PRINCIPAL).map_err(|err| err.to_string())?;
    let client = Arc::new(LocalAuthClient::new(
        Arc::new(MemorySessionStorage::new()),
        Arc::new(DevIdentityProvider::new(dev_principal)),
    ));
    let factory = Arc::new(InMemoryActorFactory::new(Arc::new(
        InMemoryNoteService::new(),
    )));
    let session = build_session(&config, client, factory);
    let store = NoteStore::new(session.clone());

    session.initialize().await;
    println!("session state={}", session.state());

    session.login().await.map_err(|err| err.to_string())?;
    let principal = session
        .principal()
        .map(|principal| principal.to_string())
        .unwrap_or_default();
    println!("session state={} principal={principal}", session.state());

    store.load().await.map_err(|err| err.to_string())?;
    for (title, content) in [("Groceries", "milk, eggs"), ("Ideas", "write more tests")] {
        store
            .create(title, content)
            .await
            .map_err(|err| err.to_string())?;
    }
    print_notes(&store);

    store
        .edit(1, "Groceries", "milk, eggs, coffee")
        .await
        .map_err(|err| err.to_string())?;
    print_notes(&store);

    store
        .delete(1, |_| true)
        .await
        .map_err(|err| err.to_string())?;
    print_notes(&store);

    session.logout().await.map_err(|err| err.to_string())?;
    store.clear();
    println!("session state={}", session.state());
    Ok(())
}

/// Environment config, defaulting to the local replica when no service
/// address is set.
fn load_config() -> Result<ClientConfig, String> {
    match ClientConfig::from_env() {
        Ok(config) => Ok(config),
        Err(ConfigError::MissingServiceAddress) => {
            let service =
                ServiceAddress::parse(LOCAL_SERVICE_ADDRESS).map_err(|err| err.to_string())?;
            Ok(ClientConfig::for_network(Network::Local, service))
        }
        Err(err) => Err(err.to_string()),
    }
}

fn print_notes(store: &NoteStore) {
    let notes = store.notes();
    println!("notes count={}", notes.len());
    for note in notes {
        println!("  #{} {}: {}", note.id, note.title, note.content);
    }
}
