//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::DeckConfig;
use crate::engine::{SelectionEngine, ShuffleEvent, share};
use crate::import::{ImportOutcome, choose_file, import_into};
use crate::platform::{CommandDialer, Dialer, LogDialer, PresetPicker};
use chrono::Utc;
use dialdeck_core::{Contact, ContactStore, DialdeckError, last_spoken_label, starter_contacts};
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// ENGINE ASSEMBLY
// =============================================================================

fn build_dialer(config: &DeckConfig) -> Arc<dyn Dialer> {
    match &config.dialer.program {
        Some(program) => Arc::new(CommandDialer::new(program.clone())),
        None => Arc::new(LogDialer),
    }
}

/// Build the store and engine described by `config`, import the
/// configured seed file and `extra`, then seed the card.
pub async fn build_engine(
    config: &DeckConfig,
    extra: Option<&Path>,
    rng_seed: Option<u64>,
) -> Result<SelectionEngine, DialdeckError> {
    let store = if config.seed.builtin {
        ContactStore::with_contacts(starter_contacts())
    } else {
        ContactStore::new()
    };

    let schedule = config.schedule()?;
    let palette = config.palette()?;
    let dialer = build_dialer(config);
    let engine = match rng_seed {
        Some(seed) => SelectionEngine::with_seed(share(store), schedule, palette, dialer, seed),
        None => SelectionEngine::new(share(store), schedule, palette, dialer),
    };

    for path in config.seed.file.as_deref().into_iter().chain(extra) {
        let picker = PresetPicker::path(path);
        if let Some(report) = import_into(&engine, &picker).await? {
            tracing::info!(
                file = %path.display(),
                appended = report.appended,
                "Seed file imported"
            );
        }
    }

    engine.seed().await;
    Ok(engine)
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP control surface.
pub async fn cmd_serve(config: &DeckConfig, host: &str, port: u16) -> Result<(), DialdeckError> {
    let engine = build_engine(config, None, None).await?;
    let contacts = engine.store().read().await.len();

    println!("Dialdeck Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Contacts: {}", contacts);
    println!();
    println!("Endpoints:");
    println!("  GET    /current          - Contact on the card");
    println!("  POST   /actions/call     - Call it");
    println!("  POST   /actions/delete   - Delete it");
    println!("  POST   /actions/next     - Shuffle to another");
    println!("  GET    /contacts         - All contacts");
    println!("  PATCH  /contacts/{{id}}    - Edit a contact");
    println!("  POST   /import           - Import CSV");
    println!("  GET    /history          - Recent calls");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, engine).await
}

// =============================================================================
// PREVIEW COMMAND
// =============================================================================

/// Parse a CSV file and print the candidate contacts.
pub async fn cmd_preview(file: &Path, json_mode: bool) -> Result<(), DialdeckError> {
    let picker = PresetPicker::path(file);
    let mut parsed: Vec<Contact> = Vec::new();
    let outcome = choose_file(&picker, |contacts| parsed = contacts).await?;

    let skipped = match outcome {
        ImportOutcome::Loaded { skipped, .. } => skipped,
        ImportOutcome::Cancelled => 0,
    };

    if json_mode {
        let output = serde_json::json!({
            "file": file.to_string_lossy(),
            "count": parsed.len(),
            "skipped": skipped,
            "contacts": parsed,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Import Preview: {}", file.display());
    println!("==============");
    println!("{:>4}  {:<24} {:<12} {:<16} {}", "ID", "NAME", "DOB", "PHONE", "AVATAR");
    for contact in &parsed {
        println!(
            "{:>4}  {:<24} {:<12} {:<16} {}",
            contact.id.0,
            contact.name,
            contact.dob,
            contact.phone,
            contact.avatar.as_str()
        );
    }
    println!();
    println!("Rows:    {}", parsed.len());
    println!("Skipped: {}", skipped);

    Ok(())
}

// =============================================================================
// ROLL COMMAND
// =============================================================================

/// Run one shuffle and print each step as it happens.
pub async fn cmd_roll(
    config: &DeckConfig,
    file: Option<&Path>,
    seed: Option<u64>,
    json_mode: bool,
) -> Result<(), DialdeckError> {
    let engine = build_engine(config, file, seed).await?;
    let mut events = engine.subscribe();

    let Some(handle) = engine.shuffle().await else {
        println!("No contacts available");
        return Ok(());
    };

    while let Ok(event) = events.recv().await {
        if json_mode {
            println!("{}", serde_json::to_string(&event).unwrap_or_default());
        } else if let ShuffleEvent::Step {
            index,
            delay_ms,
            pick,
            ..
        } = &event
        {
            println!(
                "  [{:>2}] {:<24} {} (+{} ms)",
                index + 1,
                pick.contact.name,
                pick.color,
                delay_ms
            );
        }
        if matches!(event, ShuffleEvent::Finished { .. }) {
            break;
        }
    }
    handle.wait().await;

    if json_mode {
        return Ok(());
    }

    match engine.current().await {
        Some(pick) => {
            println!();
            println!("Landed on: {}", pick.contact.name);
            println!("  Phone:     {}", pick.contact.phone);
            println!("  DOB:       {}", pick.contact.dob);
            println!(
                "  Last call: {}",
                last_spoken_label(&pick.contact.last_spoken, Utc::now())
            );
        }
        None => println!("No contacts available"),
    }

    Ok(())
}
