use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::domain::track::{PAYLOAD_KEY_PREFIX, Track};
use crate::manifest::WebManifest;
use crate::storage::db::millis_to_local_time;
use crate::storage::operations::Storage;
use crate::store::import::{ImportOverrides, import_path};
use crate::store::playlist::PlaylistStore;
use crate::store::todo::TodoStore;

#[derive(Parser)]
#[command(name = "turntable")]
#[command(version = "0.1")]
#[command(about = "Local music player with a persisted playlist and to-do list")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current track and the state of stored audio
    Status,
    /// List the playlist
    List,
    /// Import an audio file, or every audio file in a directory
    Import {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        /// Artwork URI
        #[arg(long)]
        cover: Option<String>,
    },
    /// Remove the track at the given playlist position
    Remove {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Prev,
    /// Make the track at the given playlist position current
    Select {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Manage the to-do list
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// Print the web app manifest
    Manifest,
    /// Run http server hosting the player
    Serve,
}

#[derive(Subcommand)]
pub enum TodoCommands {
    /// Add a note
    Add { text: String },
    /// List notes
    List,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load(&cli.config)?;
    let storage = Storage::new(&cfg.database).context("Failed to initialize storage")?;

    match cli.command {
        Commands::Status => {
            let store = open_playlist(&storage, &cfg.playlist)?;
            print_current(&store);
            print_payload_status(&store, &storage)?;
        }

        Commands::List => {
            let store = open_playlist(&storage, &cfg.playlist)?;
            print_playlist(&store);
        }

        Commands::Import {
            path,
            title,
            artist,
            cover,
        } => {
            let mut store = open_playlist(&storage, &cfg.playlist)?;
            let overrides = ImportOverrides {
                title,
                artist,
                cover,
            };
            let report = import_path(&mut store, &path, cfg.import.follow_symlinks, &overrides)
                .with_context(|| format!("Failed to import {}", path.to_string_lossy()))?;

            println!("Imported {} track(s):", report.imported.len());
            for track in &report.imported {
                println!("    - {} ({})", describe(track), track.id);
            }
            if !report.skipped.is_empty() {
                println!("Already in the playlist ({}):", report.skipped.len());
                for (id, file) in &report.skipped {
                    println!("    - {file} ({id})");
                }
            }
        }

        Commands::Remove { index } => {
            let mut store = open_playlist(&storage, &cfg.playlist)?;
            let removed = match usize::try_from(index) {
                Ok(index) => store.remove_track(index).context("Failed to remove track")?,
                Err(_) => None,
            };
            match removed {
                Some(track) => println!("Removed {}", describe(&track)),
                None => println!("No track at position {index}, nothing removed"),
            }
            print_current(&store);
        }

        Commands::Next => {
            let mut store = open_playlist(&storage, &cfg.playlist)?;
            store.next_track()?;
            print_current(&store);
        }

        Commands::Prev => {
            let mut store = open_playlist(&storage, &cfg.playlist)?;
            store.prev_track()?;
            print_current(&store);
        }

        Commands::Select { index } => {
            let mut store = open_playlist(&storage, &cfg.playlist)?;
            let selected = match usize::try_from(index) {
                Ok(index) => store.select(index)?,
                Err(_) => false,
            };
            if !selected {
                println!("No track at position {index}");
            }
            print_current(&store);
        }

        Commands::Todo { command } => {
            let mut store = TodoStore::open(storage.clone())?;
            match command {
                TodoCommands::Add { text } => {
                    let todo = store.add_todo(text)?;
                    println!("Added: {}", todo.content);
                }
                TodoCommands::List => {
                    if store.list().is_empty() {
                        println!("Nothing to do");
                    }
                    for todo in store.list() {
                        println!("  [{}]  {}", millis_to_local_time(todo.id)?, todo.content);
                    }
                }
            }
        }

        Commands::Manifest => {
            println!("{}", WebManifest::from_config(&cfg.app).to_json()?);
        }

        Commands::Serve => {
            println!("Starting HTTP server...");

            let playlist = open_playlist(&storage, &cfg.playlist)?;
            let todos = TodoStore::open(storage.clone())?;
            let manifest = WebManifest::from_config(&cfg.app);

            let http_server = crate::http::server::HttpServer::new(playlist, todos, manifest, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }
    }

    Ok(())
}

fn open_playlist(
    storage: &Storage,
    conf: &config::PlaylistConfig,
) -> anyhow::Result<PlaylistStore<Storage>> {
    PlaylistStore::open(storage.clone(), conf.seed_defaults).context("Failed to load playlist")
}

fn describe(track: &Track) -> String {
    format!("{} - {}", track.artist, track.title)
}

fn print_current(store: &PlaylistStore<Storage>) {
    let current = store.current_track();
    if store.playlist().is_empty() {
        println!("Now: {} (playlist is empty)", describe(&current));
    } else {
        println!(
            "Now: {} [{}/{}]",
            describe(&current),
            store.current_index() + 1,
            store.playlist().len()
        );
    }
}

fn print_playlist(store: &PlaylistStore<Storage>) {
    if store.playlist().is_empty() {
        println!("Playlist is empty");
        return;
    }

    for (index, track) in store.playlist().iter().enumerate() {
        let marker = if index == store.current_index() { ">" } else { " " };
        let origin = if track.is_default { "bundled" } else { "imported" };
        println!("{marker} {index:>3}  {}  [{origin}]", describe(track));
        println!("         {}", track.url);
    }
}

/// Compares imported tracks with the stored payloads
fn print_payload_status(store: &PlaylistStore<Storage>, storage: &Storage) -> anyhow::Result<()> {
    let keys = storage.blob_keys()?;
    let imported = store
        .playlist()
        .iter()
        .filter(|t| !t.is_default)
        .collect::<Vec<_>>();

    println!(
        "Playlist contains {} tracks ({} imported), {} audio payloads stored",
        store.playlist().len(),
        imported.len(),
        keys.len()
    );

    let missing = imported
        .iter()
        .filter(|t| !keys.contains(&t.payload_key()))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        println!("Tracks whose audio is missing:");
        for track in missing {
            println!("    - {} ({})", describe(track), track.id);
        }
    }

    let orphans = keys
        .iter()
        .filter(|key| {
            !imported
                .iter()
                .any(|t| key.strip_prefix(PAYLOAD_KEY_PREFIX) == Some(t.id.as_str()))
        })
        .collect::<Vec<_>>();
    if !orphans.is_empty() {
        println!("Payloads no track refers to:");
        for key in orphans {
            println!("    - {key}");
        }
    }

    Ok(())
}
