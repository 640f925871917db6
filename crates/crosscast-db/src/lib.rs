//! Crosscast-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for crosscast using SQLite
//! with rusqlite and r2d2 connection pooling. It owns the three persisted
//! collections of the pipeline: episodes (the job record), processing steps
//! (the step ledger), and distributions (per-platform publish outcomes).
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use crosscast_db::pool::{init_pool, get_conn};
//! use crosscast_db::queries::episodes::{self, NewEpisode};
//! use crosscast_common::Language;
//!
//! let pool = init_pool("/var/lib/crosscast/db.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let episode = episodes::create_episode(
//!     &conn,
//!     &NewEpisode {
//!         title: "Episode 1".into(),
//!         description: String::new(),
//!         source_language: Language::En,
//!         target_language: Language::Es,
//!         media_url: "https://media.example/ep1.mp3".into(),
//!         file_size: 0,
//!     },
//! )
//! .unwrap();
//! println!("Created episode: {}", episode.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
