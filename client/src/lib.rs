//! # Presence Client Library
//!
//! Client side of a real-time multiplayer presence system. The client joins a room
//! on an authoritative world-state server over a WebSocket, keeps the last snapshot
//! the server sent, works out which players are close to the local player, and
//! turns arrow-key presses into movement requests.
//!
//! ## Architecture Overview
//!
//! The server owns the world. The client never moves its own player; it asks the
//! server to, and redraws once the next snapshot confirms the new position. There
//! is no prediction and no interpolation between snapshots.
//!
//! ### State Reconciliation
//! Every `JOIN` or `WORLD_STATE` message replaces the whole player table. A `JOIN`
//! also assigns the local identity; a `WORLD_STATE` only does so when it carries a
//! `your_id`. Missing local records are a normal transient state.
//!
//! ### Proximity
//! After every store write the set of players strictly inside the proximity
//! threshold of the local player is rebuilt, before anything else can read it.
//!
//! ### Threading
//! The socket runs on a tokio task, the frame loop on the macroquad main thread.
//! Inbound frames travel through a single queue that only the frame loop drains,
//! so all writes to the world state happen in arrival order on one thread.
//!
//! ## Module Organization
//!
//! - `config`: command-line derived settings and the room-scoped endpoint
//! - `world`: [`world::WorldStateStore`], the last-known player table
//! - `proximity`: [`proximity::ProximityEngine`] and the derived set
//! - `presence`: owner of the store and its derived state; message handling
//! - `intent`: directional input to absolute `MOVE` requests
//! - `input`: keyboard sampling
//! - `network`: the WebSocket channel
//! - `rendering`: drawing players and the HUD
//! - `app`: the per-frame loop and its cancellation handle
//!
//! ## Usage Example
//!
//! ```rust
//! use client::presence::PresenceState;
//! use client::intent::{Direction, IntentDispatcher};
//! use shared::{ClientMessage, PlayerId};
//!
//! let mut presence = PresenceState::default();
//! presence.handle_text(
//!     r#"{"type":"JOIN","payload":{"your_id":"A","players":[
//!         {"id":"A","x":0,"y":0},{"id":"B","x":50,"y":0},{"id":"C","x":200,"y":0}]}}"#,
//! );
//! assert!(presence.proximity().contains(&PlayerId::from("B")));
//! assert!(!presence.proximity().contains(&PlayerId::from("C")));
//!
//! let request = IntentDispatcher::default()
//!     .on_directional_input(Direction::Right, presence.store());
//! assert_eq!(request, Some(ClientMessage::Move { x: 10.0, y: 0.0 }));
//! ```

pub mod app;
pub mod config;
pub mod input;
pub mod intent;
pub mod network;
pub mod presence;
pub mod proximity;
pub mod rendering;
pub mod world;
