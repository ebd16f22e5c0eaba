//! Per-frame driver tying the channel, presence state, input and renderer together

use crate::config::ClientConfig;
use crate::input::{ControlEvents, InputManager};
use crate::intent::{Direction, IntentDispatcher};
use crate::network::{ChannelEvent, MessageChannel};
use crate::presence::{Applied, PresenceState};
use crate::proximity::ProximityEngine;
use crate::rendering::{HudState, Renderer};
use log::{error, info, warn};
use macroquad::prelude::next_frame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancels a running frame loop from anywhere, including the loop itself.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    cancelled: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct App<C: MessageChannel> {
    presence: PresenceState,
    dispatcher: IntentDispatcher,
    channel: C,
    input: InputManager,
    renderer: Renderer,
    room: String,
    connected: bool,
    hud_visible: bool,
    moves_sent: u64,
}

impl<C: MessageChannel> App<C> {
    pub fn new(config: &ClientConfig, channel: C) -> Self {
        Self {
            presence: PresenceState::new(
                ProximityEngine::new(config.proximity_threshold),
                config.proximity_enabled,
            ),
            dispatcher: IntentDispatcher::new(config.move_step),
            channel,
            input: InputManager::new(),
            renderer: Renderer::new(config.width, config.height),
            room: config.room.clone(),
            connected: false,
            hud_visible: true,
            moves_sent: 0,
        }
    }

    pub fn presence(&self) -> &PresenceState {
        &self.presence
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn moves_sent(&self) -> u64 {
        self.moves_sent
    }

    /// Applies every event queued since the last frame, in arrival order.
    pub fn pump_network(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.channel.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: ChannelEvent) -> Option<Applied> {
        match event {
            ChannelEvent::Connected => {
                self.connected = true;
                None
            }
            ChannelEvent::Message(text) => Some(self.presence.handle_text(&text)),
            ChannelEvent::Disconnected { reason } => {
                warn!("Connection lost: {}", reason);
                self.connected = false;
                None
            }
        }
    }

    /// Sends at most one move for the press; nothing when our position is unknown.
    pub fn handle_direction(&mut self, direction: Direction) -> bool {
        let Some(message) = self
            .dispatcher
            .on_directional_input(direction, self.presence.store())
        else {
            return false;
        };

        match self.channel.send(message) {
            Ok(()) => {
                self.moves_sent += 1;
                true
            }
            Err(e) => {
                error!("Error sending move: {}", e);
                false
            }
        }
    }

    pub fn handle_controls(&mut self, controls: ControlEvents, handle: &LoopHandle) {
        if controls.toggle_proximity {
            let enabled = !self.presence.proximity_enabled();
            self.presence.set_proximity_enabled(enabled);
            info!("Proximity highlighting: {}", enabled);
        }
        if controls.toggle_hud {
            self.hud_visible = !self.hud_visible;
        }
        if controls.reconnect {
            info!("Reconnect requested");
            if let Err(e) = self.channel.reconnect() {
                error!("Error requesting reconnect: {}", e);
            }
        }
        if controls.quit {
            handle.cancel();
        }
    }

    pub fn hud(&self) -> HudState {
        HudState {
            connected: self.connected,
            room: self.room.clone(),
            proximity_enabled: self.presence.proximity_enabled(),
            visible: self.hud_visible,
        }
    }

    /// Runs one iteration per display refresh until `handle` is cancelled.
    /// Returns the channel so the caller can shut it down.
    pub async fn run(mut self, handle: LoopHandle) -> C {
        while !handle.is_cancelled() {
            self.pump_network();

            let (controls, directions) = self.input.update();
            self.handle_controls(controls, &handle);
            for direction in directions {
                self.handle_direction(direction);
            }

            let hud = self.hud();
            self.renderer.render(&self.presence.view(), &hud);

            next_frame().await;
        }

        info!("Frame loop stopped after {} moves", self.moves_sent);
        self.channel
    }
}
