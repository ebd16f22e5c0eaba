use crate::presence::{PlayerRole, PresenceView};
use macroquad::prelude::*;
use shared::{PlayerRecord, PLAYER_SIZE};

pub const LOCAL_COLOR: Color = RED;
pub const NEARBY_COLOR: Color = GREEN;
pub const OTHER_COLOR: Color = WHITE;

/// Per-frame status shown in the corner overlay.
#[derive(Debug, Clone)]
pub struct HudState {
    pub connected: bool,
    pub room: String,
    pub proximity_enabled: bool,
    pub visible: bool,
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Draws one frame. Reads the view only.
    pub fn render(&mut self, view: &PresenceView<'_>, hud: &HudState) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        // Local player last so it stays on top.
        let mut players = view.players_sorted();
        players.sort_by_key(|player| view.role_of(player) == PlayerRole::Local);

        for player in players {
            self.draw_player(player, color_for(view.role_of(player)));
        }

        if hud.visible {
            self.draw_hud(view, hud);
        }
    }

    fn draw_player(&mut self, player: &PlayerRecord, color: Color) {
        let x = player.x as f32;
        let y = player.y as f32;
        draw_rectangle(x, y, PLAYER_SIZE, PLAYER_SIZE, color);
    }

    fn draw_hud(&mut self, view: &PresenceView<'_>, hud: &HudState) {
        let y_start = 10.0;

        let (connection_color, connection_text) = if hud.connected {
            (GREEN, "online")
        } else {
            (RED, "offline")
        };
        draw_rectangle(10.0, y_start, 8.0, 8.0, connection_color);
        draw_text(
            &format!("room {}", hud.room),
            24.0,
            y_start + 8.0,
            16.0,
            WHITE,
        );
        draw_text(
            connection_text,
            self.width - 70.0,
            y_start + 8.0,
            16.0,
            connection_color,
        );

        let players_text = format!("{} players", view.players.len());
        draw_text(&players_text, 10.0, y_start + 28.0, 16.0, WHITE);

        let nearby_text = if hud.proximity_enabled {
            format!("{} nearby", view.proximity.len())
        } else {
            "proximity off".to_string()
        };
        draw_text(&nearby_text, 10.0, y_start + 46.0, 16.0, NEARBY_COLOR);

        let position_text = match view.local_player() {
            Some(me) => format!("you ({:.0}, {:.0})", me.x, me.y),
            None => "waiting for position".to_string(),
        };
        draw_text(&position_text, 10.0, y_start + 64.0, 16.0, LOCAL_COLOR);

        draw_text(
            "arrows/WASD move  P proximity  H hud  R reconnect  Esc quit",
            10.0,
            self.height - 10.0,
            14.0,
            Color::from_rgba(136, 136, 136, 255),
        );
    }
}

pub fn color_for(role: PlayerRole) -> Color {
    match role {
        PlayerRole::Local => LOCAL_COLOR,
        PlayerRole::Nearby => NEARBY_COLOR,
        PlayerRole::Other => OTHER_COLOR,
    }
}
