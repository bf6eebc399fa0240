use crate::host::{ConnectionId, GridCell};
use chrono::{DateTime, Utc};

/// # Per-connection command state
///
/// One `Session` exists per connected client, created on connect and dropped on
/// disconnect. It holds only bookkeeping that the toolbox itself owns; anything about the
/// player's body, items or position lives in the host.
///
/// ## Paging state
///
/// - `inventory_page` - last item page shown by `/next`, `/prev` or `/backpack`; 0 means
///   unset and is reset whenever the player enters another grid cell
/// - `rotation_page` - 0-based page `/showrotation` shows next when called without
///   arguments
#[derive(Debug, Clone)]
pub struct Session {
    pub connection: ConnectionId,
    pub inventory_page: usize,
    pub rotation_page: usize,
    pub last_cell: Option<GridCell>,
    pub spade_friendly_fire: bool,
    pub connected_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(connection: ConnectionId) -> Self {
        let now = Utc::now();
        Session {
            connection,
            inventory_page: 0,
            rotation_page: 0,
            last_cell: None,
            spade_friendly_fire: false,
            connected_at: now,
            last_activity: now,
        }
    }

    /// Update the last activity timestamp
    pub fn update_activity(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn session_duration(&self) -> chrono::Duration {
        self.last_activity - self.connected_at
    }

    /// Flip spade friendly fire and return the new state.
    pub fn toggle_spade(&mut self) -> bool {
        self.spade_friendly_fire = !self.spade_friendly_fire;
        self.spade_friendly_fire
    }
}
