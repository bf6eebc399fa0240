//! # Host Collaborator Interfaces
//!
//! The toolbox does not own the game world. Everything it reports or changes goes through
//! the traits in this module, which the server runtime implements:
//!
//! - [`Connections`] - connected players, authorization flags, addresses, positions
//! - [`ItemWorld`] - backpacks, nearby item containers and item behaviour
//! - [`Rotation`] - the map rotation and the asynchronous "advance" action
//! - [`Environment`] - physics engine, weather and body model queries
//!
//! [`LocalHost`] is a self-contained in-memory implementation used by the console binary
//! and by the tests.

pub mod local;

use crate::commands::{BoundArgs, Signature};
use crate::inventory::{Inventory, Item};
use crate::paging::Named;
use crate::rotation::PendingAdvance;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

pub use local::LocalHost;

pub type ConnectionId = u32;

/// World position in blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Integer cell containing this position (each coordinate floored).
    pub fn grid_cell(&self) -> GridCell {
        GridCell {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// What the host knows about one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    /// `None` until the client has sent its name.
    pub name: Option<String>,
    pub team: Option<String>,
    pub address: IpAddr,
    pub admin: bool,
    pub alive: bool,
}

impl ConnectionInfo {
    /// `"name (#id)"` or `"#id"` for a connection that has not named itself yet.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} (#{})", name, self.id),
            None => format!("#{}", self.id),
        }
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", self.id))
    }

    /// A player counts once both name and team were sent.
    pub fn existing_player_sent(&self) -> bool {
        self.name.is_some() && self.team.is_some()
    }
}

/// Round-trip statistics of a peer. `packet_loss` uses the transport's fixed-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingStats {
    pub round_trip_ms: u32,
    pub lowest_round_trip_ms: u32,
    pub round_trip_variance_ms: u32,
    pub packet_loss: u32,
}

/// Fixed-point scale of [`PingStats::packet_loss`].
pub const PACKET_LOSS_SCALE: u32 = 1 << 16;

impl PingStats {
    pub fn packet_loss_percent(&self) -> f64 {
        self.packet_loss as f64 * 100.0 / PACKET_LOSS_SCALE as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub name: String,
    #[serde(default)]
    pub author: String,
}

impl MapInfo {
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
        }
    }
}

impl Named for MapInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    pub total: usize,
    pub alive: usize,
    /// Microseconds
    pub lag: f64,
    /// Microseconds
    pub peak: f64,
    /// Bytes
    pub usage: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub material: String,
    pub durability: f64,
    pub crumbly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReport {
    /// Celsius
    pub temperature: f64,
    /// Pascal
    pub pressure: f64,
    /// 0..=1
    pub humidity: f64,
    /// m/s
    pub wind_speed: f64,
    /// Degrees clockwise from north the wind blows towards
    pub wind_azimuth: f64,
    /// 0..=1
    pub cloudiness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limb {
    Torso,
    Head,
    ArmL,
    ArmR,
    LegL,
    LegR,
}

impl Limb {
    pub const ALL: [Limb; 6] = [Limb::Torso, Limb::Head, Limb::ArmL, Limb::ArmR, Limb::LegL, Limb::LegR];

    pub fn keyword(&self) -> &'static str {
        match self {
            Limb::Torso => "torso",
            Limb::Head => "head",
            Limb::ArmL => "arml",
            Limb::ArmR => "armr",
            Limb::LegL => "legl",
            Limb::LegR => "legr",
        }
    }

    /// Short label used in the health line.
    pub fn abbrev(&self) -> &'static str {
        match self {
            Limb::Torso => "t",
            Limb::Head => "h",
            Limb::ArmL => "al",
            Limb::ArmR => "ar",
            Limb::LegL => "ll",
            Limb::LegR => "lr",
        }
    }
}

impl FromStr for Limb {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        Limb::ALL
            .into_iter()
            .find(|l| l.keyword() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injury {
    Fracture,
    Vein,
    Artery,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbStatus {
    pub limb: Limb,
    pub hp: f64,
    pub fractured: bool,
    pub splint: bool,
    pub venous: bool,
    pub arterial: bool,
}

/// Players and their network state.
pub trait Connections {
    fn connections(&self) -> Vec<ConnectionInfo>;

    fn connection(&self, id: ConnectionId) -> Option<ConnectionInfo> {
        self.connections().into_iter().find(|c| c.id == id)
    }

    /// Resolve `#id` or a case-insensitive nickname.
    fn find_player(&self, nickname: &str) -> Option<ConnectionInfo> {
        if let Some(id) = nickname.strip_prefix('#').and_then(|n| n.parse().ok()) {
            return self.connection(id);
        }
        self.connections().into_iter().find(|c| {
            c.name
                .as_deref()
                .map(|n| n.eq_ignore_ascii_case(nickname))
                .unwrap_or(false)
        })
    }

    fn position(&self, id: ConnectionId) -> Option<Position>;

    fn ping(&self, id: ConnectionId) -> Option<PingStats>;

    fn broadcast(&mut self, message: &str);
}

/// Item containers and item behaviour.
pub trait ItemWorld {
    fn backpack(&mut self, id: ConnectionId) -> Option<&mut Inventory>;

    /// Containers within reach of the player, in a stable order for this call only.
    fn nearby(&mut self, id: ConnectionId) -> Vec<&mut Inventory>;

    /// Put an item into the world at the player's feet.
    fn drop_item(&mut self, id: ConnectionId, item: Item);

    /// Parameters of the item's action, bound against `/use` arguments.
    fn action_signature(&self, item: &Item) -> Signature;

    fn apply_item(&mut self, id: ConnectionId, item: &Item, args: &BoundArgs) -> Option<String>;

    /// Kilograms
    fn gear_mass(&self, id: ConnectionId) -> f64;

    /// Item mounted under the barrel of the player's weapon.
    fn underbarrel(&self, id: ConnectionId) -> Option<Item>;

    /// Ammo line of the player's weapon, sent after a reload.
    fn ammo_report(&self, id: ConnectionId) -> Option<String>;

    /// Push the player's block count and gear back to the client.
    fn sync(&mut self, id: ConnectionId);
}

/// The map rotation.
pub trait Rotation {
    fn map_rotation(&self) -> Vec<MapInfo>;

    fn current_map(&self) -> MapInfo;

    /// Consume `n` maps from the rotator and return the last one consumed.
    fn take_from_rotation(&mut self, n: usize) -> Option<MapInfo>;

    /// Begin switching to `target`. Must be called inside a tokio runtime.
    fn start_advance(&mut self, target: MapInfo, message: &str) -> PendingAdvance;
}

/// Physics, weather and body model.
pub trait Environment {
    fn engine_stats(&self) -> EngineStats;

    fn set_engine_trace(&mut self, enabled: bool);

    /// Remove every live object, returning how many there were.
    fn flush_engine(&mut self) -> usize;

    fn block_in_sight(&self, id: ConnectionId, range: f32) -> Option<BlockInfo>;

    fn weather(&self) -> WeatherReport;

    fn body(&self, id: ConnectionId) -> Vec<LimbStatus>;

    fn injure(&mut self, id: ConnectionId, limb: Limb, injury: Injury);
}

pub trait Host: Connections + ItemWorld + Rotation + Environment {}

impl<T: Connections + ItemWorld + Rotation + Environment> Host for T {}
