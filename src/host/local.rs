//! In-memory host used by the console binary and the tests.
//!
//! Players, item containers and the body model are plain data. A forced map advance is a
//! tokio sleep of the configured delay followed by the map switch.

use super::*;
use crate::commands::{Param, ParamKind};
use crate::config::Config;
use crate::error::ToolboxError;
use log::debug;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LocalPlayer {
    pub info: ConnectionInfo,
    pub position: Position,
    /// Degrees clockwise from north
    pub heading: f64,
    /// Degrees above the horizon
    pub pitch: f64,
    pub ping: PingStats,
    pub backpack: Inventory,
    pub underbarrel: Option<Item>,
    /// Rounds left in each magazine, the loaded one first
    pub magazines: Vec<u32>,
    pub blocks: u32,
    pub body: Vec<LimbStatus>,
}

/// Block count restored by a sync.
pub const FULL_BLOCKS: u32 = 50;

impl LocalPlayer {
    pub fn new(id: ConnectionId, name: &str) -> Self {
        Self {
            info: ConnectionInfo {
                id,
                name: Some(name.to_string()),
                team: Some("Blue".to_string()),
                address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
                admin: false,
                alive: true,
            },
            position: Position::new(0.5, 0.5, 0.5),
            heading: 0.0,
            pitch: 0.0,
            ping: PingStats {
                round_trip_ms: 0,
                lowest_round_trip_ms: 0,
                round_trip_variance_ms: 0,
                packet_loss: 0,
            },
            backpack: Inventory::new(),
            underbarrel: None,
            magazines: Vec::new(),
            blocks: FULL_BLOCKS,
            body: Limb::ALL.into_iter().map(healthy).collect(),
        }
    }

    pub fn admin(mut self) -> Self {
        self.info.admin = true;
        self
    }
}

fn healthy(limb: Limb) -> LimbStatus {
    LimbStatus {
        limb,
        hp: 100.0,
        fractured: false,
        splint: false,
        venous: false,
        arterial: false,
    }
}

/// Item container lying in the world.
#[derive(Debug, Clone)]
pub struct Container {
    pub position: Position,
    pub items: Inventory,
}

#[derive(Debug)]
pub struct LocalHost {
    players: BTreeMap<ConnectionId, LocalPlayer>,
    containers: Vec<Container>,
    reach: f32,
    maps: Vec<MapInfo>,
    next_index: usize,
    current: Arc<Mutex<MapInfo>>,
    advance_delay: Duration,
    broadcasts: Arc<Mutex<Vec<String>>>,
    engine: EngineStats,
    engine_trace: bool,
    weather: WeatherReport,
    terrain: Option<BlockInfo>,
}

impl LocalHost {
    pub fn new(maps: Vec<MapInfo>, advance_delay: Duration) -> Self {
        let current = maps.first().cloned().unwrap_or_else(|| MapInfo::new("Unnamed", ""));
        Self {
            players: BTreeMap::new(),
            containers: Vec::new(),
            reach: 2.0,
            next_index: usize::from(!maps.is_empty()),
            maps,
            current: Arc::new(Mutex::new(current)),
            advance_delay,
            broadcasts: Arc::new(Mutex::new(Vec::new())),
            engine: EngineStats {
                total: 0,
                alive: 0,
                lag: 0.0,
                peak: 0.0,
                usage: 0,
            },
            engine_trace: false,
            weather: WeatherReport {
                temperature: 14.0,
                pressure: 101_325.0,
                humidity: 0.6,
                wind_speed: 3.0,
                wind_azimuth: 270.0,
                cloudiness: 0.4,
            },
            terrain: Some(BlockInfo {
                material: "dirt".to_string(),
                durability: 0.5,
                crumbly: true,
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut host = Self::new(config.rotation.maps.clone(), config.rotation.advance_delay());
        host.reach = config.server.reach;
        host
    }

    pub fn add_player(&mut self, player: LocalPlayer) {
        self.players.insert(player.info.id, player);
    }

    pub fn remove_player(&mut self, id: ConnectionId) -> Option<LocalPlayer> {
        self.players.remove(&id)
    }

    pub fn player(&self, id: ConnectionId) -> Option<&LocalPlayer> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: ConnectionId) -> Option<&mut LocalPlayer> {
        self.players.get_mut(&id)
    }

    pub fn add_container(&mut self, position: Position, items: Inventory) {
        self.containers.push(Container { position, items });
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn set_engine_stats(&mut self, stats: EngineStats) {
        self.engine = stats;
    }

    pub fn engine_trace(&self) -> bool {
        self.engine_trace
    }

    pub fn set_weather(&mut self, weather: WeatherReport) {
        self.weather = weather;
    }

    pub fn set_terrain(&mut self, terrain: Option<BlockInfo>) {
        self.terrain = terrain;
    }

    /// Everything broadcast so far, oldest first.
    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    fn push_broadcast(broadcasts: &Mutex<Vec<String>>, message: &str) {
        if let Ok(mut b) = broadcasts.lock() {
            b.push(message.to_string());
        }
    }
}

impl Connections for LocalHost {
    fn connections(&self) -> Vec<ConnectionInfo> {
        self.players.values().map(|p| p.info.clone()).collect()
    }

    fn position(&self, id: ConnectionId) -> Option<Position> {
        self.players.get(&id).map(|p| p.position)
    }

    fn ping(&self, id: ConnectionId) -> Option<PingStats> {
        self.players.get(&id).map(|p| p.ping)
    }

    fn broadcast(&mut self, message: &str) {
        debug!("broadcast: {}", message);
        Self::push_broadcast(&self.broadcasts, message);
    }
}

/// Kilograms per item kind.
fn item_mass(kind: &str) -> f64 {
    match kind {
        "rifle" => 4.1,
        "grenade launcher" => 2.6,
        "grenade" => 0.4,
        "shovel" => 1.1,
        "radio" => 0.9,
        "rangefinder" => 0.5,
        "compass" | "protractor" => 0.1,
        "bandage" | "tourniquet" => 0.05,
        "splint" => 0.2,
        _ => 0.3,
    }
}

impl ItemWorld for LocalHost {
    fn backpack(&mut self, id: ConnectionId) -> Option<&mut Inventory> {
        self.players.get_mut(&id).map(|p| &mut p.backpack)
    }

    fn nearby(&mut self, id: ConnectionId) -> Vec<&mut Inventory> {
        let Some(origin) = self.players.get(&id).map(|p| p.position) else {
            return Vec::new();
        };
        let reach = self.reach;
        self.containers
            .iter_mut()
            .filter(|c| c.position.distance(&origin) <= reach)
            .map(|c| &mut c.items)
            .collect()
    }

    fn drop_item(&mut self, id: ConnectionId, item: Item) {
        let Some(position) = self.players.get(&id).map(|p| p.position) else {
            return;
        };
        let cell = position.grid_cell();
        match self
            .containers
            .iter_mut()
            .find(|c| c.position.grid_cell() == cell)
        {
            Some(container) => container.items.push(item),
            None => self.containers.push(Container {
                position,
                items: vec![item].into(),
            }),
        }
    }

    fn action_signature(&self, item: &Item) -> Signature {
        match item.kind.as_str() {
            "radio" => Signature::new(vec![Param::required("frequency", ParamKind::Float)]),
            _ => Signature::empty(),
        }
    }

    fn apply_item(&mut self, id: ConnectionId, item: &Item, args: &BoundArgs) -> Option<String> {
        let terrain = self.terrain.clone();
        let player = self.players.get_mut(&id)?;
        let consume = |player: &mut LocalPlayer| {
            player.backpack.remove(&item.id);
        };
        match item.kind.as_str() {
            "bandage" => {
                consume(player);
                player.body.iter_mut().for_each(|l| l.venous = false);
                Some("Bandage applied".to_string())
            }
            "tourniquet" => {
                consume(player);
                player.body.iter_mut().for_each(|l| l.arterial = false);
                Some("Tourniquet applied".to_string())
            }
            "splint" => {
                consume(player);
                player
                    .body
                    .iter_mut()
                    .filter(|l| l.fractured)
                    .for_each(|l| l.splint = true);
                Some("Splint applied".to_string())
            }
            "compass" => Some(format!("Azimuth: {:.0}°", player.heading)),
            "protractor" => Some(format!("Elevation: {:.1}°", player.pitch)),
            "rangefinder" => Some(match terrain {
                Some(_) => format!("Distance: {:.1} m", 25.0),
                None => "Distance: too far".to_string(),
            }),
            "grenade" => {
                consume(player);
                Some("Grenade loaded".to_string())
            }
            "grenade launcher" => {
                consume(player);
                if let Some(previous) = player.underbarrel.replace(item.clone()) {
                    player.backpack.push(previous);
                }
                Some("Grenade launcher equipped".to_string())
            }
            "radio" => match args.parse::<f64>("frequency") {
                Ok(Some(mhz)) => Some(format!("Radio tuned to {:.1} MHz", mhz)),
                Ok(None) => None,
                Err(raw) => Some(format!("Invalid frequency: {}", raw)),
            },
            _ => None,
        }
    }

    fn gear_mass(&self, id: ConnectionId) -> f64 {
        self.players
            .get(&id)
            .map(|p| p.backpack.iter().map(|i| item_mass(&i.kind)).sum::<f64>())
            .unwrap_or(0.0)
    }

    fn underbarrel(&self, id: ConnectionId) -> Option<Item> {
        self.players.get(&id)?.underbarrel.clone()
    }

    fn ammo_report(&self, id: ConnectionId) -> Option<String> {
        let player = self.players.get(&id)?;
        if player.magazines.is_empty() {
            return None;
        }
        let rounds: Vec<String> = player.magazines.iter().map(u32::to_string).collect();
        Some(format!("Magazines: {}", rounds.join(", ")))
    }

    fn sync(&mut self, id: ConnectionId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.blocks = FULL_BLOCKS;
            debug!("synced #{}", id);
        }
    }
}

impl Rotation for LocalHost {
    fn map_rotation(&self) -> Vec<MapInfo> {
        self.maps.clone()
    }

    fn current_map(&self) -> MapInfo {
        self.current
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    fn take_from_rotation(&mut self, n: usize) -> Option<MapInfo> {
        if self.maps.is_empty() || n == 0 {
            return None;
        }
        let len = self.maps.len();
        // Reduce first, `n` may be anything up to usize::MAX
        let index = (self.next_index + (n - 1) % len) % len;
        self.next_index = (index + 1) % len;
        self.maps.get(index).cloned()
    }

    fn start_advance(&mut self, target: MapInfo, message: &str) -> PendingAdvance {
        Self::push_broadcast(&self.broadcasts, message);
        let current = Arc::clone(&self.current);
        let broadcasts = Arc::clone(&self.broadcasts);
        let delay = self.advance_delay;
        let name = target.name.clone();
        PendingAdvance::spawn(target.clone(), async move {
            tokio::time::sleep(delay).await;
            let mut current = current
                .lock()
                .map_err(|_| ToolboxError::Internal("current map lock poisoned".into()))?;
            *current = target;
            Self::push_broadcast(&broadcasts, &format!("Map changed to {}", name));
            Ok(())
        })
    }
}

impl Environment for LocalHost {
    fn engine_stats(&self) -> EngineStats {
        self.engine
    }

    fn set_engine_trace(&mut self, enabled: bool) {
        self.engine_trace = enabled;
    }

    fn flush_engine(&mut self) -> usize {
        let removed = self.engine.alive;
        self.engine.alive = 0;
        removed
    }

    fn block_in_sight(&self, id: ConnectionId, range: f32) -> Option<BlockInfo> {
        if range <= 0.0 || !self.players.contains_key(&id) {
            return None;
        }
        self.terrain.clone()
    }

    fn weather(&self) -> WeatherReport {
        self.weather
    }

    fn body(&self, id: ConnectionId) -> Vec<LimbStatus> {
        self.players
            .get(&id)
            .map(|p| p.body.clone())
            .unwrap_or_default()
    }

    fn injure(&mut self, id: ConnectionId, limb: Limb, injury: Injury) {
        let Some(status) = self
            .players
            .get_mut(&id)
            .and_then(|p| p.body.iter_mut().find(|l| l.limb == limb))
        else {
            return;
        };
        match injury {
            Injury::Fracture => status.fractured = true,
            Injury::Vein => status.venous = true,
            Injury::Artery => status.arterial = true,
        }
    }
}
