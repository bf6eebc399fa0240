//! Test utilities & fixtures.
//! Builds a local host with two players, a nearby crate and a temporary mailbox.

#![allow(dead_code)] // each test crate uses a different subset

use std::sync::Arc;
use std::time::Duration;

use milsim_toolbox::host::local::LocalPlayer;
use milsim_toolbox::host::{LocalHost, MapInfo, Position};
use milsim_toolbox::inventory::{Inventory, Item};
use milsim_toolbox::mailbox::Mailbox;
use milsim_toolbox::toolbox::Toolbox;

pub const ADMIN: u32 = 1;
pub const GRUNT: u32 = 2;

pub fn rotation(n: usize) -> Vec<MapInfo> {
    (0..n)
        .map(|i| MapInfo::new(format!("Map{i}"), format!("Author{i}")))
        .collect()
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub host: LocalHost,
    pub toolbox: Toolbox,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_maps(rotation(7), Duration::from_millis(50))
    }

    pub fn with_maps(maps: Vec<MapInfo>, advance_delay: Duration) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut host = LocalHost::new(maps, advance_delay);

        let mut admin = LocalPlayer::new(ADMIN, "Sarge").admin();
        admin.backpack = Inventory::from(vec![
            Item::new("b1", "Bandage", "bandage"),
            Item::new("c1", "Compass", "compass"),
            Item::new("rd", "Field radio", "radio"),
        ]);
        host.add_player(admin);
        host.add_player(LocalPlayer::new(GRUNT, "Deuce"));
        host.add_container(
            Position::new(1.0, 0.5, 0.5),
            (1..=4)
                .map(|i| Item::new(format!("a{i}"), format!("Ammo box {i}"), "ammo"))
                .collect::<Vec<_>>()
                .into(),
        );

        let mailbox = Mailbox::new(dir.path().join("mailbox.txt"), Duration::from_secs(90));
        let mut toolbox = Toolbox::new(Arc::new(mailbox));
        toolbox.on_connect(ADMIN);
        toolbox.on_connect(GRUNT);

        Self { dir, host, toolbox }
    }

    pub async fn say(&mut self, id: u32, line: &str) -> Option<String> {
        self.toolbox.handle_line(&mut self.host, id, line).await
    }

    /// Reply text, panicking when the command stayed silent.
    pub async fn reply(&mut self, id: u32, line: &str) -> String {
        self.say(id, line)
            .await
            .unwrap_or_else(|| panic!("no reply to {line}"))
    }
}
