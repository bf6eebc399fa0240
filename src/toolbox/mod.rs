//! # Toolbox - Chat Command Actor
//!
//! [`Toolbox`] receives chat lines from the host, resolves them against the
//! [`ChatCommand`] catalogue and answers with a text reply (or nothing). It owns the
//! per-connection [`Session`]s, the [`RotationNavigator`] and a handle to the
//! [`Mailbox`]; everything else is read from or written to the [`Host`].
//!
//! ## Command flow
//!
//! 1. [`split_command`] tokenizes the line (`/name tok "quoted tok" key=value`)
//! 2. the keyword or alias is looked up in the catalogue
//! 3. `/runas` swaps the acting connection for the named player
//! 4. admin and alive flags are checked against the acting connection
//! 5. tokens are bound to the command's declared parameters
//! 6. the handler runs and returns the reply
//!
//! One toolbox processes one command at a time through `&mut self`. Administrative
//! actions are additionally logged under the `security` target.

macro_rules! sec_log {
    ($($arg:tt)*) => { log::info!(target: "security", $($arg)*); };
}
pub(crate) use sec_log;

mod admin;
mod control;
pub mod format;

use crate::commands::{split_command, BoundArgs, ChatCommand, IsAdminOnly, IsAliveOnly};
use crate::config::Config;
use crate::host::{ConnectionId, ConnectionInfo, Connections, Host, ItemWorld};
use crate::inventory::InventoryBrowser;
use crate::logutil::escape_log;
use crate::mailbox::Mailbox;
use crate::paging::Scroll;
use crate::rotation::RotationNavigator;
use crate::session::Session;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

pub const NOT_ALIVE: &str = "You must be alive to use this command";
pub const NO_ADMIN: &str = "No administrator rights!";

pub struct Toolbox {
    sessions: HashMap<ConnectionId, Session>,
    browser: InventoryBrowser,
    navigator: RotationNavigator,
    mailbox: Arc<Mailbox>,
}

impl Toolbox {
    pub fn new(mailbox: Arc<Mailbox>) -> Self {
        Self {
            sessions: HashMap::new(),
            browser: InventoryBrowser::default(),
            navigator: RotationNavigator::new(),
            mailbox,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(Mailbox::new(
            &config.mailbox.file,
            config.mailbox.cooldown(),
        )))
    }

    pub fn mailbox(&self) -> &Arc<Mailbox> {
        &self.mailbox
    }

    pub fn navigator(&self) -> &RotationNavigator {
        &self.navigator
    }

    pub fn session(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session_mut(sessions: &mut HashMap<ConnectionId, Session>, id: ConnectionId) -> &mut Session {
        sessions.entry(id).or_insert_with(|| Session::new(id))
    }

    // ------------------------------------------------------------------
    // Lifecycle hooks
    // ------------------------------------------------------------------

    pub fn on_connect(&mut self, id: ConnectionId) {
        info!("connection #{} opened", id);
        self.sessions.insert(id, Session::new(id));
    }

    pub fn on_disconnect(&mut self, id: ConnectionId) {
        if let Some(session) = self.sessions.remove(&id) {
            info!(
                "connection #{} closed after {}s",
                id,
                session.session_duration().num_seconds()
            );
        }
    }

    /// Forward a position update. Returns true when the stored item page was reset.
    pub fn on_position_update<H: Connections + ?Sized>(&mut self, host: &H, id: ConnectionId) -> bool {
        let Some(position) = host.position(id) else {
            return false;
        };
        let session = Self::session_mut(&mut self.sessions, id);
        self.browser.on_position_update(session, position)
    }

    /// Line to send once a player's reload finishes.
    pub fn on_reload_complete<H: ItemWorld + ?Sized>(&self, host: &H, id: ConnectionId) -> Option<String> {
        host.ammo_report(id)
    }

    /// Connections that have sent both a name and a team.
    pub fn player_count<H: Connections + ?Sized>(host: &H) -> usize {
        host.connections()
            .iter()
            .filter(|c| c.existing_player_sent())
            .count()
    }

    // ------------------------------------------------------------------
    // Command entry points
    // ------------------------------------------------------------------

    /// Handle one chat line. Lines not starting with `/` are ignored.
    pub async fn handle_line<H: Host + ?Sized>(&mut self, host: &mut H, id: ConnectionId, line: &str) -> Option<String> {
        let (name, tokens) = split_command(line)?;
        match ChatCommand::lookup(&name) {
            Some(command) => self.execute(host, id, command, &tokens).await,
            None => Some(format!("Unknown command: {}", name)),
        }
    }

    pub async fn execute<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        id: ConnectionId,
        command: ChatCommand,
        tokens: &[String],
    ) -> Option<String> {
        let (actor, command, tokens) = match command {
            ChatCommand::RunAs => match Self::resolve_runas(host, id, tokens) {
                Ok(resolved) => resolved,
                Err(reply) => return reply,
            },
            _ => (id, command, tokens.to_vec()),
        };
        self.run(host, actor, command, &tokens).await
    }

    /// Resolve `/runas <nickname> <command> ...` into the command to run and who runs it.
    fn resolve_runas<H: Host + ?Sized>(
        host: &H,
        id: ConnectionId,
        tokens: &[String],
    ) -> Result<(ConnectionId, ChatCommand, Vec<String>), Option<String>> {
        let caller = host.connection(id).ok_or(None)?;
        if !caller.admin {
            sec_log!("{} denied /runas", caller.label());
            return Err(Some(NO_ADMIN.to_string()));
        }
        let args = ChatCommand::RunAs
            .data()
            .args
            .bind(tokens)
            .map_err(|e| Some(usage_reply(ChatCommand::RunAs, &e.to_string())))?;
        let nickname = args.get("nickname").unwrap_or_default();
        let name = args.get("command").unwrap_or_default();
        let target = host
            .find_player(nickname)
            .ok_or_else(|| Some("Invalid player".to_string()))?;
        let command = ChatCommand::lookup(name)
            .ok_or_else(|| Some(format!("Unknown command: {}", name)))?;
        if command == ChatCommand::RunAs {
            return Err(Some("/runas cannot run itself".to_string()));
        }
        sec_log!(
            "{} runs /{} as {}",
            caller.label(),
            command,
            target.label()
        );
        Ok((target.id, command, tokens.iter().skip(2).cloned().collect()))
    }

    async fn run<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        id: ConnectionId,
        command: ChatCommand,
        tokens: &[String],
    ) -> Option<String> {
        let Some(info) = host.connection(id) else {
            warn!("command /{} from unknown connection #{}", command, id);
            return None;
        };
        let data = command.data();
        if data.admin == IsAdminOnly::Admin && !info.admin {
            sec_log!("{} denied /{}", info.label(), command);
            return Some(NO_ADMIN.to_string());
        }
        if data.alive == IsAliveOnly::Alive && !info.alive {
            return Some(NOT_ALIVE.to_string());
        }
        let args = match data.args.bind(tokens) {
            Ok(args) => args,
            Err(e) => return Some(usage_reply(command, &e.to_string())),
        };
        Self::session_mut(&mut self.sessions, id).update_activity();
        debug!(
            "{}: /{} {}",
            info.label(),
            command,
            escape_log(&tokens.join(" "))
        );
        self.dispatch(host, &info, command, &args).await
    }

    async fn dispatch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        info: &ConnectionInfo,
        command: ChatCommand,
        args: &BoundArgs,
    ) -> Option<String> {
        use ChatCommand::*;
        match command {
            Position => control::position(host, info),
            Health => Some(format::format_body(&host.body(info.id))),
            Lookat => control::lookat(host, info),
            Weather => Some(format::format_weather(&host.weather())),
            Fracture | Vein | Artery => control::injure(host, info, command, args),
            ToggleSpade => {
                let enabled = Self::session_mut(&mut self.sessions, info.id).toggle_spade();
                Some(format!(
                    "Spade friendly fire is {} now",
                    if enabled { "enabled" } else { "disabled" }
                ))
            }
            Bandage | Tourniquet | Splint | Rangefinder | Protractor | Compass | Grenade
            | Launcher => control::use_kind(host, info, command),
            Packload => Some(format!("{:.3} kg", host.gear_mass(info.id))),
            Next => self.scroll(host, info, args, Scroll::Next),
            Prev => self.scroll(host, info, args, Scroll::Previous),
            Backpack => self.backpack(host, info, args),
            Take => control::take(host, info, args),
            TakeGrenade => control::take_grenades(host, info, args),
            Underbarrel => control::underbarrel(host, info),
            Sync => {
                host.sync(info.id);
                None
            }
            Drop => control::drop(host, info, args),
            Use => control::use_item(host, info, args),
            Prioritize => control::prioritize(host, info, args),
            Engine => control::engine(host, info, args),
            ListConnections => Some(admin::list_connections(host)),
            Ping => Some(admin::ping(host, info, args)),
            Mail => Some(self.mail(info, args)),
            ListAlias => Some(admin::list_alias(args)),
            Help => Some(admin::help(info, args)),
            ShowRotation => self.show_rotation(host, info, args),
            AdvanceMap => self.advance_map(host, info, args).await,
            AdvanceCancel => self.advance_cancel(host, info),
            MapName => {
                let map = host.current_map();
                Some(format!("{} by {}", map.name, map.author))
            }
            WhatsNext => Some(match self.navigator.whats_next(host) {
                Some(map) => format!("The next map is {}", map.name),
                None => "No maps in rotation".to_string(),
            }),
            // Resolved in `execute`
            RunAs => None,
        }
    }
}

/// Reply for arguments that do not fit the command's declared parameters.
fn usage_reply(command: ChatCommand, problem: &str) -> String {
    format!("Invalid arguments: {}\nUsage: {}", problem, command.help_string())
}
