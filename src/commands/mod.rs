//! Chat command catalogue.
//!
//! Each [`ChatCommand`] carries its keyword, aliases, declared parameters and
//! authorization flags. The catalogue is static; dispatch lives in
//! [`crate::toolbox`].

pub mod args;

use std::fmt;
use std::str::FromStr;

pub use args::{BindError, BoundArgs, Param, ParamKind, Requirement, Signature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsAdminOnly {
    Admin,
    NoAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsAliveOnly {
    Alive,
    Anyone,
}

pub struct CommandData {
    pub args: Signature,
    pub description: &'static str,
    pub admin: IsAdminOnly,
    pub alive: IsAliveOnly,
}

impl CommandData {
    fn new(args: Vec<Param>, description: &'static str) -> Self {
        Self {
            args: Signature::new(args),
            description,
            admin: IsAdminOnly::NoAdmin,
            alive: IsAliveOnly::Anyone,
        }
    }

    fn admin(mut self) -> Self {
        self.admin = IsAdminOnly::Admin;
        self
    }

    fn alive(mut self) -> Self {
        self.alive = IsAliveOnly::Alive;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatCommand {
    // Player state
    Position,
    Health,
    Lookat,
    Weather,
    Fracture,
    Vein,
    Artery,
    ToggleSpade,
    // Item shortcuts
    Bandage,
    Tourniquet,
    Splint,
    Rangefinder,
    Protractor,
    Compass,
    Grenade,
    Launcher,
    TakeGrenade,
    Underbarrel,
    // Inventory
    Packload,
    Next,
    Prev,
    Backpack,
    Take,
    Drop,
    Use,
    Prioritize,
    Sync,
    // Server
    Engine,
    RunAs,
    ListConnections,
    Ping,
    Mail,
    ListAlias,
    Help,
    ShowRotation,
    AdvanceMap,
    AdvanceCancel,
    MapName,
    WhatsNext,
}

const ALL: [ChatCommand; 39] = [
    ChatCommand::Position,
    ChatCommand::Health,
    ChatCommand::Lookat,
    ChatCommand::Weather,
    ChatCommand::Fracture,
    ChatCommand::Vein,
    ChatCommand::Artery,
    ChatCommand::ToggleSpade,
    ChatCommand::Bandage,
    ChatCommand::Tourniquet,
    ChatCommand::Splint,
    ChatCommand::Rangefinder,
    ChatCommand::Protractor,
    ChatCommand::Compass,
    ChatCommand::Grenade,
    ChatCommand::Launcher,
    ChatCommand::TakeGrenade,
    ChatCommand::Underbarrel,
    ChatCommand::Packload,
    ChatCommand::Next,
    ChatCommand::Prev,
    ChatCommand::Backpack,
    ChatCommand::Take,
    ChatCommand::Drop,
    ChatCommand::Use,
    ChatCommand::Prioritize,
    ChatCommand::Sync,
    ChatCommand::Engine,
    ChatCommand::RunAs,
    ChatCommand::ListConnections,
    ChatCommand::Ping,
    ChatCommand::Mail,
    ChatCommand::ListAlias,
    ChatCommand::Help,
    ChatCommand::ShowRotation,
    ChatCommand::AdvanceMap,
    ChatCommand::AdvanceCancel,
    ChatCommand::MapName,
    ChatCommand::WhatsNext,
];

impl ChatCommand {
    pub fn iter() -> impl Iterator<Item = Self> {
        ALL.into_iter()
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ChatCommand::Position => "position",
            ChatCommand::Health => "health",
            ChatCommand::Lookat => "lookat",
            ChatCommand::Weather => "weather",
            ChatCommand::Fracture => "fracture",
            ChatCommand::Vein => "vein",
            ChatCommand::Artery => "artery",
            ChatCommand::ToggleSpade => "togglespade",
            ChatCommand::Bandage => "bandage",
            ChatCommand::Tourniquet => "tourniquet",
            ChatCommand::Splint => "splint",
            ChatCommand::Rangefinder => "rangefinder",
            ChatCommand::Protractor => "protractor",
            ChatCommand::Compass => "compass",
            ChatCommand::Grenade => "grenade",
            ChatCommand::Launcher => "launcher",
            ChatCommand::TakeGrenade => "takegrenade",
            ChatCommand::Underbarrel => "underbarrel",
            ChatCommand::Packload => "packload",
            ChatCommand::Next => "next",
            ChatCommand::Prev => "prev",
            ChatCommand::Backpack => "backpack",
            ChatCommand::Take => "take",
            ChatCommand::Drop => "drop",
            ChatCommand::Use => "use",
            ChatCommand::Prioritize => "prioritize",
            ChatCommand::Sync => "sync",
            ChatCommand::Engine => "engine",
            ChatCommand::RunAs => "runas",
            ChatCommand::ListConnections => "listconnections",
            ChatCommand::Ping => "ping",
            ChatCommand::Mail => "mail",
            ChatCommand::ListAlias => "listalias",
            ChatCommand::Help => "help",
            ChatCommand::ShowRotation => "showrotation",
            ChatCommand::AdvanceMap => "advancemap",
            ChatCommand::AdvanceCancel => "advancecancel",
            ChatCommand::MapName => "mapname",
            ChatCommand::WhatsNext => "whatsnext",
        }
    }

    /// Extra names besides [`ChatCommand::keyword`].
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ChatCommand::Position => &["pos"],
            ChatCommand::ToggleSpade => &["ts"],
            ChatCommand::Bandage => &["b"],
            ChatCommand::Tourniquet => &["t"],
            ChatCommand::Splint => &["s"],
            ChatCommand::Rangefinder => &["rf"],
            ChatCommand::Grenade => &["gr"],
            ChatCommand::Launcher => &["gl"],
            ChatCommand::TakeGrenade => &["tg"],
            ChatCommand::Underbarrel => &["ub"],
            ChatCommand::Packload => &["gearmass", "plo", "gma"],
            ChatCommand::Next => &["n"],
            ChatCommand::Prev => &["p"],
            ChatCommand::Backpack => &["bp"],
            ChatCommand::Use => &["u"],
            ChatCommand::Prioritize => &["pr"],
            ChatCommand::ListConnections => &["lscon"],
            ChatCommand::Mail => &["admin"],
            ChatCommand::ListAlias => &["alias", "lsal"],
            ChatCommand::Help => &["info"],
            ChatCommand::ShowRotation => &["shr"],
            ChatCommand::AdvanceMap => &["advance", "adv"],
            ChatCommand::AdvanceCancel => &["advca", "adc"],
            ChatCommand::WhatsNext => &["nextmap", "wsn"],
            _ => &[],
        }
    }

    /// Item kind consumed by the item shortcut commands.
    pub fn item_kind(&self) -> Option<&'static str> {
        match self {
            ChatCommand::Bandage => Some("bandage"),
            ChatCommand::Tourniquet => Some("tourniquet"),
            ChatCommand::Splint => Some("splint"),
            ChatCommand::Rangefinder => Some("rangefinder"),
            ChatCommand::Protractor => Some("protractor"),
            ChatCommand::Compass => Some("compass"),
            ChatCommand::Grenade => Some("grenade"),
            ChatCommand::Launcher => Some("grenade launcher"),
            _ => None,
        }
    }

    pub fn data(&self) -> CommandData {
        use ParamKind::*;
        let page = || vec![Param::optional("page", Word)];
        let limb = || vec![Param::optional("limb", Word)];
        match self {
            ChatCommand::Position => {
                CommandData::new(vec![], "Print the current position on the map").alive()
            }
            ChatCommand::Health => CommandData::new(vec![], "Report health status").alive(),
            ChatCommand::Lookat => {
                CommandData::new(vec![], "Report a given block durability").alive()
            }
            ChatCommand::Weather => {
                CommandData::new(vec![], "Report current weather conditions")
            }
            ChatCommand::Fracture => {
                CommandData::new(limb(), "Break the specified limb (useful for debug)").alive()
            }
            ChatCommand::Vein => {
                CommandData::new(limb(), "Cut a vein in the specified limb (useful for debug)")
                    .alive()
            }
            ChatCommand::Artery => CommandData::new(
                limb(),
                "Cut an artery in the specified limb (useful for debug)",
            )
            .alive(),
            ChatCommand::ToggleSpade => {
                CommandData::new(vec![], "Toggle spade friendly fire")
            }
            ChatCommand::Bandage => {
                CommandData::new(vec![], "Put the bandage (used to stop venous bleeding)").alive()
            }
            ChatCommand::Tourniquet => CommandData::new(
                vec![],
                "Put the tourniquet (used to stop arterial bleeding)",
            )
            .alive(),
            ChatCommand::Splint => CommandData::new(vec![], "Splint a broken limb").alive(),
            ChatCommand::Rangefinder => CommandData::new(
                vec![],
                "Measure the distance between the player and a given point",
            )
            .alive(),
            ChatCommand::Protractor => CommandData::new(
                vec![],
                "Measure the angle between the player and two specified points",
            )
            .alive(),
            ChatCommand::Compass => CommandData::new(vec![], "Print the current azimuth").alive(),
            ChatCommand::Grenade => {
                CommandData::new(vec![], "Load a grenade into a grenade launcher").alive()
            }
            ChatCommand::Launcher => {
                CommandData::new(vec![], "Equip a grenade launcher").alive()
            }
            ChatCommand::TakeGrenade => CommandData::new(
                vec![Param::optional("count", Integer)],
                "Try to take a given number of grenades and a grenade launcher",
            )
            .alive(),
            ChatCommand::Underbarrel => {
                CommandData::new(vec![], "Print equipped underbarrel item").alive()
            }
            ChatCommand::Packload => CommandData::new(vec![], "Print player's gear weight").alive(),
            ChatCommand::Next => {
                CommandData::new(page(), "Scroll to the next or specified page").alive()
            }
            ChatCommand::Prev => {
                CommandData::new(page(), "Scroll to the previous or specified page").alive()
            }
            ChatCommand::Backpack => CommandData::new(
                page(),
                "Print specified page in the player's inventory",
            )
            .alive(),
            ChatCommand::Take => CommandData::new(
                vec![Param::required("id", Word)],
                "Take an item with the given ID to the inventory",
            )
            .alive(),
            ChatCommand::Drop => CommandData::new(
                vec![Param::required("id", Word)],
                "Drop an item with the given ID from the inventory",
            )
            .alive(),
            ChatCommand::Use => CommandData::new(
                vec![Param::required("id", Word), Param::optional("args", Rest)],
                "Use an item from the inventory with the given ID",
            )
            .alive(),
            ChatCommand::Prioritize => CommandData::new(
                vec![Param::required("id", Word)],
                "Give the highest priority to an item with the given ID",
            )
            .alive(),
            ChatCommand::Sync => CommandData::new(vec![], "Restore block count").alive(),
            ChatCommand::Engine => CommandData::new(
                vec![Param::required("subcommand", Word), Param::optional("args", Rest)],
                "Inspect or control the physics engine",
            )
            .admin(),
            ChatCommand::RunAs => CommandData::new(
                vec![
                    Param::required("nickname", Word),
                    Param::required("command", Word),
                    Param::optional("args", Rest),
                ],
                "Run command as other player",
            )
            .admin(),
            ChatCommand::ListConnections => CommandData::new(vec![], "List players online"),
            ChatCommand::Ping => CommandData::new(
                vec![Param::optional("nickname", Word)],
                "Tell current ping of the given player (time for your actions to be received by the server)",
            ),
            ChatCommand::Mail => CommandData::new(
                vec![Param::optional("message", Rest)],
                "Leave a message to the server administrator even if they are offline",
            ),
            ChatCommand::ListAlias => CommandData::new(
                vec![Param::required("command", Word)],
                "List all aliases to the given command",
            ),
            ChatCommand::Help => CommandData::new(
                vec![Param::optional("command", Word)],
                "Gives description and usage info for a command",
            ),
            ChatCommand::ShowRotation => CommandData::new(
                vec![Param::optional("page", Word)],
                "Scroll through the current map rotation",
            ),
            ChatCommand::AdvanceMap => CommandData::new(
                vec![Param::optional("skip", Integer)],
                "Force the next map to be immediately loaded instead of waiting for the time limit to end",
            )
            .admin(),
            ChatCommand::AdvanceCancel => {
                CommandData::new(vec![], "Cancel map /advance").admin()
            }
            ChatCommand::MapName => {
                CommandData::new(vec![], "Print the name of the current map")
            }
            ChatCommand::WhatsNext => CommandData::new(vec![], "Print name of the next map"),
        }
    }

    /// `/keyword <args>` usage line.
    pub fn help_string(&self) -> String {
        let usage = self.data().args.usage();
        if usage.is_empty() {
            format!("/{}", self.keyword())
        } else {
            format!("/{} {}", self.keyword(), usage)
        }
    }

    /// Resolve a keyword or alias, ignoring case and an optional leading `/`.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.strip_prefix('/').unwrap_or(name).to_ascii_lowercase();
        Self::iter().find(|c| c.keyword() == name || c.aliases().iter().any(|a| *a == name))
    }
}

impl fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for ChatCommand {
    type Err = ();

    fn from_str(keyword: &str) -> Result<ChatCommand, ()> {
        Self::lookup(keyword).ok_or(())
    }
}

/// Sub-commands of `/engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Debug,
    Stats,
    Flush,
}

impl EngineCommand {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(EngineCommand::Debug),
            "stats" => Some(EngineCommand::Stats),
            "flush" => Some(EngineCommand::Flush),
            _ => None,
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            EngineCommand::Debug => {
                Signature::new(vec![Param::optional("value", ParamKind::Word)])
            }
            EngineCommand::Stats | EngineCommand::Flush => Signature::empty(),
        }
    }
}

/// Split a chat line into a command name and its tokens.
///
/// Returns `None` unless the line starts with `/`. Double quotes group words into one
/// token; an unterminated quote runs to the end of the line.
pub fn split_command(line: &str) -> Option<(String, Vec<String>)> {
    let body = line.trim().strip_prefix('/')?;
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_token = false;
    for ch in body.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                has_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    if tokens.is_empty() {
        return None;
    }
    let name = tokens.remove(0);
    Some((name, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for cmd in ChatCommand::iter() {
            assert!(seen.insert(cmd.keyword()), "duplicate keyword {}", cmd.keyword());
            for alias in cmd.aliases() {
                assert!(seen.insert(*alias), "duplicate alias {}", alias);
            }
        }
    }

    #[test]
    fn lookup_accepts_aliases_and_case() {
        assert_eq!(ChatCommand::lookup("SHR"), Some(ChatCommand::ShowRotation));
        assert_eq!(ChatCommand::lookup("/adc"), Some(ChatCommand::AdvanceCancel));
        assert_eq!("admin".parse::<ChatCommand>(), Ok(ChatCommand::Mail));
        assert_eq!(ChatCommand::lookup("eval"), None);
    }

    #[test]
    fn admin_flags() {
        for cmd in [
            ChatCommand::Engine,
            ChatCommand::RunAs,
            ChatCommand::AdvanceMap,
            ChatCommand::AdvanceCancel,
        ] {
            assert_eq!(cmd.data().admin, IsAdminOnly::Admin, "{cmd}");
        }
        assert_eq!(ChatCommand::Mail.data().admin, IsAdminOnly::NoAdmin);
        assert_eq!(ChatCommand::ShowRotation.data().alive, IsAliveOnly::Anyone);
        assert_eq!(ChatCommand::Next.data().alive, IsAliveOnly::Alive);
    }

    #[test]
    fn help_strings() {
        assert_eq!(ChatCommand::Take.help_string(), "/take <id>");
        assert_eq!(ChatCommand::MapName.help_string(), "/mapname");
        assert_eq!(ChatCommand::Mail.help_string(), "/mail [message...]");
        assert_eq!(ChatCommand::TakeGrenade.help_string(), "/takegrenade [count]");
        assert_eq!(ChatCommand::lookup("ub"), Some(ChatCommand::Underbarrel));
    }

    #[test]
    fn split_handles_quotes() {
        let (name, tokens) = split_command("/runas \"Big Al\" mail hi there").unwrap();
        assert_eq!(name, "runas");
        assert_eq!(tokens, vec!["Big Al", "mail", "hi", "there"]);
        let (name, tokens) = split_command("  /shr  ").unwrap();
        assert_eq!(name, "shr");
        assert!(tokens.is_empty());
        assert!(split_command("hello").is_none());
        assert!(split_command("/").is_none());
    }
}
