//! Server, rotation and mail commands.

use super::{format, sec_log, Toolbox};
use crate::commands::{BoundArgs, ChatCommand, IsAdminOnly};
use crate::error::ToolboxError;
use crate::host::{ConnectionInfo, Host};
use crate::mailbox::MailError;
use crate::rotation::CANCEL_MESSAGE;
use chrono::Utc;
use log::error;

/// `"name (#id)"` for every connection, `"#id"` for unnamed ones.
pub(super) fn list_connections<H: Host + ?Sized>(host: &H) -> String {
    host.connections()
        .iter()
        .map(ConnectionInfo::label)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn ping<H: Host + ?Sized>(host: &H, info: &ConnectionInfo, args: &BoundArgs) -> String {
    let target = match args.get("nickname") {
        None => Some(info.clone()),
        Some(nickname) => host.find_player(nickname),
    };
    let Some(target) = target else {
        return "Invalid player".to_string();
    };
    match host.ping(target.id) {
        Some(stats) => format::format_ping(&target.display_name(), &stats),
        None => format!("{}: no network statistics", target.display_name()),
    }
}

pub(super) fn list_alias(args: &BoundArgs) -> String {
    let name = args.get("command").unwrap_or_default();
    match ChatCommand::lookup(name) {
        Some(command) if command.aliases().is_empty() => {
            format!("{}: no aliases", command.keyword())
        }
        Some(command) => format!(
            "{}: {}",
            command.keyword(),
            command
                .aliases()
                .iter()
                .map(|a| format!("/{}", a))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        None => format!("Unknown command: {}", name),
    }
}

/// `/help` lists the commands the caller may run; `/help <command>` describes one.
pub(super) fn help(info: &ConnectionInfo, args: &BoundArgs) -> String {
    match args.get("command") {
        None => {
            let names: Vec<String> = ChatCommand::iter()
                .filter(|c| info.admin || c.data().admin == IsAdminOnly::NoAdmin)
                .map(|c| format!("/{}", c.keyword()))
                .collect();
            format!("Commands: {}", names.join(", "))
        }
        Some(name) => match ChatCommand::lookup(name) {
            Some(command) => format!(
                "Description: {}\nUsage: {}",
                command.data().description,
                command.help_string()
            ),
            None => format!("Unknown command: {}", name),
        },
    }
}

impl Toolbox {
    pub(super) fn mail(&self, info: &ConnectionInfo, args: &BoundArgs) -> String {
        let message = args.get("message").unwrap_or_default();
        let sender = info.display_name();
        match self
            .mailbox
            .submit(&sender, &info.address.to_string(), message, Utc::now())
        {
            Ok(_) => {
                sec_log!("mail from {} ({})", info.label(), info.address);
                "Message sent".to_string()
            }
            Err(MailError::Io(e)) => {
                error!("mailbox {}: {}", self.mailbox.path().display(), e);
                "Failed to send message".to_string()
            }
            Err(e) => e.to_string(),
        }
    }

    pub(super) fn show_rotation<H: Host + ?Sized>(&mut self, host: &H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
        let maps = host.map_rotation();
        let session = Self::session_mut(&mut self.sessions, info.id);
        Some(
            self.navigator
                .show(&mut session.rotation_page, args.get("page"), &maps),
        )
    }

    /// `/advancemap [n]`. The host broadcasts the advance itself, so success has no reply.
    pub(super) async fn advance_map<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        info: &ConnectionInfo,
        args: &BoundArgs,
    ) -> Option<String> {
        let skip = match args.parse::<usize>("skip") {
            Ok(skip) => skip.unwrap_or(1),
            Err(raw) => return Some(format!("Invalid number of maps: {}", raw)),
        };
        match self.navigator.advance(host, skip).await {
            Ok(target) => {
                sec_log!("{} forced map advance to {}", info.label(), target.name);
                None
            }
            Err(ToolboxError::EmptyRotation) => Some("No maps in rotation".to_string()),
            Err(e) => {
                error!("map advance: {}", e);
                Some("Map advance failed".to_string())
            }
        }
    }

    pub(super) fn advance_cancel<H: Host + ?Sized>(&mut self, host: &mut H, info: &ConnectionInfo) -> Option<String> {
        if self.navigator.cancel() {
            sec_log!("{} cancelled map advance", info.label());
            host.broadcast(CANCEL_MESSAGE);
        }
        None
    }
}
