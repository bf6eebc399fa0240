//! Player body, item and engine commands.

use super::{format, sec_log, Toolbox};
use crate::commands::{BoundArgs, ChatCommand, EngineCommand};
use crate::host::{ConnectionInfo, Host, Injury, Limb};
use crate::inventory::Inventory;
use crate::paging::Scroll;
use log::debug;

/// Range of `/lookat` in blocks.
const LOOKAT_RANGE: f32 = 7.0;

const WRONG_ARITY: &str = "Wrong number of arguments";

/// Most grenades one `/takegrenade` picks up.
const MAX_GRENADES: i64 = 3;

fn not_in_backpack(id: &str) -> String {
    format!("There's no [{}] in your backpack", id.to_uppercase())
}

pub(super) fn position<H: Host + ?Sized>(host: &H, info: &ConnectionInfo) -> Option<String> {
    host.position(info.id).map(|p| p.to_string())
}

pub(super) fn lookat<H: Host + ?Sized>(host: &H, info: &ConnectionInfo) -> Option<String> {
    Some(match host.block_in_sight(info.id, LOOKAT_RANGE) {
        Some(block) => format::format_block(&block),
        None => "Block is too far".to_string(),
    })
}

/// `/fracture`, `/vein` and `/artery`.
pub(super) fn injure<H: Host + ?Sized>(
    host: &mut H,
    info: &ConnectionInfo,
    command: ChatCommand,
    args: &BoundArgs,
) -> Option<String> {
    let injury = match command {
        ChatCommand::Fracture => Injury::Fracture,
        ChatCommand::Vein => Injury::Vein,
        _ => Injury::Artery,
    };
    match args.get("limb").and_then(|l| l.parse::<Limb>().ok()) {
        Some(limb) => {
            host.injure(info.id, limb, injury);
            None
        }
        None => Some(format!(
            "Usage: /{} (torso|head|arml|armr|legl|legr)",
            command.keyword()
        )),
    }
}

/// Item kind shortcuts (`/bandage`, `/compass`, ...): apply the first item of that kind.
pub(super) fn use_kind<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, command: ChatCommand) -> Option<String> {
    let kind = command.item_kind()?;
    let item = host
        .backpack(info.id)
        .and_then(|bp| bp.first_of_kind(kind).cloned());
    let Some(item) = item else {
        return Some(format!("You do not have a {}", kind));
    };
    let no_tokens: [&str; 0] = [];
    match host.action_signature(&item).bind(&no_tokens) {
        Ok(bound) => host.apply_item(info.id, &item, &bound),
        Err(_) => Some(WRONG_ARITY.to_string()),
    }
}

pub(super) fn take<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
    let id = args.get("id").unwrap_or_default();
    let taken = host
        .nearby(info.id)
        .into_iter()
        .find_map(|container| container.remove(id));
    let Some(item) = taken else {
        return Some(format!("There's no [{}] nearby", id.to_uppercase()));
    };
    let reply = format!("Taken {}", item.label());
    match host.backpack(info.id) {
        Some(backpack) => backpack.push(item),
        None => host.drop_item(info.id, item),
    }
    Some(reply)
}

/// Move the first nearby item of `kind` into the player's backpack.
fn take_kind<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, kind: &str) -> Option<String> {
    let item = host
        .nearby(info.id)
        .into_iter()
        .find_map(|container| container.remove_first_of_kind(kind))?;
    let label = item.label();
    match host.backpack(info.id) {
        Some(backpack) => backpack.push(item),
        None => host.drop_item(info.id, item),
    }
    Some(label)
}

/// `/takegrenade [count]`: a launcher when the player has none, then up to three grenades.
pub(super) fn take_grenades<H: Host + ?Sized>(
    host: &mut H,
    info: &ConnectionInfo,
    args: &BoundArgs,
) -> Option<String> {
    let count = match args.parse::<i64>("count") {
        Ok(count) => count.unwrap_or(1),
        Err(_) => return Some("Invalid number of grenades".to_string()),
    };
    if count <= 0 {
        return Some("Invalid number of grenades".to_string());
    }

    let mut taken = Vec::new();
    let equipped = host
        .underbarrel(info.id)
        .is_some_and(|item| item.kind == "grenade launcher");
    let carried = host
        .backpack(info.id)
        .is_some_and(|bp| bp.first_of_kind("grenade launcher").is_some());
    if !equipped && !carried {
        taken.extend(take_kind(host, info, "grenade launcher"));
    }
    for _ in 0..count.min(MAX_GRENADES) {
        match take_kind(host, info, "grenade") {
            Some(label) => taken.push(label),
            None => break,
        }
    }

    if taken.is_empty() {
        return Some("Nothing to take".to_string());
    }
    host.sync(info.id);
    Some(format!("Taken {}", taken.join(", ")))
}

pub(super) fn underbarrel<H: Host + ?Sized>(host: &H, info: &ConnectionInfo) -> Option<String> {
    let item = host
        .underbarrel(info.id)
        .map(|item| item.label())
        .unwrap_or_else(|| "none".to_string());
    Some(format!("Underbarrel: {}", item))
}

pub(super) fn drop<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
    let id = args.get("id").unwrap_or_default();
    let removed = host.backpack(info.id).and_then(|bp| bp.remove(id));
    Some(match removed {
        Some(item) => {
            let reply = format!("Thrown away {}", item.label());
            host.drop_item(info.id, item);
            reply
        }
        None => not_in_backpack(id),
    })
}

pub(super) fn prioritize<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
    let id = args.get("id").unwrap_or_default();
    let moved = host
        .backpack(info.id)
        .map(|bp| bp.prioritize(id))
        .unwrap_or(false);
    if moved {
        None
    } else {
        Some(not_in_backpack(id))
    }
}

/// `/use <id> [args...]`: the remaining words are bound against the item's own parameters.
pub(super) fn use_item<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
    let id = args.get("id").unwrap_or_default();
    let item = host.backpack(info.id).and_then(|bp| bp.get(id).cloned());
    let Some(item) = item else {
        return Some(not_in_backpack(id));
    };
    let words: Vec<&str> = args.get("args").map(|a| a.split_whitespace().collect()).unwrap_or_default();
    match host.action_signature(&item).bind(&words) {
        Ok(bound) => host.apply_item(info.id, &item, &bound),
        Err(e) => {
            debug!("/use {}: {}", item.id, e);
            Some(WRONG_ARITY.to_string())
        }
    }
}

/// `/engine <debug|stats|flush> ...`
pub(super) fn engine<H: Host + ?Sized>(host: &mut H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
    let name = args.get("subcommand").unwrap_or_default();
    let Some(sub) = EngineCommand::lookup(name) else {
        return Some(format!("Unknown command: {}", name));
    };
    let words: Vec<&str> = args.get("args").map(|a| a.split_whitespace().collect()).unwrap_or_default();
    let bound = match sub.signature().bind(&words) {
        Ok(bound) => bound,
        Err(_) => return Some(WRONG_ARITY.to_string()),
    };
    Some(match sub {
        EngineCommand::Debug => match bound.get("value") {
            Some("on") => {
                host.set_engine_trace(true);
                "Debug is turned on".to_string()
            }
            Some("off") => {
                host.set_engine_trace(false);
                "Debug is turned off".to_string()
            }
            _ => "Usage: /engine debug (on|off)".to_string(),
        },
        EngineCommand::Stats => format::format_engine_stats(&host.engine_stats()),
        EngineCommand::Flush => {
            let removed = host.flush_engine();
            sec_log!("{} flushed {} engine object(s)", info.label(), removed);
            format!("Removed {} object(s)", removed)
        }
    })
}

impl Toolbox {
    /// `/next` and `/prev`.
    pub(super) fn scroll<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        info: &ConnectionInfo,
        args: &BoundArgs,
        scroll: Scroll,
    ) -> Option<String> {
        let session = Self::session_mut(&mut self.sessions, info.id);
        let nearby = host.nearby(info.id);
        Some(self.browser.scroll(session, args.get("page"), scroll, &nearby))
    }

    pub(super) fn backpack<H: Host + ?Sized>(&mut self, host: &mut H, info: &ConnectionInfo, args: &BoundArgs) -> Option<String> {
        let session = Self::session_mut(&mut self.sessions, info.id);
        let empty = Inventory::new();
        let backpack = match host.backpack(info.id) {
            Some(backpack) => &*backpack,
            None => &empty,
        };
        Some(self.browser.browse_backpack(session, args.get("page"), backpack))
    }
}
