//! Map rotation browsing and the forced "advance to next map" action.
//!
//! The navigator keeps at most one [`PendingAdvance`]. Starting another one cancels the
//! previous task and waits until it has actually stopped before the host is asked to start
//! again, so two map switches never overlap. Cancellation is `JoinHandle::abort`, which the
//! runtime only observes at the advance task's await points.
//!
//! States:
//!
//! ```text
//!   idle ──advance──▶ pending ──advance──▶ (cancel old, settle) ──▶ pending
//!                        │
//!                        ├── task completes ──▶ idle (planned map cleared)
//!                        └── advancecancel ───▶ idle (planned map kept)
//! ```

use crate::error::{Result, ToolboxError};
use crate::host::{MapInfo, Rotation};
use crate::paging::{Paginator, ROTATION_PAGE_SIZE};
use log::{debug, error, info};
use std::future::Future;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

pub const ADVANCE_MESSAGE: &str = "Map advance forced.";
pub const CANCEL_MESSAGE: &str = "Map advance cancelled.";

#[derive(Debug)]
pub enum AdvanceOutcome {
    Completed,
    Cancelled,
    Failed(ToolboxError),
}

/// Handle to an in-flight map switch started by the host.
#[derive(Debug)]
pub struct PendingAdvance {
    target: MapInfo,
    task: JoinHandle<()>,
    outcome: oneshot::Receiver<Result<()>>,
}

impl PendingAdvance {
    /// Run `action` as a tokio task. Must be called from within a runtime.
    pub fn spawn<F>(target: MapInfo, action: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let result = action.await;
            let _ = tx.send(result);
        });
        Self {
            target,
            task,
            outcome: rx,
        }
    }

    pub fn target(&self) -> &MapInfo {
        &self.target
    }

    /// True once the task has finished, whether it completed, failed or was cancelled.
    pub fn has_fired(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Non-blocking check; `None` while the task is still running.
    pub fn try_outcome(&mut self) -> Option<AdvanceOutcome> {
        match self.outcome.try_recv() {
            Ok(Ok(())) => Some(AdvanceOutcome::Completed),
            Ok(Err(e)) => Some(AdvanceOutcome::Failed(e)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(AdvanceOutcome::Cancelled),
        }
    }

    /// Wait for the task to stop and report how it ended.
    pub async fn settle(mut self) -> AdvanceOutcome {
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                return AdvanceOutcome::Failed(ToolboxError::Advance("advance task panicked".into()));
            }
        }
        self.try_outcome().unwrap_or(AdvanceOutcome::Cancelled)
    }
}

#[derive(Debug)]
pub struct RotationNavigator {
    pager: Paginator,
    planned: Option<MapInfo>,
    pending: Option<PendingAdvance>,
}

impl Default for RotationNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationNavigator {
    pub fn new() -> Self {
        Self {
            pager: Paginator::new(ROTATION_PAGE_SIZE),
            planned: None,
            pending: None,
        }
    }

    pub fn planned(&self) -> Option<&MapInfo> {
        self.planned.as_ref()
    }

    /// True while an advance is outstanding and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map(|p| !p.has_fired()).unwrap_or(false)
    }

    /// `/showrotation`. `cursor` is the session's 0-based next page.
    pub fn show(&self, cursor: &mut usize, arg: Option<&str>, maps: &[MapInfo]) -> String {
        let total = self.pager.page_count(maps.len());
        if total == 0 {
            return "No maps in rotation".to_string();
        }
        let page = match arg.map(str::trim).filter(|a| !a.is_empty()) {
            Some("*") => {
                return maps
                    .iter()
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
            None => *cursor % total + 1,
            Some(a) if a.chars().all(|c| c.is_ascii_digit()) => {
                a.parse::<usize>().unwrap_or(usize::MAX).clamp(1, total)
            }
            Some(query) => match self.pager.find_page(maps, query) {
                Some(page) => page,
                None => return format!("'{}' map not found", query.to_lowercase()),
            },
        };
        *cursor = page % total;
        let names = self.pager.render_window(page, maps, |m| m.name.clone());
        format!("{}/{}) {}", page, total, names)
    }

    /// `/whatsnext`: plan the next map if nothing is planned yet.
    pub fn whats_next<R: Rotation + ?Sized>(&mut self, host: &mut R) -> Option<&MapInfo> {
        self.reap();
        if self.planned.is_none() {
            self.planned = host.take_from_rotation(1);
        }
        self.planned.as_ref()
    }

    /// `/advancemap [n]`. Cancels and settles any outstanding advance, plans the `n`-th next
    /// map if none is planned, then starts a new advance towards it.
    pub async fn advance<R: Rotation + ?Sized>(&mut self, host: &mut R, skip: usize) -> Result<MapInfo> {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
            let outcome = previous.settle().await;
            self.record(outcome);
        }
        if self.planned.is_none() {
            self.planned = host.take_from_rotation(skip.max(1));
        }
        let target = self.planned.clone().ok_or(ToolboxError::EmptyRotation)?;
        info!("advancing rotation to {}", target.name);
        self.pending = Some(host.start_advance(target.clone(), ADVANCE_MESSAGE));
        Ok(target)
    }

    /// `/advancecancel`. Returns true if an outstanding advance was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.reap();
        match self.pending.take() {
            Some(pending) if !pending.has_fired() => {
                pending.cancel();
                info!("map advance to {} cancelled", pending.target().name);
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Collect a finished advance, if any.
    pub fn reap(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            if let Some(outcome) = pending.try_outcome() {
                self.pending = None;
                self.record(outcome);
            }
        }
    }

    fn record(&mut self, outcome: AdvanceOutcome) {
        match outcome {
            AdvanceOutcome::Completed => {
                debug!("map advance completed");
                self.planned = None;
            }
            // Expected when an advance is restarted or cancelled
            AdvanceOutcome::Cancelled => debug!("map advance cancelled"),
            AdvanceOutcome::Failed(e) => error!("map advance failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps(n: usize) -> Vec<MapInfo> {
        (0..n)
            .map(|i| MapInfo::new(format!("Map{i}"), "mapper"))
            .collect()
    }

    #[test]
    fn no_argument_cycles_pages() {
        let nav = RotationNavigator::new();
        let rotation = maps(12);
        let mut cursor = 0;
        let visited: Vec<String> = (0..4)
            .map(|_| nav.show(&mut cursor, None, &rotation))
            .map(|s| s.split(')').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(visited, vec!["1/3", "2/3", "3/3", "1/3"]);
    }

    #[test]
    fn explicit_page_is_clamped() {
        let nav = RotationNavigator::new();
        let rotation = maps(7);
        let mut cursor = 0;
        assert_eq!(nav.show(&mut cursor, Some("9"), &rotation), "2/2) Map5, Map6");
        assert_eq!(cursor, 0);
        assert_eq!(nav.show(&mut cursor, Some("0"), &rotation), "1/2) Map0, Map1, Map2, Map3, Map4");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn query_and_star() {
        let nav = RotationNavigator::new();
        let rotation = vec![
            MapInfo::new("Hallway", "a"),
            MapInfo::new("Island", "b"),
            MapInfo::new("Trenches", "c"),
        ];
        let mut cursor = 0;
        assert_eq!(nav.show(&mut cursor, Some("HALL"), &rotation), "1/1) Hallway, Island, Trenches");
        assert_eq!(nav.show(&mut cursor, Some("Desert"), &rotation), "'desert' map not found");
        assert_eq!(nav.show(&mut cursor, Some("*"), &rotation), "Hallway, Island, Trenches");
    }

    #[test]
    fn empty_rotation_is_reported() {
        let nav = RotationNavigator::new();
        let mut cursor = 0;
        assert_eq!(nav.show(&mut cursor, None, &[]), "No maps in rotation");
    }

    #[tokio::test]
    async fn settle_reports_cancellation() {
        let pending = PendingAdvance::spawn(MapInfo::new("A", ""), async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(())
        });
        assert!(!pending.has_fired());
        pending.cancel();
        assert!(matches!(pending.settle().await, AdvanceOutcome::Cancelled));
    }

    #[tokio::test]
    async fn settle_reports_completion_and_failure() {
        let done = PendingAdvance::spawn(MapInfo::new("A", ""), async { Ok(()) });
        assert!(matches!(done.settle().await, AdvanceOutcome::Completed));
        let failed = PendingAdvance::spawn(MapInfo::new("B", ""), async {
            Err(ToolboxError::Advance("map file missing".into()))
        });
        assert!(matches!(failed.settle().await, AdvanceOutcome::Failed(_)));
    }
}
