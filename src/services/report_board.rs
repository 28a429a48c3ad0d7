use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::report::{Report, ReportKind};
use crate::services::report_events::ReportEvent;
use crate::services::report_service::ReportService;

/// The "manage reports" screen: both listings plus a subscription that tells
/// it which listing went stale.
pub struct ReportBoard {
    service: Arc<ReportService>,
    receiver: broadcast::Receiver<ReportEvent>,
    weekly: Vec<Report>,
    end_of_term: Vec<Report>,
}

impl ReportBoard {
    pub fn load(service: Arc<ReportService>) -> AppResult<Self> {
        let receiver = service.events().subscribe();
        let mut board = Self {
            service,
            receiver,
            weekly: Vec::new(),
            end_of_term: Vec::new(),
        };
        for kind in ReportKind::ALL {
            board.refresh(kind)?;
        }
        Ok(board)
    }

    pub fn reports(&self, kind: ReportKind) -> &[Report] {
        match kind {
            ReportKind::Weekly => &self.weekly,
            ReportKind::EndOfTerm => &self.end_of_term,
        }
    }

    pub fn refresh(&mut self, kind: ReportKind) -> AppResult<()> {
        let reports = self.service.list(kind)?;
        *self.slot(kind) = reports;
        Ok(())
    }

    /// Drains pending change events and reloads each affected listing once.
    /// Returns the kinds that were reloaded.
    pub fn sync(&mut self) -> AppResult<Vec<ReportKind>> {
        let mut stale = BTreeSet::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    stale.insert(kind_rank(event.kind));
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(target: "app::reports", skipped, "board missed change events; reloading all");
                    stale.extend(ReportKind::ALL.map(kind_rank));
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        let kinds: Vec<ReportKind> = stale
            .into_iter()
            .map(|rank| ReportKind::ALL[rank])
            .collect();
        for kind in &kinds {
            self.refresh(*kind)?;
        }
        if !kinds.is_empty() {
            debug!(target: "app::reports", ?kinds, "board synced");
        }
        Ok(kinds)
    }

    pub fn sign(&mut self, kind: ReportKind, id: &str, signer: Option<&str>) -> AppResult<Report> {
        let signed = self.service.sign(kind, id, signer)?;
        if let Some(row) = self.slot(kind).iter_mut().find(|report| report.id() == id) {
            *row = signed.clone();
        }
        Ok(signed)
    }

    /// A report someone else already removed is gone either way.
    pub fn delete(&mut self, kind: ReportKind, id: &str) -> AppResult<()> {
        match self.service.delete(kind, id) {
            Ok(()) => {}
            Err(AppError::NotFound) => {
                debug!(target: "app::reports", kind = %kind, report_id = %id, "report already gone");
            }
            Err(err) => return Err(err),
        }
        self.slot(kind).retain(|report| report.id() != id);
        Ok(())
    }

    fn slot(&mut self, kind: ReportKind) -> &mut Vec<Report> {
        match kind {
            ReportKind::Weekly => &mut self.weekly,
            ReportKind::EndOfTerm => &mut self.end_of_term,
        }
    }
}

fn kind_rank(kind: ReportKind) -> usize {
    match kind {
        ReportKind::Weekly => 0,
        ReportKind::EndOfTerm => 1,
    }
}
