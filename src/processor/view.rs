use std::sync::Arc;

use crate::fetcher::FetchError;
use crate::models::{RankedItem, RankingQuery, RankingResult};

/// Lifecycle of the active query, as seen by the presentation layer.
#[derive(Debug, Clone)]
pub enum ViewPhase {
    Idle,
    Loading,
    Ready(Arc<RankingResult>),
    Failed(FetchError),
}

/// Proof that a settled fetch belongs to the still-active query. Issued by
/// `begin`; a ticket from a superseded query is rejected by `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket {
    generation: u64,
}

/// UI-session state over the ranking pipeline: which query is active, the
/// fetch phase, and how many items are revealed.
///
/// Caching policy is keep-previous-data: while a new key loads, the prior
/// result stays visible and is replaced atomically on success. A failure
/// clears it; an error is never shown next to a partial list.
pub struct RankingView {
    initial_page_size: usize,
    page_increment: usize,
    generation: u64,
    active: Option<RankingQuery>,
    phase: ViewPhase,
    previous: Option<Arc<RankingResult>>,
    visible_count: usize,
}

impl RankingView {
    pub fn new(initial_page_size: usize, page_increment: usize) -> Self {
        RankingView {
            initial_page_size,
            page_increment,
            generation: 0,
            active: None,
            phase: ViewPhase::Idle,
            previous: None,
            visible_count: initial_page_size,
        }
    }

    /// Switch to a new query: reset pagination, enter Loading, and retire
    /// any outstanding ticket.
    pub fn begin(&mut self, query: RankingQuery) -> ViewTicket {
        self.generation += 1;
        if let ViewPhase::Ready(result) = &self.phase {
            self.previous = Some(result.clone());
        }
        self.active = Some(query);
        self.phase = ViewPhase::Loading;
        self.visible_count = self.initial_page_size;
        ViewTicket {
            generation: self.generation,
        }
    }

    /// Apply a settled fetch. Returns false (and changes nothing) when the
    /// ticket belongs to a superseded query.
    pub fn commit(
        &mut self,
        ticket: ViewTicket,
        outcome: Result<Arc<RankingResult>, FetchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.previous = None;
        self.phase = match outcome {
            Ok(result) => ViewPhase::Ready(result),
            Err(error) => ViewPhase::Failed(error),
        };
        true
    }

    /// Reveal one more page, capped at the item count. No-op at the cap.
    pub fn show_more(&mut self) {
        let total = self.displayed_result().map_or(0, |r| r.items.len());
        if self.visible_count >= total {
            return;
        }
        self.visible_count = (self.visible_count + self.page_increment).min(total);
    }

    /// The revealed slice of the displayed result.
    pub fn visible_items(&self) -> &[RankedItem] {
        match self.displayed_result() {
            Some(result) => {
                let end = self.visible_count.min(result.items.len());
                &result.items[..end]
            }
            None => &[],
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible_items().len()
    }

    pub fn has_more(&self) -> bool {
        self.displayed_result()
            .is_some_and(|r| self.visible_count < r.items.len())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ViewPhase::Loading)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.phase {
            ViewPhase::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// True when the active query succeeded with zero items. Distinct from
    /// `error`: "no items found" is rendered, not "failed to fetch".
    pub fn is_empty_result(&self) -> bool {
        matches!(&self.phase, ViewPhase::Ready(result) if result.is_empty())
    }

    pub fn active_query(&self) -> Option<&RankingQuery> {
        self.active.as_ref()
    }

    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    fn displayed_result(&self) -> Option<&Arc<RankingResult>> {
        match &self.phase {
            ViewPhase::Ready(result) => Some(result),
            ViewPhase::Loading => self.previous.as_ref(),
            _ => None,
        }
    }
}
