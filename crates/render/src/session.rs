//! Ordering guard for overlapping renders.
//!
//! Each render takes a ticket from a monotonically increasing sequence. Only
//! the most recently started render may be displayed; results of older
//! renders are dropped when they finish.

use crate::hydrate::{HydrateOptions, hydrate};
use crate::renderer::{RenderOptions, Rendered, render_markdown};
use mdview_core::MdviewError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Sequence number of a started render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    /// Sequence number.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Displayed {
    ticket: RenderTicket,
    html: String,
    hydrated: bool,
}

/// Tracks which render is current and what is on display.
#[derive(Debug, Default)]
pub struct RenderSession {
    latest: AtomicU64,
    displayed: Mutex<Option<Displayed>>,
}

impl RenderSession {
    /// Empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn displayed_slot(&self) -> MutexGuard<'_, Option<Displayed>> {
        self.displayed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a render; any render started earlier becomes stale.
    pub fn begin(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` belongs to the most recently started render.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Display a finished render. Stale results are dropped and `false` is
    /// returned.
    pub fn finish(&self, ticket: RenderTicket, rendered: Rendered) -> bool {
        let mut slot = self.displayed_slot();
        if !self.is_current(ticket) {
            log::debug!("Dropping stale render #{}", ticket.sequence());
            return false;
        }
        *slot = Some(Displayed {
            ticket,
            html: rendered.html,
            hydrated: false,
        });
        true
    }

    /// Hydrate the displayed render once. Returns `false` if `ticket` is not
    /// on display or it was already hydrated.
    pub fn hydrate(&self, ticket: RenderTicket, options: &HydrateOptions) -> bool {
        let mut slot = self.displayed_slot();
        match slot.as_mut() {
            Some(displayed)
                if displayed.ticket == ticket && !displayed.hydrated && self.is_current(ticket) =>
            {
                displayed.html = hydrate(&displayed.html, options);
                displayed.hydrated = true;
                true
            }
            _ => false,
        }
    }

    /// HTML currently on display.
    pub fn displayed(&self) -> Option<String> {
        self.displayed_slot().as_ref().map(|d| d.html.clone())
    }

    /// Render `input` under a fresh ticket and display it if still current.
    pub fn render(
        &self,
        input: &str,
        options: &RenderOptions,
    ) -> Result<(RenderTicket, bool), MdviewError> {
        let ticket = self.begin();
        let rendered = render_markdown(input, options)?;
        Ok((ticket, self.finish(ticket, rendered)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(html: &str) -> Rendered {
        Rendered {
            html: html.to_string(),
            ..Rendered::default()
        }
    }

    #[test]
    fn last_started_render_wins() {
        let session = RenderSession::new();
        let first = session.begin();
        let second = session.begin();
        assert!(first < second);
        assert_eq!(second.sequence(), first.sequence() + 1);
        assert!(session.finish(second, rendered("<p>second</p>")));
        assert!(!session.finish(first, rendered("<p>first</p>")));
        assert_eq!(session.displayed().as_deref(), Some("<p>second</p>"));
    }

    #[test]
    fn stale_render_is_dropped_even_if_it_finishes_first() {
        let session = RenderSession::new();
        let first = session.begin();
        let _second = session.begin();
        assert!(!session.finish(first, rendered("<p>first</p>")));
        assert_eq!(session.displayed(), None);
    }

    #[test]
    fn hydrates_displayed_render_once() {
        let session = RenderSession::new();
        let (ticket, shown) = session
            .render("```js\nrun()\n```\n", &RenderOptions::default())
            .unwrap();
        assert!(shown);
        let options = HydrateOptions::default();
        assert!(session.hydrate(ticket, &options));
        assert!(!session.hydrate(ticket, &options));
        let html = session.displayed().unwrap();
        assert_eq!(html.matches("code-block-hydrated").count(), 1);

        let newer = session.begin();
        assert!(!session.hydrate(ticket, &options));
        assert!(!session.hydrate(newer, &options));
    }
}
