//! Stale-response guard.
//!
//! Reads are not cancellable, so when the selection changes while a fetch
//! is in flight the older response must be dropped instead of applied.
//! Each request gets a ticket; only the ticket for the current selection
//! is accepted.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<P> {
    seq: u64,
    params: P,
}

impl<P> FetchTicket<P> {
    pub fn params(&self) -> &P {
        &self.params
    }
}

#[derive(Debug)]
pub struct FetchGuard<P> {
    latest: u64,
    current: Option<P>,
}

impl<P: Clone + PartialEq> Default for FetchGuard<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + PartialEq> FetchGuard<P> {
    pub fn new() -> Self {
        Self {
            latest: 0,
            current: None,
        }
    }

    /// Record a new selection and hand out the ticket for its fetch.
    pub fn issue(&mut self, params: P) -> FetchTicket<P> {
        self.latest += 1;
        self.current = Some(params.clone());
        FetchTicket {
            seq: self.latest,
            params,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket<P>) -> bool {
        ticket.seq == self.latest && self.current.as_ref() == Some(&ticket.params)
    }

    /// Pass the response through only if its ticket is still current.
    pub fn accept<T>(&self, ticket: &FetchTicket<P>, response: T) -> Option<T> {
        self.is_current(ticket).then_some(response)
    }
}
