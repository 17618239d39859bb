use dioxus::prelude::*;

/// Identifies one request among several racing to update the same view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Counts requests so a response can tell whether a newer one was issued
/// after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestGeneration {
    current: u64,
}

impl RequestGeneration {
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current == ticket.0
    }
}

/// A [`RequestGeneration`] shared by a component's tasks.
#[derive(Clone, Copy, PartialEq)]
pub struct LatestRequest(Signal<RequestGeneration>);

pub fn use_latest_request() -> LatestRequest {
    LatestRequest(use_signal(RequestGeneration::default))
}

impl LatestRequest {
    pub fn issue(&mut self) -> Ticket {
        self.0.write().issue()
    }

    /// False once a newer request has been issued; its response wins.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.peek().is_current(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older() {
        let mut generation = RequestGeneration::default();
        let first = generation.issue();
        assert!(generation.is_current(first));

        let second = generation.issue();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
