//! Monotonic request tokens for last-request-wins ordering.
//!
//! Responses can resolve out of order. Each request is stamped with a token
//! when it starts; before its response is applied the holder checks that no
//! newer request has been issued since. There is no network cancellation:
//! superseded responses are simply dropped.

/// Opaque stamp identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Issues strictly increasing tokens and remembers the latest one.
#[derive(Debug, Default, Clone)]
pub struct RequestTokens {
    latest: u64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token, superseding every token issued before it.
    pub fn issue(&mut self) -> RequestToken {
        self.latest = self.latest.wrapping_add(1);
        RequestToken(self.latest)
    }

    /// Supersede outstanding requests without starting a new one.
    pub fn invalidate(&mut self) {
        self.issue();
    }

    /// Whether `token` is the most recently issued one.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_token_is_current() {
        let mut tokens = RequestTokens::new();
        let first = tokens.issue();
        let second = tokens.issue();

        assert!(first < second);
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));
    }

    #[test]
    fn invalidate_supersedes_outstanding_tokens() {
        let mut tokens = RequestTokens::new();
        let pending = tokens.issue();
        tokens.invalidate();
        assert!(!tokens.is_current(pending));
    }
}
