use std::sync::{Arc, Mutex};

use super::error::XrError;

pub type XrResult<T> = Result<T, XrError>;

enum Slot<T> {
    Pending,
    Resolved(XrResult<T>),
    Taken,
}

/// One-shot slot for an asynchronous device request.
///
/// The issuing side keeps one clone and polls it once per frame; a host
/// callback (or bridge message) resolves another clone. The first resolution
/// wins and is handed out exactly once.
pub struct XrRequest<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> XrRequest<T> {
    pub fn pending() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Pending)),
        }
    }

    /// Request that is already settled, for backends that answer synchronously.
    pub fn resolved(result: XrResult<T>) -> Self {
        let request = Self::pending();
        request.resolve(result);
        request
    }

    /// Settle the request. Returns `false` if it was already settled.
    pub fn resolve(&self, result: XrResult<T>) -> bool {
        let Ok(mut slot) = self.slot.lock() else {
            return false;
        };
        if !matches!(*slot, Slot::Pending) {
            return false;
        }
        *slot = Slot::Resolved(result);
        true
    }

    /// Take the result if it has arrived. A poisoned lock reads as pending.
    pub fn poll(&self) -> Option<XrResult<T>> {
        let Ok(mut slot) = self.slot.lock() else {
            return None;
        };
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Resolved(result) => Some(result),
            other => {
                *slot = other;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| matches!(*slot, Slot::Pending))
            .unwrap_or(true)
    }
}

impl<T> Clone for XrRequest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_request_polls_nothing() {
        let request: XrRequest<u32> = XrRequest::pending();
        assert!(request.is_pending());
        assert!(request.poll().is_none());
    }

    #[test]
    fn result_is_delivered_once() {
        let request = XrRequest::pending();
        let resolver = request.clone();
        assert!(resolver.resolve(Ok(7)));

        assert_eq!(request.poll(), Some(Ok(7)));
        assert_eq!(request.poll(), None);
        assert!(!request.is_pending());
    }

    #[test]
    fn first_resolution_wins() {
        let request = XrRequest::pending();
        assert!(request.resolve(Err(XrError::rejected("hit-test source", "denied"))));
        assert!(!request.resolve(Ok(1)));

        assert_eq!(
            request.poll(),
            Some(Err(XrError::rejected("hit-test source", "denied")))
        );
        // Settling after the result was taken is still refused.
        assert!(!request.resolve(Ok(2)));
        assert_eq!(request.poll(), None);
    }
}
