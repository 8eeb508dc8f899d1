//! Confirmation relay for pending transactions

/// Listener invoked with each confirmation payload
pub type ConfirmationListener<C> = Box<dyn FnMut(&C) + Send + 'static>;

/// Something that reports confirmations as a transaction gets buried
pub trait EmitsConfirmations {
    /// Payload carried by each confirmation notification
    type Confirmation;

    /// Register a listener called for every confirmation
    fn on_confirmation(&mut self, listener: ConfirmationListener<Self::Confirmation>);
}

/// Attach `callback` (if any) to the emitter's confirmations and hand the
/// emitter back, so the caller can keep going (e.g. await the receipt).
///
/// Without a callback the emitter is returned untouched.
pub fn relay_confirmations<E>(
    mut emitter: E,
    callback: Option<ConfirmationListener<E::Confirmation>>,
) -> E
where
    E: EmitsConfirmations,
{
    if let Some(callback) = callback {
        emitter.on_confirmation(callback);
    }
    emitter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEmitter;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callback_receives_payload_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut emitter = relay_confirmations(
            MockEmitter::<u64>::new(),
            Some(Box::new(move |p: &u64| sink.lock().unwrap().push(*p))),
        );
        assert_eq!(emitter.listener_count(), 1);

        emitter.emit(&42);
        assert_eq!(*seen.lock().unwrap(), vec![42]);
    }

    #[test]
    fn test_no_callback_is_pass_through() {
        let emitter = relay_confirmations(MockEmitter::<u64>::new(), None);
        assert_eq!(emitter.listener_count(), 0);
    }
}
