//! Change notification fan-out.
//!
//! Each subscriber gets its own mpsc receiver. `emit` enqueues on every live
//! subscriber before returning; subscribers whose receiver was dropped are
//! pruned on the next emit.

use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug)]
pub struct Notifier<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E: Clone> Notifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: E) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
