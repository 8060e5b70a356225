//! Signal dispatcher
//!
//! Four named events, each with at most one handler slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Events raised by the input editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signal {
    /// The input line was submitted
    Activate,
    /// Completion was requested
    Complete,
    /// Previous history entry was requested
    HistoryPrev,
    /// Next history entry was requested
    HistoryNext,
}

impl Signal {
    pub const ALL: [Signal; 4] = [
        Signal::Activate,
        Signal::Complete,
        Signal::HistoryPrev,
        Signal::HistoryNext,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Signal::Activate => "activate",
            Signal::Complete => "complete",
            Signal::HistoryPrev => "history-prev",
            Signal::HistoryNext => "history-next",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.name() == name)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One optional handler per [`Signal`]
pub struct SignalDispatcher<H> {
    slots: [Option<H>; 4],
}

impl<H> SignalDispatcher<H> {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }

    /// Install `handler`, returning the one it replaces
    pub fn connect(&mut self, signal: Signal, handler: H) -> Option<H> {
        self.slots[signal.slot()].replace(handler)
    }

    pub fn disconnect(&mut self, signal: Signal) -> Option<H> {
        self.slots[signal.slot()].take()
    }

    pub fn is_connected(&self, signal: Signal) -> bool {
        self.slots[signal.slot()].is_some()
    }

    /// Remove the handler for the duration of a call
    pub fn take(&mut self, signal: Signal) -> Option<H> {
        self.slots[signal.slot()].take()
    }

    /// Put back a handler removed with [`take`](Self::take).
    ///
    /// If a new handler was connected in the meantime, that one wins and
    /// `handler` is dropped.
    pub fn restore(&mut self, signal: Signal, handler: H) {
        let slot = &mut self.slots[signal.slot()];
        if slot.is_none() {
            *slot = Some(handler);
        }
    }
}

impl<H> Default for SignalDispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for SignalDispatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connected: Vec<&str> = Signal::ALL
            .iter()
            .filter(|signal| self.is_connected(**signal))
            .map(|signal| signal.name())
            .collect();
        f.debug_struct("SignalDispatcher")
            .field("connected", &connected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        for signal in Signal::ALL {
            assert_eq!(Signal::from_name(signal.name()), Some(signal));
        }
        assert_eq!(Signal::from_name("escape"), None);
        assert_eq!(Signal::HistoryPrev.to_string(), "history-prev");
    }

    #[test]
    fn test_connect_replaces() {
        let mut dispatcher = SignalDispatcher::new();
        assert_eq!(dispatcher.connect(Signal::Activate, 1), None);
        assert_eq!(dispatcher.connect(Signal::Activate, 2), Some(1));
        assert!(dispatcher.is_connected(Signal::Activate));
        assert!(!dispatcher.is_connected(Signal::Complete));
    }

    #[test]
    fn test_take_and_restore() {
        let mut dispatcher = SignalDispatcher::new();
        dispatcher.connect(Signal::Complete, "old");

        let handler = dispatcher.take(Signal::Complete).unwrap();
        assert!(!dispatcher.is_connected(Signal::Complete));
        dispatcher.restore(Signal::Complete, handler);
        assert_eq!(dispatcher.take(Signal::Complete), Some("old"));
    }

    #[test]
    fn test_restore_keeps_replacement() {
        let mut dispatcher = SignalDispatcher::new();
        dispatcher.connect(Signal::HistoryNext, "old");

        let handler = dispatcher.take(Signal::HistoryNext).unwrap();
        dispatcher.connect(Signal::HistoryNext, "new");
        dispatcher.restore(Signal::HistoryNext, handler);
        assert_eq!(dispatcher.take(Signal::HistoryNext), Some("new"));
    }

    #[test]
    fn test_debug_lists_connected() {
        let mut dispatcher = SignalDispatcher::new();
        dispatcher.connect(Signal::HistoryPrev, ());
        assert_eq!(
            format!("{:?}", dispatcher),
            "SignalDispatcher { connected: [\"history-prev\"] }"
        );
    }
}
