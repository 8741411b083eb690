//! Dispatch Queue
//!
//! Every command the runtime decides to run, and every lifecycle hook fired by a
//! move, becomes one [`Dispatch`] pushed onto a single FIFO queue. Nothing runs
//! at push time; the host drains the queue afterwards, one unit at a time, in
//! exactly the order the units were pushed. Units pushed while the queue is
//! draining go to the back and run in the same drain.

use std::collections::VecDeque;

use log::debug;
use svnm_data::{Command, StateId};

/// One unit of work: a built-in and/or host handler call.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub name: String,
    pub args: Vec<Command>,
    /// State that was current when the unit was queued.
    pub state: Option<StateId>,
}

impl Dispatch {
    pub fn new(name: impl Into<String>, args: Vec<Command>, state: Option<StateId>) -> Self {
        Self {
            name: name.into(),
            args,
            state,
        }
    }
}

/// Single-consumer FIFO of pending dispatches.
#[derive(Debug, Clone, Default)]
pub struct DispatchQueue {
    pending: VecDeque<Dispatch>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dispatch: Dispatch) {
        debug!(
            "queueing '{}' ({} arg(s)) from state {:?}; {} already pending",
            dispatch.name,
            dispatch.args.len(),
            dispatch.state,
            self.pending.len()
        );
        self.pending.push_back(dispatch);
    }

    /// Take the oldest pending dispatch.
    pub fn pop(&mut self) -> Option<Dispatch> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending dispatches, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Dispatch> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_push_order() {
        let mut queue = DispatchQueue::new();
        queue.push(Dispatch::new("a", vec![], None));
        queue.push(Dispatch::new("b", vec![Command::numeric(1.0)], Some("S".into())));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|d| d.name), Some("a".to_string()));

        queue.push(Dispatch::new("c", vec![], None));
        let names: Vec<_> = queue.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);

        assert_eq!(queue.pop().unwrap().state.as_deref(), Some("S"));
        assert_eq!(queue.pop().unwrap().name, "c");
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }
}
