use std::collections::VecDeque;

use tracing::debug;

use crate::{
    math::{OrderedSet, Set},
    prelude::*,
};

/// Iterates over the states of an [`Automaton`] that are reachable from some origin in
/// breadth-first order. The origin itself is yielded first, and every target of a
/// nondeterministic destination counts as reachable.
#[derive(Debug, Clone)]
pub struct ReachableStates<'a> {
    aut: &'a Automaton,
    seen: Set<&'a State>,
    queue: VecDeque<&'a State>,
}

impl<'a> ReachableStates<'a> {
    /// Starts a breadth-first traversal of `aut` in `origin`.
    pub fn new(aut: &'a Automaton, origin: &'a State) -> Self {
        Self {
            aut,
            seen: Set::from_iter([origin]),
            queue: VecDeque::from([origin]),
        }
    }
}

impl<'a> Iterator for ReachableStates<'a> {
    type Item = &'a State;

    fn next(&mut self) -> Option<Self::Item> {
        let q = self.queue.pop_front()?;
        for (_, destination) in self.aut.edges_from(q) {
            for p in destination.targets() {
                if self.seen.insert(p) {
                    self.queue.push_back(p);
                }
            }
        }
        Some(q)
    }
}

impl Automaton {
    /// Returns an iterator over the states reachable from the initial state.
    pub fn reachable_states(&self) -> ReachableStates<'_> {
        ReachableStates::new(self, self.initial())
    }

    /// Returns a copy of `self` restricted to the states reachable from the initial state.
    /// Accepting states are restricted accordingly. A transition survives if its source is
    /// reachable and at least one of its targets is; targets that are not reachable are
    /// dropped from nondeterministic destinations. The alphabet is kept as is.
    ///
    /// # Example
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let mut dfa = Automaton::deterministic("S");
    /// dfa.add_dfa_transition("S", "a", "A");
    /// dfa.add_dfa_transition("U", "a", "A");
    /// dfa.add_final("U");
    ///
    /// let pruned = dfa.prune_unreachable();
    /// assert_eq!(pruned.size(), 2);
    /// assert!(pruned.finals().is_empty());
    /// ```
    pub fn prune_unreachable(&self) -> Automaton {
        let reachable: OrderedSet<&State> = self.reachable_states().collect();

        let mut pruned = Automaton::new(self.kind(), self.initial().clone());
        pruned.set_alphabet(self.alphabet().clone());
        for q in &reachable {
            pruned.add_state(*q);
            if self.is_final(q) {
                pruned.add_final(*q);
            }
        }

        for (from, symbol, destination) in self.transitions() {
            if !reachable.contains(from) {
                continue;
            }
            let restricted = match destination {
                Destination::Deterministic(q) => {
                    reachable.contains(q).then(|| destination.clone())
                }
                Destination::Nondeterministic(targets) => {
                    let kept: OrderedSet<State> = targets
                        .iter()
                        .filter(|q| reachable.contains(q))
                        .cloned()
                        .collect();
                    (!kept.is_empty()).then_some(Destination::Nondeterministic(kept))
                }
            };
            if let Some(restricted) = restricted {
                pruned.insert_destination(from.clone(), symbol.clone(), restricted);
            }
        }

        debug!(
            "pruning kept {} of {} states",
            pruned.size(),
            self.size()
        );
        pruned
    }
}
