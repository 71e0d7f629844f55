use tracing::{debug, trace};

use crate::{math::OrderedSet, prelude::*};

impl Automaton {
    /// Returns true if `state` is a sink, i.e. it is neither initial nor accepting and
    /// its transition on every symbol of the alphabet is a deterministic loop back to
    /// itself. A set of targets never counts, not even one that only holds `state`.
    pub fn is_sink(&self, state: &State) -> bool {
        state != self.initial()
            && !self.is_final(state)
            && self.alphabet().iter().all(|a| {
                matches!(self.lookup(state, a), Some(Destination::Deterministic(q)) if q == state)
            })
    }

    /// Returns the first sink state in ascending order, if there is one.
    pub fn find_sink(&self) -> Option<&State> {
        self.states().iter().find(|q| self.is_sink(q))
    }

    /// Removes the sink state (see [`Automaton::find_sink`]) together with every
    /// transition leading into it, which then becomes undefined. Without a sink, `self`
    /// is returned unchanged. At most one state is removed.
    ///
    /// # Example
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let mut dfa = Automaton::deterministic("S");
    /// dfa.add_dfa_transition("S", "a", "F");
    /// dfa.add_dfa_transition("S", "b", "X");
    /// dfa.add_dfa_transition("F", "a", "X");
    /// dfa.add_dfa_transition("F", "b", "X");
    /// dfa.add_dfa_transition("X", "a", "X");
    /// dfa.add_dfa_transition("X", "b", "X");
    /// dfa.add_final("F");
    ///
    /// let compact = dfa.remove_sink();
    /// assert_eq!(compact.size(), 2);
    /// assert!(compact.lookup(&State::new("S"), &Symbol::new("b")).is_none());
    /// ```
    pub fn remove_sink(&self) -> Automaton {
        let Some(sink) = self.find_sink() else {
            trace!("no sink state found");
            return self.clone();
        };
        debug!("removing sink state {sink}");

        let mut compact = Automaton::new(self.kind(), self.initial().clone());
        compact.set_alphabet(self.alphabet().clone());
        for q in self.states().iter().filter(|q| *q != sink) {
            compact.add_state(q);
            if self.is_final(q) {
                compact.add_final(q);
            }
        }

        for (from, symbol, destination) in self.transitions() {
            if from == sink {
                continue;
            }
            let kept = match destination {
                Destination::Deterministic(q) => (q != sink).then(|| destination.clone()),
                Destination::Nondeterministic(targets) => {
                    let targets: OrderedSet<State> =
                        targets.iter().filter(|q| *q != sink).cloned().collect();
                    (!targets.is_empty()).then_some(Destination::Nondeterministic(targets))
                }
            };
            if let Some(kept) = kept {
                compact.insert_destination(from.clone(), symbol.clone(), kept);
            }
        }
        compact
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        pipeline::ReservedNames,
        prelude::*,
        tests::{assert_same_language, example_grammar, words_up_to},
    };

    fn st(name: &str) -> State {
        State::new(name)
    }

    #[test_log::test]
    fn sink_disappears_after_minimization() {
        let names = ReservedNames::default();
        let complete = Automaton::from_grammar(&example_grammar(), &names)
            .determinize()
            .prune_unreachable()
            .complete(&names.sink_state);
        assert_eq!(complete.find_sink(), Some(&names.sink_state));

        let min = complete.minimize();
        let sink = min.find_sink().cloned().expect("minimal automaton has a sink");
        let compact = min.remove_sink();

        assert_eq!(compact.size(), min.size() - 1);
        assert!(!compact.states().contains(&sink));
        assert!(compact.transitions().all(|(_, _, d)| !d.contains(&sink)));
        assert!(compact.find_sink().is_none());
        assert_same_language(&min, &compact, 6);
    }

    #[test_log::test]
    fn never_removes_initial_or_accepting_states() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "S");
        dfa.add_dfa_transition("F", "a", "F");
        dfa.add_final("F");

        assert!(dfa.find_sink().is_none());
        assert_eq!(dfa.remove_sink(), dfa);
    }

    #[test_log::test]
    fn removal_keeps_language_of_words_avoiding_the_sink() {
        let mut dfa = Automaton::deterministic("S");
        for (from, symbol, to) in [
            ("S", "a", "A"),
            ("S", "b", "X"),
            ("A", "a", "X"),
            ("A", "b", "S"),
            ("X", "a", "X"),
            ("X", "b", "X"),
        ] {
            dfa.add_dfa_transition(from, symbol, to);
        }
        dfa.add_final("A");

        let compact = dfa.remove_sink();
        assert!(compact.states().contains(&st("S")));
        assert!(compact.states().contains(&st("A")));
        for word in words_up_to(dfa.alphabet(), 6) {
            assert_eq!(dfa.accepts(&word), compact.accepts(&word), "{word:?}");
        }
    }

    #[test_log::test]
    fn only_the_first_sink_is_removed() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "X");
        dfa.add_dfa_transition("S", "b", "Y");
        dfa.add_dfa_transition("X", "a", "X");
        dfa.add_dfa_transition("X", "b", "X");
        dfa.add_dfa_transition("Y", "a", "Y");
        dfa.add_dfa_transition("Y", "b", "Y");

        let compact = dfa.remove_sink();
        assert!(!compact.states().contains(&st("X")));
        assert!(compact.states().contains(&st("Y")));
        assert_eq!(compact.find_sink(), Some(&st("Y")));
    }

    #[test_log::test]
    fn nondeterministic_self_loop_is_no_sink() {
        let mut nfa = Automaton::nondeterministic("S");
        nfa.add_nfa_transition("S", "a", "X");
        nfa.add_nfa_transition("X", "a", "X");
        assert_eq!(
            nfa.lookup(&st("X"), &Symbol::new("a")),
            Some(&Destination::Nondeterministic([st("X")].into()))
        );
        assert!(!nfa.is_sink(&st("X")));
        assert_eq!(nfa.remove_sink(), nfa);
    }

    #[test_log::test]
    fn state_with_an_undefined_transition_is_no_sink() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "X");
        dfa.add_dfa_transition("X", "a", "X");
        dfa.add_symbol("b");
        assert!(!dfa.is_sink(&st("X")));
        assert_eq!(dfa.remove_sink(), dfa);
    }
}
