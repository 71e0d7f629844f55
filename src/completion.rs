use tracing::{debug, trace, warn};

use crate::prelude::*;

impl Automaton {
    /// Iterates over all pairs of a state and a symbol for which no transition is defined,
    /// ordered by state and then by symbol.
    pub fn missing_transitions(&self) -> impl Iterator<Item = (&State, &Symbol)> + '_ {
        self.states().iter().flat_map(move |q| {
            self.alphabet()
                .iter()
                .filter(move |a| self.lookup(q, a).is_none())
                .map(move |a| (q, a))
        })
    }

    /// Returns true if every state has a transition on every symbol.
    pub fn is_complete(&self) -> bool {
        self.missing_transitions().next().is_none()
    }

    /// Makes `self` complete. If a transition is undefined anywhere, the non-accepting
    /// `sink` is added and every undefined transition, including those of the sink
    /// itself, is pointed at it. An automaton that is already complete is returned
    /// unchanged, so the result does not necessarily contain `sink`.
    ///
    /// Should `sink` already be a state, it is reused and a warning is logged. After the
    /// subset construction every state is named `{...}`, so inside [`crate::pipeline::run`]
    /// this only happens for a sink name of that shape; a grammar nonterminal named like
    /// the sink is reported by [`Automaton::from_grammar`] instead.
    ///
    /// # Example
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let mut dfa = Automaton::deterministic("S");
    /// dfa.add_dfa_transition("S", "a", "S");
    /// dfa.add_symbol("b");
    ///
    /// let sink = State::new("POCO");
    /// let complete = dfa.complete(&sink);
    /// assert!(complete.is_complete());
    /// assert_eq!(complete.lookup(&sink, &Symbol::new("a")), Some(&Destination::Deterministic(sink.clone())));
    /// assert_eq!(complete.complete(&sink), complete);
    /// ```
    pub fn complete(&self, sink: &State) -> Automaton {
        if self.is_complete() {
            trace!("automaton is already complete, no sink needed");
            return self.clone();
        }
        if self.states().contains(sink) {
            warn!("reserved sink name {sink} is already a state, undefined transitions are redirected to it");
        }

        let mut complete = self.clone();
        complete.add_state(sink);
        let missing: Vec<(State, Symbol)> = complete
            .missing_transitions()
            .map(|(q, a)| (q.clone(), a.clone()))
            .collect();
        debug!("completing {} undefined transitions with sink {sink}", missing.len());
        for (q, a) in missing {
            complete.add_dfa_transition(q, a, sink);
        }
        complete
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        pipeline::ReservedNames,
        prelude::*,
        tests::{assert_same_language, example_grammar},
    };

    fn sink() -> State {
        ReservedNames::default().sink_state
    }

    #[test_log::test]
    fn completion_is_total_and_idempotent() {
        let dfa = Automaton::from_grammar(&example_grammar(), &ReservedNames::default())
            .determinize()
            .prune_unreachable();
        assert!(!dfa.is_complete());

        let complete = dfa.complete(&sink());
        assert!(complete.is_complete());
        assert_eq!(complete.size(), dfa.size() + 1);
        assert_eq!(
            complete.transition_count(),
            complete.size() * complete.alphabet().len()
        );
        assert!(!complete.is_final(&sink()));
        assert_eq!(complete.complete(&sink()), complete);
        assert_same_language(&dfa, &complete, 5);
    }

    #[test_log::test]
    fn sink_loops_on_every_symbol() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "A");
        dfa.add_symbol("b");
        dfa.add_symbol("c");

        let complete = dfa.complete(&sink());
        let loops = complete
            .edges_from(&sink())
            .filter(|(_, d)| d.single() == Some(&sink()))
            .count();
        assert_eq!(loops, 3);
        // existing transitions are left alone
        assert_eq!(
            complete.lookup(&State::new("S"), &Symbol::new("a")),
            Some(&Destination::Deterministic(State::new("A")))
        );
    }

    #[test_log::test]
    fn complete_automaton_gets_no_sink() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "S");
        let complete = dfa.complete(&sink());
        assert_eq!(complete, dfa);
        assert!(!complete.states().contains(&sink()));
    }

    #[test_log::test]
    fn existing_state_is_reused_as_sink() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "POCO");
        dfa.add_symbol("b");

        let complete = dfa.complete(&sink());
        assert_eq!(complete.size(), 2);
        assert!(complete.is_complete());
        assert_eq!(
            complete.lookup(&sink(), &Symbol::new("b")),
            Some(&Destination::Deterministic(sink()))
        );
    }

    #[test_log::test]
    fn lists_missing_transitions() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "A");
        dfa.add_symbol("b");
        let missing: Vec<_> = dfa
            .missing_transitions()
            .map(|(q, a)| format!("{q}/{a}"))
            .collect();
        assert_eq!(missing, ["A/a", "A/b", "S/b"]);
    }
}
