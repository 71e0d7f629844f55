use tracing::{debug, warn};

use crate::{pipeline::ReservedNames, prelude::*};

impl Automaton {
    /// Builds the nondeterministic automaton of a regular grammar. Every nonterminal
    /// becomes a state and the start symbol becomes the initial state. Then, for each
    /// alternative of a nonterminal `N`
    /// - `ε` makes `N` accepting,
    /// - `a<M>` adds a transition from `N` on `a` to `M`,
    /// - a bare terminal `a` adds a transition from `N` on `a` to the reserved
    ///   [`ReservedNames::final_state`], which is accepting. That state only exists if at
    ///   least one such alternative exists.
    ///
    /// Targets that have no rule of their own still become states, they just have no
    /// outgoing transitions.
    ///
    /// A nonterminal named like the reserved final state is merged with it: it becomes
    /// accepting if some bare terminal exists and keeps its own transitions. A nonterminal
    /// named like the sink state is kept as well. Both are reported with a warning.
    ///
    /// # Example
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let grammar = Grammar::parse("<S> ::= a<S> | b").unwrap();
    /// let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());
    /// assert_eq!(nfa.size(), 2);
    /// assert!(nfa.accepts(["a", "a", "b"]));
    /// ```
    pub fn from_grammar(grammar: &Grammar, names: &ReservedNames) -> Automaton {
        let mut nfa = Automaton::nondeterministic(grammar.start());
        for nonterminal in grammar.nonterminals() {
            nfa.add_state(nonterminal);
        }

        let final_state = &names.final_state;
        let mut uses_final_state = false;
        let mut mentions_final_state = grammar.start() == final_state.as_str();

        for (nonterminal, production) in grammar.productions(&names.epsilon) {
            mentions_final_state |= nonterminal == final_state.as_str();
            match production {
                Production::Epsilon => nfa.add_final(nonterminal),
                Production::Step { terminal, target } => {
                    mentions_final_state |= target == final_state.as_str();
                    nfa.add_nfa_transition(nonterminal, terminal, target);
                }
                Production::Terminal(terminal) => {
                    uses_final_state = true;
                    nfa.add_nfa_transition(nonterminal, terminal, final_state.clone());
                }
            }
        }

        if nfa.states().contains(&names.sink_state) {
            warn!(
                "grammar uses the reserved sink name {}, it is only told apart from the sink by the subset construction",
                names.sink_state
            );
        }

        if uses_final_state {
            if mentions_final_state {
                warn!("grammar uses the reserved state name {final_state}, it is merged with the accepting state of bare terminals");
            }
            nfa.add_final(final_state.clone());
        }

        debug!(
            "built NFA with {} states and {} transitions from grammar",
            nfa.size(),
            nfa.transition_count()
        );
        nfa
    }
}

#[cfg(test)]
mod tests {
    use crate::{pipeline::ReservedNames, prelude::*, tests::example_grammar};

    fn st(name: &str) -> State {
        State::new(name)
    }

    #[test_log::test]
    fn example_grammar_to_nfa() {
        let nfa = Automaton::from_grammar(&example_grammar(), &ReservedNames::default());

        assert_eq!(nfa.kind(), Kind::Nondeterministic);
        assert_eq!(nfa.initial(), &st("S"));
        assert_eq!(
            nfa.states().iter().map(State::as_str).collect::<Vec<_>>(),
            ["A", "B", "FINAL", "S"]
        );
        assert_eq!(
            nfa.finals().iter().map(State::as_str).collect::<Vec<_>>(),
            ["B", "FINAL"]
        );
        let on_a = nfa.lookup(&st("A"), &Symbol::new("a")).unwrap();
        assert_eq!(on_a.to_string(), "A,FINAL");
        assert!(!nfa.is_deterministic());
    }

    #[test_log::test]
    fn final_state_only_added_when_needed() {
        let grammar = Grammar::parse("<S> ::= a<S> | ε").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());
        assert_eq!(nfa.size(), 1);
        assert!(nfa.is_final(&st("S")));
        assert!(!nfa.states().contains(&st("FINAL")));
    }

    #[test_log::test]
    fn unknown_targets_become_plain_states() {
        let grammar = Grammar::parse("<S> ::= a<X>").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());
        assert!(nfa.states().contains(&st("X")));
        assert_eq!(nfa.edges_from(&st("X")).count(), 0);
        assert!(nfa.finals().is_empty());
    }

    #[test_log::test]
    fn start_symbol_without_rule_is_initial() {
        let grammar = Grammar::new("Z", [("S", vec!["a"])]);
        let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());
        assert_eq!(nfa.initial(), &st("Z"));
        assert!(!nfa.accepts(["a"]));
    }

    #[test_log::test]
    fn multi_character_terminals_are_single_symbols() {
        let grammar = Grammar::parse("<S> ::= if<T>\n<T> ::= then").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());
        assert_eq!(
            nfa.alphabet().iter().map(Symbol::as_str).collect::<Vec<_>>(),
            ["if", "then"]
        );
        assert!(nfa.accepts(["if", "then"]));
    }

    #[test_log::test]
    fn nonterminal_named_final_is_merged() {
        let grammar = Grammar::parse("<S> ::= a<FINAL> | b\n<FINAL> ::= c<S>").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());

        assert_eq!(
            nfa.finals().iter().map(State::as_str).collect::<Vec<_>>(),
            ["FINAL"]
        );
        assert_eq!(
            nfa.lookup(&st("FINAL"), &Symbol::new("c")),
            Some(&Destination::Nondeterministic([st("S")].into()))
        );
        assert_eq!(
            nfa.lookup(&st("S"), &Symbol::new("a")).map(|d| d.to_string()),
            Some("FINAL".to_string())
        );
        assert!(nfa.accepts(["a"]));
        assert!(nfa.accepts(["b", "c", "b"]));
        assert!(!nfa.accepts(["c"]));
    }

    #[test_log::test]
    fn nonterminal_named_final_without_bare_terminals_is_not_accepting() {
        let grammar = Grammar::parse("<S> ::= a<FINAL>\n<FINAL> ::= c<S>").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &ReservedNames::default());

        assert!(nfa.states().contains(&st("FINAL")));
        assert!(!nfa.is_final(&st("FINAL")));
        assert!(nfa.finals().is_empty());
        assert!(!nfa.accepts(["a"]));
    }

    #[test_log::test]
    fn nonterminal_named_like_the_sink_is_kept() {
        let names = ReservedNames::default();
        let grammar = Grammar::parse("<S> ::= a<POCO>\n<POCO> ::= b").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &names);
        assert!(nfa.states().contains(&names.sink_state));
        assert!(!nfa.is_final(&names.sink_state));
        assert!(nfa.accepts(["a", "b"]));
    }

    #[test_log::test]
    fn reserved_names_are_configurable() {
        let names = ReservedNames {
            final_state: st("END"),
            epsilon: "eps".into(),
            ..Default::default()
        };
        let grammar = Grammar::parse("<S> ::= a | eps").unwrap();
        let nfa = Automaton::from_grammar(&grammar, &names);
        assert!(nfa.is_final(&st("END")));
        assert!(nfa.is_final(&st("S")));
        assert!(nfa.accepts(Vec::<&str>::new()));
    }
}
