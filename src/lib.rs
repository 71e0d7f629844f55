//! Library for turning regular grammars into minimal deterministic finite automata.
//!
//! A regular grammar in BNF-like notation (`<S> ::= a<A> | b`) is read into a [`Grammar`], which is
//! then turned into a nondeterministic [`Automaton`] where every nonterminal is a state. From there,
//! the automaton goes through a fixed sequence of stages, each of which takes a reference to an
//! automaton and produces a new one:
//! 1. [`Automaton::determinize`] applies the subset construction, naming every reachable subset
//!    canonically as `{A,B}`.
//! 2. [`Automaton::prune_unreachable`] drops every state that cannot be reached from the initial state.
//! 3. [`Automaton::complete`] adds a sink state if (and only if) some transition is undefined.
//! 4. [`Automaton::minimize`] merges equivalent states through partition refinement.
//! 5. [`Automaton::remove_sink`] strips the sink again so that the result is compact.
//!
//! The [`pipeline`] module chains these together and writes the result through the writers in [`output`].
//!
//! [`Automaton`] itself stores transitions in a map keyed by `(state, symbol)`. Each destination is
//! either a single state or a set of states (see [`Destination`]), and an automaton is tagged with the
//! [`Kind`] it is supposed to be.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use regdfa::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::{Automaton, Destination, Kind, State, Symbol},
        determinization::StateSet,
        error::{Error, Result},
        grammar::{Grammar, Production},
        math,
        math::{OrderedSet, Partition},
        output::OutputFormat,
        pipeline::{Options, ReservedNames, Stages},
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Defines the automaton data structure together with states, symbols and destinations.
pub mod automaton;
pub use automaton::{Automaton, Destination, Kind, State, Symbol};

/// Errors that may occur at the boundary of the crate, i.e. while reading grammars or writing results.
pub mod error;
pub use error::{Error, Result};

/// Reading regular grammars and classifying their productions.
pub mod grammar;
pub use grammar::{Grammar, Production};

/// Turns a [`Grammar`] into a nondeterministic [`Automaton`].
pub mod conversion;

/// Contains the subset construction.
pub mod determinization;

/// Breadth-first reachability and the removal of unreachable states.
pub mod reachability;

/// Making a deterministic automaton complete by adding a sink state.
pub mod completion;

/// Minimization through partition refinement.
pub mod minimization;

/// Detection and removal of the sink state of a minimized automaton.
pub mod sink;

/// Writers for the CSV representations of an automaton.
pub mod output;

/// Chains all stages from a grammar to a minimal automaton.
pub mod pipeline;

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Enumerates every word over `alphabet` with at most `max_len` symbols.
    pub fn words_up_to(alphabet: &OrderedSet<Symbol>, max_len: usize) -> Vec<Vec<String>> {
        let mut words = vec![vec![]];
        let mut frontier: Vec<Vec<String>> = vec![vec![]];
        for _ in 0..max_len {
            frontier = frontier
                .into_iter()
                .flat_map(|w| {
                    alphabet.iter().map(move |a| {
                        let mut next = w.clone();
                        next.push(a.to_string());
                        next
                    })
                })
                .collect();
            words.extend(frontier.iter().cloned());
        }
        words
    }

    /// Asserts that `left` and `right` agree on every word up to length `max_len` over the
    /// alphabet of `left`.
    pub fn assert_same_language(left: &Automaton, right: &Automaton, max_len: usize) {
        for word in words_up_to(left.alphabet(), max_len) {
            assert_eq!(
                left.accepts(&word),
                right.accepts(&word),
                "automata disagree on {word:?}\n{left:?}\n{right:?}"
            );
        }
    }

    pub fn example_grammar() -> Grammar {
        Grammar::parse("<S> ::= a<A> | b<B>\n<A> ::= a | a<A>\n<B> ::= b | ε\n")
            .expect("grammar has rules")
    }

    #[test_log::test]
    fn enumerates_words() {
        let alphabet = OrderedSet::from([Symbol::new("a"), Symbol::new("b")]);
        assert_eq!(words_up_to(&alphabet, 2).len(), 1 + 2 + 4);
    }
}
