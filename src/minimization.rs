use indexmap::IndexMap;
use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::{
    math::{Map, OrderedSet, Partition},
    prelude::*,
};

/// For each symbol (in ascending order), the position of the block that the successor
/// lies in, `None` if there is no successor.
type Signature = Vec<Option<usize>>;

impl Automaton {
    /// Computes the coarsest partition of the states of `self` into classes of states that
    /// accept the same language. Starts with the accepting and the rejecting states (in
    /// that order, omitting an empty side) and repeatedly splits every block by the
    /// signature of its members, the blocks their successors lie in with respect to the
    /// partition at the start of the round, until a round splits nothing.
    pub fn equivalence_partition(&self) -> Partition<State> {
        let symbols: Vec<&Symbol> = self.alphabet().iter().collect();
        let (accepting, rejecting): (Vec<State>, Vec<State>) =
            self.states().iter().cloned().partition(|q| self.is_final(q));
        let mut partition = Partition::new([accepting, rejecting]);

        let mut round = 0;
        loop {
            trace!("round {round}: {}", show_partition(&partition));
            let refined = self.refine(&partition, &symbols);
            if refined.size() == partition.size() {
                break;
            }
            partition = refined;
            round += 1;
        }
        partition
    }

    fn refine(&self, partition: &Partition<State>, symbols: &[&Symbol]) -> Partition<State> {
        let block_of: Map<&State, usize> = partition
            .iter()
            .enumerate()
            .flat_map(|(i, block)| block.iter().map(move |q| (q, i)))
            .collect();
        let signature = |q: &State| -> Signature {
            symbols
                .iter()
                .map(|a| {
                    self.lookup(q, a)
                        .and_then(|d| block_of.get(d.first()).copied())
                })
                .collect()
        };

        let mut refined: Vec<OrderedSet<State>> = Vec::with_capacity(partition.size());
        for block in partition {
            if block.len() <= 1 {
                refined.push(block.clone());
                continue;
            }
            let mut groups: IndexMap<Signature, OrderedSet<State>> = IndexMap::new();
            for q in block {
                groups.entry(signature(q)).or_default().insert(q.clone());
            }
            refined.extend(groups.into_values());
        }
        refined.into()
    }

    /// Returns the minimal deterministic automaton accepting the same language as `self`,
    /// which has to be deterministic and should be complete (see [`Automaton::complete`]).
    ///
    /// Every block of [`Automaton::equivalence_partition`] becomes one state, named `q0`,
    /// `q1`, ... in the order of the blocks. A block is accepting if it contains an
    /// accepting state and initial if it contains the initial state. Its transitions are
    /// those of an arbitrary member, mapped to the blocks of the targets.
    ///
    /// # Example
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let mut dfa = Automaton::deterministic("S");
    /// dfa.add_dfa_transition("S", "a", "A");
    /// dfa.add_dfa_transition("S", "b", "B");
    /// dfa.add_dfa_transition("A", "a", "A");
    /// dfa.add_dfa_transition("A", "b", "A");
    /// dfa.add_dfa_transition("B", "a", "B");
    /// dfa.add_dfa_transition("B", "b", "B");
    /// dfa.add_final("A");
    /// dfa.add_final("B");
    ///
    /// let min = dfa.minimize();
    /// assert_eq!(min.size(), 2);
    /// assert!(min.accepts(["a", "b"]));
    /// ```
    pub fn minimize(&self) -> Automaton {
        if self.kind() != Kind::Deterministic || !self.is_deterministic() {
            warn!("minimizing an automaton that is not deterministic, only the first target of each transition is considered");
        }
        if !self.is_complete() {
            debug!("minimizing an incomplete automaton, undefined transitions form their own signature");
        }

        let partition = self.equivalence_partition();
        let names: Vec<State> = (0..partition.size())
            .map(|i| State::new(format!("q{i}")))
            .collect();
        let block_of: Map<&State, usize> = partition
            .iter()
            .enumerate()
            .flat_map(|(i, block)| block.iter().map(move |q| (q, i)))
            .collect();

        let mut min = Automaton::deterministic(names[block_of[self.initial()]].clone());
        min.set_alphabet(self.alphabet().clone());
        for (block, name) in partition.iter().zip(&names) {
            min.add_state(name);
            if block.iter().any(|q| self.is_final(q)) {
                min.add_final(name);
            }
        }

        for (block, name) in partition.iter().zip(&names) {
            let representative = block
                .iter()
                .next()
                .expect("blocks of a partition are never empty");
            for (symbol, destination) in self.edges_from(representative) {
                let target = &names[block_of[destination.first()]];
                min.add_dfa_transition(name, symbol, target);
            }
        }

        debug!(
            "minimization reduced {} states to {}",
            self.size(),
            min.size()
        );
        min
    }
}

fn show_partition(partition: &Partition<State>) -> String {
    partition
        .iter()
        .map(|block| format!("{{{}}}", block.iter().join(", ")))
        .join(" ")
}

#[cfg(test)]
mod tests {
    use crate::{
        pipeline::ReservedNames,
        prelude::*,
        tests::{assert_same_language, example_grammar},
    };

    pub fn wiki_dfa() -> Automaton {
        let mut dfa = Automaton::deterministic("0");
        for (from, symbol, to) in [
            ("0", "a", "1"),
            ("0", "b", "2"),
            ("1", "a", "0"),
            ("1", "b", "3"),
            ("2", "a", "4"),
            ("2", "b", "5"),
            ("3", "a", "4"),
            ("3", "b", "5"),
            ("4", "a", "4"),
            ("4", "b", "5"),
            ("5", "a", "5"),
            ("5", "b", "5"),
        ] {
            dfa.add_dfa_transition(from, symbol, to);
        }
        for q in ["2", "3", "4"] {
            dfa.add_final(q);
        }
        dfa
    }

    fn blocks(partition: &Partition<State>) -> Vec<Vec<&str>> {
        partition
            .iter()
            .map(|block| block.iter().map(State::as_str).collect())
            .collect()
    }

    #[test_log::test]
    fn wiki_partition() {
        let partition = wiki_dfa().equivalence_partition();
        assert_eq!(
            blocks(&partition),
            vec![vec!["2", "3", "4"], vec!["0", "1"], vec!["5"]]
        );
    }

    #[test_log::test]
    fn wiki_minimization() {
        let dfa = wiki_dfa();
        let min = dfa.minimize();

        assert_eq!(min.size(), 3);
        assert_eq!(min.initial().as_str(), "q1");
        assert_eq!(
            min.finals().iter().map(State::as_str).collect::<Vec<_>>(),
            ["q0"]
        );
        assert!(min.is_complete());
        assert_eq!(min.kind(), Kind::Deterministic);
        assert_same_language(&dfa, &min, 6);
    }

    #[test_log::test]
    fn minimization_is_idempotent() {
        let min = wiki_dfa().minimize();
        let again = min.minimize();
        assert_eq!(again.size(), min.size());
        assert_same_language(&min, &again, 6);
    }

    #[test_log::test]
    fn equivalent_rejecting_states_collapse() {
        // A and B behave the same, both lead to the accepting F on every symbol
        let mut dfa = Automaton::deterministic("S");
        for (from, symbol, to) in [
            ("S", "a", "A"),
            ("S", "b", "B"),
            ("A", "a", "F"),
            ("A", "b", "F"),
            ("B", "a", "F"),
            ("B", "b", "F"),
            ("F", "a", "F"),
            ("F", "b", "F"),
        ] {
            dfa.add_dfa_transition(from, symbol, to);
        }
        dfa.add_final("F");

        let partition = dfa.equivalence_partition();
        assert_eq!(partition.block_of(&State::new("A")), partition.block_of(&State::new("B")));
        let min = dfa.minimize();
        assert_eq!(min.size(), 3);
        assert!(min.finals().len() <= dfa.finals().len());
        assert_same_language(&dfa, &min, 5);
    }

    #[test_log::test]
    fn single_block_when_all_states_accept() {
        let mut dfa = Automaton::deterministic("S");
        dfa.add_dfa_transition("S", "a", "A");
        dfa.add_dfa_transition("A", "a", "S");
        dfa.add_final("S");
        dfa.add_final("A");

        let min = dfa.minimize();
        assert_eq!(min.size(), 1);
        assert!(min.is_final(min.initial()));
        assert_eq!(
            min.lookup(min.initial(), &Symbol::new("a")),
            Some(&Destination::Deterministic(State::new("q0")))
        );
    }

    #[test_log::test]
    fn minimizes_completed_grammar_automaton() {
        let names = ReservedNames::default();
        let complete = Automaton::from_grammar(&example_grammar(), &names)
            .determinize()
            .prune_unreachable()
            .complete(&names.sink_state);
        let min = complete.minimize();

        assert!(min.size() <= complete.size());
        assert!(min.finals().len() <= complete.finals().len());
        assert!(min.is_complete());
        assert_same_language(&complete, &min, 6);
    }
}
