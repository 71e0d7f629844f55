use std::{collections::VecDeque, fmt};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    math::{Map, OrderedSet},
    prelude::*,
};

/// A set of states of a nondeterministic automaton, which becomes a single state of the
/// deterministic automaton obtained through the subset construction. As the members are
/// kept sorted, equal sets always have the same [`StateSet::name`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StateSet(OrderedSet<State>);

impl StateSet {
    /// Creates the set containing only `state`.
    pub fn singleton(state: State) -> Self {
        Self(OrderedSet::from([state]))
    }

    /// Iterates over the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &'_ State> + '_ {
        self.0.iter()
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if some member is in `states`.
    pub fn intersects(&self, states: &OrderedSet<State>) -> bool {
        self.0.iter().any(|q| states.contains(q))
    }

    /// The canonical name of the set, its sorted members joined by `,` and wrapped in
    /// braces. The empty set is named `{}`.
    ///
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let set: StateSet = ["B", "A"].into_iter().map(State::from).collect();
    /// assert_eq!(set.name().as_str(), "{A,B}");
    /// assert_eq!(StateSet::default().name().as_str(), "{}");
    /// ```
    pub fn name(&self) -> State {
        State::new(format!("{{{}}}", self.0.iter().join(",")))
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<T: IntoIterator<Item = State>>(iter: T) -> Self {
        Self(OrderedSet::from_iter(iter))
    }
}

impl Extend<State> for StateSet {
    fn extend<T: IntoIterator<Item = State>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "∅")
        } else {
            write!(f, "{{{}}}", self.iter().join(", "))
        }
    }
}

impl Automaton {
    /// Applies the subset construction, producing an equivalent deterministic automaton.
    ///
    /// Starting from the set that only contains the initial state, sets are processed in
    /// the order in which they are discovered. For each symbol, the successors of all
    /// members are collected; if there are none no transition is added, otherwise the
    /// successor set becomes a state named by [`StateSet::name`]. A set is accepting if it
    /// contains an accepting state. Only sets reachable from the initial one are created,
    /// and the empty set never is.
    ///
    /// # Example
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// let mut nfa = Automaton::nondeterministic("S");
    /// nfa.add_nfa_transition("S", "a", "S");
    /// nfa.add_nfa_transition("S", "a", "F");
    /// nfa.add_final("F");
    ///
    /// let dfa = nfa.determinize();
    /// assert_eq!(dfa.initial().as_str(), "{S}");
    /// assert!(dfa.is_final(&State::new("{F,S}")));
    /// assert!(dfa.is_deterministic());
    /// ```
    pub fn determinize(&self) -> Automaton {
        let seed = StateSet::singleton(self.initial().clone());
        let mut dfa = Automaton::deterministic(seed.name());
        dfa.set_alphabet(self.alphabet().clone());
        if seed.intersects(self.finals()) {
            dfa.add_final(seed.name());
        }

        let mut names: Map<StateSet, State> = Map::default();
        names.insert(seed.clone(), seed.name());
        let mut queue = VecDeque::from([(seed.name(), seed)]);

        while let Some((source, current)) = queue.pop_front() {
            for symbol in self.alphabet() {
                let target: StateSet = current
                    .iter()
                    .filter_map(|q| self.lookup(q, symbol))
                    .flat_map(|d| d.targets().cloned())
                    .collect();
                if target.is_empty() {
                    continue;
                }

                let target_name = match names.get(&target) {
                    Some(name) => name.clone(),
                    None => {
                        let name = target.name();
                        trace!("discovered subset {name} on {symbol} from {source}");
                        if target.intersects(self.finals()) {
                            dfa.add_final(name.clone());
                        }
                        names.insert(target.clone(), name.clone());
                        queue.push_back((name.clone(), target));
                        name
                    }
                };
                dfa.add_dfa_transition(source.clone(), symbol.clone(), target_name);
            }
        }

        debug!(
            "subset construction produced {} states and {} transitions",
            dfa.size(),
            dfa.transition_count()
        );
        dfa
    }
}
