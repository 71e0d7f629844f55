use std::{collections::BTreeMap, fmt};

use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::math::OrderedSet;

macro_rules! label {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(String);

        impl $name {
            /// Creates a new label from anything that can be turned into a [`String`].
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the underlying name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&String> for $name {
            fn from(value: &String) -> Self {
                Self(value.clone())
            }
        }

        impl From<&$name> for $name {
            fn from(value: &$name) -> Self {
                value.clone()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

label!(
    /// An opaque state label. Nonterminals of a grammar, subsets produced by the
    /// subset construction (`{A,B}`) and the blocks of a minimized automaton (`q0`)
    /// are all represented by their name.
    State
);

label!(
    /// A single element of the alphabet. For automata built from a grammar this is a
    /// terminal, which may consist of more than one character.
    Symbol
);

/// The target of a transition. Deterministic automata only ever store
/// [`Destination::Deterministic`], nondeterministic ones collect their targets in a
/// non-empty set.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Exactly one target state.
    Deterministic(State),
    /// A non-empty set of target states.
    Nondeterministic(OrderedSet<State>),
}

impl Destination {
    /// Iterates over all target states in ascending order.
    pub fn targets(&self) -> impl Iterator<Item = &State> + '_ {
        let (single, many) = match self {
            Destination::Deterministic(q) => (Some(q), None),
            Destination::Nondeterministic(set) => (None, Some(set.iter())),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }

    /// Returns the target if there is precisely one.
    pub fn single(&self) -> Option<&State> {
        match self {
            Destination::Deterministic(q) => Some(q),
            Destination::Nondeterministic(set) if set.len() == 1 => set.iter().next(),
            Destination::Nondeterministic(_) => None,
        }
    }

    /// Returns the first target in ascending order. Used wherever a deterministic
    /// automaton is expected but the destination happens to be stored as a set.
    pub fn first(&self) -> &State {
        match self {
            Destination::Deterministic(q) => q,
            Destination::Nondeterministic(set) => set
                .iter()
                .next()
                .expect("nondeterministic destinations are never empty"),
        }
    }

    /// Returns true if `state` is one of the targets.
    pub fn contains(&self, state: &State) -> bool {
        match self {
            Destination::Deterministic(q) => q == state,
            Destination::Nondeterministic(set) => set.contains(state),
        }
    }

    /// Returns the number of targets.
    pub fn len(&self) -> usize {
        match self {
            Destination::Deterministic(_) => 1,
            Destination::Nondeterministic(set) => set.len(),
        }
    }

    /// Returns true if there is no target, which never holds for a stored destination.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.targets().join(","))
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Deterministic(q) => write!(f, "{q}"),
            Destination::Nondeterministic(set) => write!(f, "{{{}}}", set.iter().join(", ")),
        }
    }
}

/// Tags an [`Automaton`] as nondeterministic or deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A state may have any number of successors on a symbol.
    Nondeterministic,
    /// A state has at most one successor on every symbol.
    Deterministic,
}

/// A finite automaton over named states and symbols, used for both the
/// nondeterministic machine built from a grammar and every deterministic machine
/// derived from it.
///
/// Transitions are stored in a single map keyed by `(state, symbol)`, the absence of
/// a key is the only way a transition can be undefined. All insertion operations are
/// idempotent and add whatever states and symbols they mention, so the automaton
/// never refers to a state or symbol it does not contain.
///
/// Cloning produces a fully independent copy.
///
/// # Example
/// ```
/// use regdfa::prelude::*;
///
/// let mut dfa = Automaton::deterministic("S");
/// dfa.add_dfa_transition("S", "a", "A");
/// dfa.add_final("A");
/// assert!(dfa.accepts(["a"]));
/// assert!(!dfa.accepts(["a", "a"]));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Automaton {
    kind: Kind,
    states: OrderedSet<State>,
    alphabet: OrderedSet<Symbol>,
    initial: State,
    finals: OrderedSet<State>,
    transitions: BTreeMap<(State, Symbol), Destination>,
}

impl Automaton {
    /// Creates an automaton of the given kind with a single, initial state.
    pub fn new(kind: Kind, initial: impl Into<State>) -> Self {
        let initial = initial.into();
        Self {
            kind,
            states: OrderedSet::from([initial.clone()]),
            alphabet: OrderedSet::new(),
            initial,
            finals: OrderedSet::new(),
            transitions: BTreeMap::new(),
        }
    }

    /// Shorthand for creating a [`Kind::Nondeterministic`] automaton.
    pub fn nondeterministic(initial: impl Into<State>) -> Self {
        Self::new(Kind::Nondeterministic, initial)
    }

    /// Shorthand for creating a [`Kind::Deterministic`] automaton.
    pub fn deterministic(initial: impl Into<State>) -> Self {
        Self::new(Kind::Deterministic, initial)
    }

    /// Returns the kind `self` is tagged with.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the set of all states.
    pub fn states(&self) -> &OrderedSet<State> {
        &self.states
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &OrderedSet<Symbol> {
        &self.alphabet
    }

    /// Returns the initial state.
    pub fn initial(&self) -> &State {
        &self.initial
    }

    /// Returns the set of accepting states.
    pub fn finals(&self) -> &OrderedSet<State> {
        &self.finals
    }

    /// Returns true if `state` is accepting.
    pub fn is_final(&self, state: &State) -> bool {
        self.finals.contains(state)
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of defined `(state, symbol)` pairs.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Adds `state` to the set of states.
    pub fn add_state(&mut self, state: impl Into<State>) {
        self.states.insert(state.into());
    }

    /// Adds `symbol` to the alphabet.
    pub fn add_symbol(&mut self, symbol: impl Into<Symbol>) {
        self.alphabet.insert(symbol.into());
    }

    /// Makes `state` the initial state, adding it if necessary.
    pub fn set_initial(&mut self, state: impl Into<State>) {
        let state = state.into();
        self.states.insert(state.clone());
        self.initial = state;
    }

    /// Marks `state` as accepting, adding it if necessary.
    pub fn add_final(&mut self, state: impl Into<State>) {
        let state = state.into();
        self.states.insert(state.clone());
        self.finals.insert(state);
    }

    /// Adds `to` to the set of destinations of `from` on `symbol`. Should this give a
    /// deterministic automaton a second successor, it is retagged as nondeterministic.
    pub fn add_nfa_transition(
        &mut self,
        from: impl Into<State>,
        symbol: impl Into<Symbol>,
        to: impl Into<State>,
    ) {
        let (from, symbol, to) = (from.into(), symbol.into(), to.into());
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.alphabet.insert(symbol.clone());

        let destination = self
            .transitions
            .entry((from, symbol))
            .or_insert_with(|| Destination::Nondeterministic(OrderedSet::new()));
        if let Destination::Deterministic(q) = destination {
            *destination = Destination::Nondeterministic(OrderedSet::from([q.clone()]));
        }
        if let Destination::Nondeterministic(set) = destination {
            set.insert(to);
            if set.len() > 1 && self.kind == Kind::Deterministic {
                debug!("second successor added, automaton is no longer deterministic");
                self.kind = Kind::Nondeterministic;
            }
        }
    }

    /// Sets the destination of `from` on `symbol` to `to`, replacing whatever was
    /// there before.
    pub fn add_dfa_transition(
        &mut self,
        from: impl Into<State>,
        symbol: impl Into<Symbol>,
        to: impl Into<State>,
    ) {
        let (from, symbol, to) = (from.into(), symbol.into(), to.into());
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.alphabet.insert(symbol.clone());
        self.transitions
            .insert((from, symbol), Destination::Deterministic(to));
    }

    /// Stores `destination` as is. Callers guarantee that all endpoints are states of
    /// `self`, that `symbol` is in the alphabet and that `destination` fits the kind.
    pub(crate) fn insert_destination(&mut self, from: State, symbol: Symbol, destination: Destination) {
        debug_assert!(self.states.contains(&from));
        debug_assert!(self.alphabet.contains(&symbol));
        debug_assert!(destination.targets().all(|q| self.states.contains(q)));
        self.transitions.insert((from, symbol), destination);
    }

    /// Replaces the alphabet with the given one.
    pub(crate) fn set_alphabet(&mut self, alphabet: OrderedSet<Symbol>) {
        self.alphabet = alphabet;
    }

    /// Returns the destination of `state` on `symbol`, or `None` if it is undefined.
    pub fn lookup(&self, state: &State, symbol: &Symbol) -> Option<&Destination> {
        self.transitions.get(&(state.clone(), symbol.clone()))
    }

    /// Iterates over all defined transitions, ordered by source state and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, &Symbol, &Destination)> + '_ {
        self.transitions
            .iter()
            .map(|((from, symbol), destination)| (from, symbol, destination))
    }

    /// Iterates over the defined transitions leaving `state`, ordered by symbol.
    pub fn edges_from<'a>(
        &'a self,
        state: &'a State,
    ) -> impl Iterator<Item = (&'a Symbol, &'a Destination)> + 'a {
        self.transitions
            .range((state.clone(), Symbol::default())..)
            .take_while(move |((from, _), _)| from == state)
            .map(|((_, symbol), destination)| (symbol, destination))
    }

    /// Returns true if no `(state, symbol)` pair has more than one destination.
    pub fn is_deterministic(&self) -> bool {
        self.transitions.values().all(|d| d.len() <= 1)
    }

    /// Runs `word` from the initial state and returns whether an accepting state is
    /// reached. Nondeterministic destinations are followed in parallel, so this works
    /// for both kinds. Symbols outside the alphabet and undefined transitions reject.
    pub fn accepts<I>(&self, word: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut current: OrderedSet<&State> = OrderedSet::from([&self.initial]);
        for symbol in word {
            let symbol = Symbol::new(symbol.as_ref());
            if !self.alphabet.contains(&symbol) {
                return false;
            }
            current = current
                .into_iter()
                .filter_map(|q| self.lookup(q, &symbol))
                .flat_map(|d| d.targets())
                .collect();
            if current.is_empty() {
                return false;
            }
        }
        current.into_iter().any(|q| self.is_final(q))
    }

    /// Returns a string representation of the transition table. States are listed in
    /// ascending order, the initial one is marked with `→` and accepting ones with `*`.
    /// Undefined transitions are shown as `-`.
    pub fn build_transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet.iter().map(|s| s.to_string())),
        );
        for state in &self.states {
            let mut name = state.to_string();
            if self.is_final(state) {
                name = format!("{name}*").bold().to_string();
            }
            if state == &self.initial {
                name = format!("→ {name}");
            }
            let mut row = vec![name];
            for symbol in &self.alphabet {
                match self.lookup(state, symbol) {
                    Some(destination) => row.push(destination.to_string()),
                    None => row.push("-".to_string()),
                }
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} automaton\n{}", self.kind, self.build_transition_table())
    }
}
