use std::path::Path;

use tracing::{debug, info, info_span};

use crate::{error::Result, output::OutputFormat, prelude::*};

/// Names with a special meaning for the stages. None of them is checked against the
/// names in a grammar; a collision is reported with a warning but otherwise left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames {
    /// The accepting state that bare terminals lead to, `FINAL` by default.
    pub final_state: State,
    /// The sink state added for completion, `POCO` by default.
    pub sink_state: State,
    /// The alternative denoting the empty word, `ε` by default. An empty alternative
    /// always denotes the empty word as well.
    pub epsilon: String,
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self {
            final_state: State::new("FINAL"),
            sink_state: State::new("POCO"),
            epsilon: "ε".to_string(),
        }
    }
}

/// Everything that can be configured about a run of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// The reserved state names and the epsilon marker.
    pub names: ReservedNames,
    /// The representation the result is written in.
    pub format: OutputFormat,
}

/// The automata produced by the individual stages of the pipeline.
#[derive(Debug, Clone)]
pub struct Stages {
    /// The nondeterministic automaton of the grammar.
    pub nfa: Automaton,
    /// The result of the subset construction.
    pub dfa: Automaton,
    /// The deterministic automaton without unreachable states.
    pub pruned: Automaton,
    /// The pruned automaton, completed with a sink if necessary.
    pub complete: Automaton,
    /// The minimal complete automaton.
    pub minimal: Automaton,
    /// The minimal automaton without its sink, this is the final result.
    pub result: Automaton,
}

impl Stages {
    /// Iterates over the stages in the order in which they are computed, together with
    /// their names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Automaton)> + '_ {
        [
            ("nfa", &self.nfa),
            ("dfa", &self.dfa),
            ("pruned", &self.pruned),
            ("complete", &self.complete),
            ("minimal", &self.minimal),
            ("result", &self.result),
        ]
        .into_iter()
    }
}

/// Computes one stage inside its own span and logs the outcome.
fn stage(name: &'static str, compute: impl FnOnce() -> Automaton) -> Automaton {
    let _span = info_span!("stage", stage = name).entered();
    let aut = compute();
    info!(
        "{name}: {} states, {} transitions",
        aut.size(),
        aut.transition_count()
    );
    debug!("{name}:\n{}", aut.build_transition_table());
    aut
}

/// Runs all stages on `grammar`: conversion into a nondeterministic automaton,
/// determinization, pruning, completion, minimization and removal of the sink.
///
/// # Example
/// ```
/// use regdfa::prelude::*;
///
/// let grammar = Grammar::parse("<S> ::= a<A> | b<B>\n<A> ::= a | a<A>\n<B> ::= b | ε").unwrap();
/// let stages = regdfa::pipeline::run(&grammar, &ReservedNames::default());
/// assert!(stages.result.accepts(["b"]));
/// assert!(stages.result.accepts(["a", "a"]));
/// assert!(!stages.result.accepts(["a"]));
/// ```
pub fn run(grammar: &Grammar, names: &ReservedNames) -> Stages {
    let nfa = stage("nfa", || Automaton::from_grammar(grammar, names));
    let dfa = stage("dfa", || nfa.determinize());
    let pruned = stage("pruned", || dfa.prune_unreachable());
    let complete = stage("complete", || pruned.complete(&names.sink_state));
    let minimal = stage("minimal", || complete.minimize());
    let result = stage("result", || minimal.remove_sink());
    Stages {
        nfa,
        dfa,
        pruned,
        complete,
        minimal,
        result,
    }
}

/// Reads the grammar at `input`, runs all stages on it and writes the result to `output`
/// in the configured format.
pub fn run_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &Options,
) -> Result<Stages> {
    let (input, output) = (input.as_ref(), output.as_ref());
    info!("reading grammar from {}", input.display());
    let grammar = Grammar::from_file(input)?;
    debug!("start symbol {}, rules\n{grammar}", grammar.start());

    let stages = run(&grammar, &options.names);
    options.format.write_to_path(&stages.result, output)?;
    info!("wrote minimal automaton to {}", output.display());
    Ok(stages)
}
