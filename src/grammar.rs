use std::{fmt, path::Path};

use indexmap::IndexMap;
use itertools::Itertools;
use tracing::trace;

use crate::error::{Error, Result};

/// Separates the nonterminal on the left from the alternatives on the right of a rule.
pub const RULE_SEPARATOR: &str = "::=";
/// Separates the alternatives of a rule.
pub const ALTERNATIVE_SEPARATOR: char = '|';

/// A regular grammar, mapping every nonterminal to its alternatives in the order in
/// which they were encountered. The start symbol is the first nonterminal that
/// appeared.
///
/// # Example
/// ```
/// use regdfa::prelude::*;
///
/// let grammar = Grammar::parse("<S> ::= a<A> | b\n<A> ::= ε").unwrap();
/// assert_eq!(grammar.start(), "S");
/// assert_eq!(grammar.alternatives("S").unwrap(), ["a<A>", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start: String,
    rules: IndexMap<String, Vec<String>>,
}

impl Grammar {
    /// Creates a grammar from a start symbol and a list of rules. Rules for the same
    /// nonterminal are merged, keeping the order of their alternatives. The start
    /// symbol does not need to have a rule.
    pub fn new<N, A, R>(start: impl Into<String>, rules: R) -> Self
    where
        R: IntoIterator<Item = (N, Vec<A>)>,
        N: Into<String>,
        A: Into<String>,
    {
        let mut merged: IndexMap<String, Vec<String>> = IndexMap::new();
        for (nonterminal, alternatives) in rules {
            merged
                .entry(nonterminal.into())
                .or_default()
                .extend(alternatives.into_iter().map(Into::into));
        }
        Self {
            start: start.into(),
            rules: merged,
        }
    }

    /// Parses a grammar given as lines of the form `<NT> ::= alt1 | alt2 | ...`.
    ///
    /// Blank lines and lines that do not contain exactly one `::=` are skipped. A
    /// nonterminal may appear on several lines, its alternatives are then accumulated.
    /// Empty alternatives are dropped. Fails only if no rule is found at all.
    pub fn parse(text: &str) -> Result<Self> {
        let mut start = None;
        let mut rules: IndexMap<String, Vec<String>> = IndexMap::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((left, right)) = line.split(RULE_SEPARATOR).collect_tuple() else {
                trace!("skipping line without rule: {line}");
                continue;
            };

            let nonterminal = strip_brackets(left).to_string();
            if start.is_none() {
                start = Some(nonterminal.clone());
            }

            rules.entry(nonterminal).or_default().extend(
                right
                    .split(ALTERNATIVE_SEPARATOR)
                    .map(str::trim)
                    .filter(|alt| !alt.is_empty())
                    .map(str::to_string),
            );
        }

        let start = start.ok_or(Error::EmptyGrammar)?;
        Ok(Self { start, rules })
    }

    /// Reads the file at `path` and parses its contents with [`Grammar::parse`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::reading(path, e))?;
        Self::parse(&text)
    }

    /// Returns the start symbol.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Iterates over all nonterminals that have a rule, in order of appearance.
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(String::as_str)
    }

    /// Returns the alternatives of `nonterminal`, or `None` if it has no rule.
    pub fn alternatives(&self, nonterminal: &str) -> Option<&[String]> {
        self.rules.get(nonterminal).map(Vec::as_slice)
    }

    /// Iterates over all rules in order of appearance.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.rules.iter().map(|(nt, alts)| (nt.as_str(), alts.as_slice()))
    }

    /// Classifies every alternative of every rule, see [`Production::classify`].
    pub fn productions<'a>(
        &'a self,
        epsilon: &'a str,
    ) -> impl Iterator<Item = (&'a str, Production)> + 'a {
        self.rules().flat_map(move |(nonterminal, alternatives)| {
            alternatives
                .iter()
                .map(move |alt| (nonterminal, Production::classify(alt, epsilon)))
        })
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (nonterminal, alternatives) in self.rules() {
            writeln!(f, "<{nonterminal}> {RULE_SEPARATOR} {}", alternatives.join(" | "))?;
        }
        Ok(())
    }
}

/// Removes the angle brackets around a nonterminal, `<S>` becomes `S`. Anything that
/// is not enclosed in brackets is returned trimmed but otherwise unchanged.
fn strip_brackets(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(token)
}

/// One alternative of a rule, classified by its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Production {
    /// The alternative derives the empty word.
    Epsilon,
    /// A terminal (possibly of several characters) followed by a nonterminal, as in `a<A>`.
    Step {
        /// The terminal, read as a single symbol.
        terminal: String,
        /// The nonterminal that follows.
        target: String,
    },
    /// A terminal without any nonterminal after it. Anything that does not fit the
    /// other shapes ends up here as well.
    Terminal(String),
}

impl Production {
    /// Classifies `alternative`. It is an [`Production::Epsilon`] if it is empty or equal
    /// to the `epsilon` marker and a [`Production::Step`] if it has the shape
    /// `terminal<Target>` with non-empty terminal and target. Everything else is taken
    /// as a [`Production::Terminal`] consisting of the whole alternative; this never fails.
    ///
    /// ```
    /// use regdfa::prelude::*;
    ///
    /// assert_eq!(Production::classify("ε", "ε"), Production::Epsilon);
    /// assert_eq!(
    ///     Production::classify("ab<B>", "ε"),
    ///     Production::Step { terminal: "ab".into(), target: "B".into() }
    /// );
    /// assert_eq!(Production::classify("a<", "ε"), Production::Terminal("a<".into()));
    /// ```
    pub fn classify(alternative: &str, epsilon: &str) -> Self {
        let alternative = alternative.trim();
        if alternative.is_empty() || alternative == epsilon {
            return Production::Epsilon;
        }

        // the terminal is as long as possible, the target must not be empty
        let step = alternative.strip_suffix('>').and_then(|body| {
            body.rmatch_indices('<').find_map(|(open, _)| {
                let (terminal, target) = (&body[..open], &body[open + 1..]);
                (!terminal.is_empty() && !target.is_empty() && !target.contains('>')).then(|| {
                    Production::Step {
                        terminal: terminal.to_string(),
                        target: target.to_string(),
                    }
                })
            })
        });

        step.unwrap_or_else(|| Production::Terminal(alternative.to_string()))
    }

    /// Returns the terminal read by this production, if any.
    pub fn terminal(&self) -> Option<&str> {
        match self {
            Production::Epsilon => None,
            Production::Step { terminal, .. } | Production::Terminal(terminal) => Some(terminal),
        }
    }

    /// Returns the nonterminal this production continues with, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Production::Step { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Returns true if this is the empty production.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Production::Epsilon)
    }
}
