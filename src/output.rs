use std::{fmt, io, path::Path, str::FromStr};

use tracing::debug;

use crate::{
    error::{Error, Result},
    prelude::*,
};

/// Header of the per-transition listing.
pub const TRANSITIONS_HEADER: [&str; 5] = ["estado", "simbolo", "destino", "eh_inicial", "eh_final"];
/// Leading columns of the transition table, followed by one column per symbol.
pub const TABLE_HEADER: [&str; 3] = ["estado", "inicial", "final"];
/// Cell content of the transition table for an undefined transition.
pub const UNDEFINED: &str = "-";

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// The CSV representations an automaton can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One row per defined transition, see [`write_transitions`].
    #[default]
    Transitions,
    /// One row per state and one column per symbol, see [`write_table`].
    Table,
}

impl OutputFormat {
    /// Writes `aut` to `writer` in this format.
    pub fn write<W: io::Write>(self, aut: &Automaton, writer: W) -> Result<()> {
        match self {
            OutputFormat::Transitions => write_transitions(aut, writer),
            OutputFormat::Table => write_table(aut, writer),
        }
    }

    /// Creates (or truncates) the file at `path` and writes `aut` to it in this format.
    pub fn write_to_path(self, aut: &Automaton, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("writing {self} representation to {}", path.display());
        let file = std::fs::File::create(path).map_err(|e| Error::writing(path, e))?;
        self.write(aut, io::BufWriter::new(file))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Transitions => write!(f, "transitions"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "transitions" => Ok(OutputFormat::Transitions),
            "table" => Ok(OutputFormat::Table),
            other => Err(format!("unknown output format \"{other}\"")),
        }
    }
}

/// Writes one CSV row per defined transition with the columns of [`TRANSITIONS_HEADER`].
/// States are listed in ascending order and the transitions of a state are ordered by
/// symbol. A state without any outgoing transition still gets a row, with empty symbol
/// and destination.
///
/// # Example
/// ```
/// use regdfa::prelude::*;
///
/// let mut dfa = Automaton::deterministic("S");
/// dfa.add_dfa_transition("S", "a", "F");
/// dfa.add_final("F");
///
/// let mut out = vec![];
/// regdfa::output::write_transitions(&dfa, &mut out).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "estado,simbolo,destino,eh_inicial,eh_final\nF,,,false,true\nS,a,F,true,false\n"
/// );
/// ```
pub fn write_transitions<W: io::Write>(aut: &Automaton, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(TRANSITIONS_HEADER)?;

    for state in aut.states() {
        let initial = flag(state == aut.initial());
        let accepting = flag(aut.is_final(state));

        let mut any = false;
        for (symbol, destination) in aut.edges_from(state) {
            any = true;
            let target = destination.to_string();
            csv.write_record([
                state.as_str(),
                symbol.as_str(),
                target.as_str(),
                initial,
                accepting,
            ])?;
        }
        if !any {
            csv.write_record([state.as_str(), "", "", initial, accepting])?;
        }
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the transition table as CSV: the columns of [`TABLE_HEADER`] followed by one
/// column per symbol in ascending order. Every state (again in ascending order) gets one
/// row holding its destinations, [`UNDEFINED`] where there is none.
pub fn write_table<W: io::Write>(aut: &Automaton, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(
        TABLE_HEADER
            .iter()
            .map(|s| s.to_string())
            .chain(aut.alphabet().iter().map(Symbol::to_string)),
    )?;

    for state in aut.states() {
        let mut row = vec![
            state.to_string(),
            flag(state == aut.initial()).to_string(),
            flag(aut.is_final(state)).to_string(),
        ];
        row.extend(aut.alphabet().iter().map(|symbol| {
            aut.lookup(state, symbol)
                .map_or_else(|| UNDEFINED.to_string(), Destination::to_string)
        }));
        csv.write_record(row)?;
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}
