//! Revision target grammar.
//!
//! ```text
//! head | heads | base            symbolic ends of the chain
//! 07930e245345 | 0793            full id or unique prefix (4+ chars)
//! +2 | -1                        relative to the current revision
//! head-2 | base+1 | 0793+1       relative to an anchor
//! f2ceaddf7354:07930e245345      offline range (from:to), see parse_range
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt, value},
    sequence::{pair, separated_pair},
    IResult,
};

use crate::error::TargetError;

use super::graph::MigrationGraph;

/// Where a relative offset is counted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Current,
    Head,
    Base,
    Revision(String),
}

/// A parsed, not yet resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Head,
    Base,
    Revision(String),
    Relative { anchor: Anchor, offset: i64 },
}

fn keyword(input: &str) -> IResult<&str, Anchor> {
    alt((
        value(Anchor::Head, tag("heads")),
        value(Anchor::Head, tag("head")),
        value(Anchor::Base, tag("base")),
    ))(input)
}

fn revision_prefix(input: &str) -> IResult<&str, String> {
    map(
        take_while_m_n(4, 12, |c: char| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
        str::to_string,
    )(input)
}

fn anchor(input: &str) -> IResult<&str, Anchor> {
    alt((keyword, map(revision_prefix, Anchor::Revision)))(input)
}

fn offset(input: &str) -> IResult<&str, i64> {
    map_res(pair(one_of("+-"), digit1), |(sign, digits): (char, &str)| {
        digits.parse::<i64>().map(|n| if sign == '-' { -n } else { n })
    })(input)
}

fn target(input: &str) -> IResult<&str, Target> {
    alt((
        map(offset, |offset| Target::Relative {
            anchor: Anchor::Current,
            offset,
        }),
        map(pair(anchor, opt(offset)), |(anchor, offset)| match (anchor, offset) {
            (anchor, Some(offset)) => Target::Relative { anchor, offset },
            (Anchor::Head, None) => Target::Head,
            (Anchor::Base, None) => Target::Base,
            (Anchor::Revision(rev), None) => Target::Revision(rev),
            (Anchor::Current, None) => Target::Relative {
                anchor: Anchor::Current,
                offset: 0,
            },
        }),
    ))(input)
}

impl Target {
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        all_consuming(target)(input.trim())
            .map(|(_, t)| t)
            .map_err(|_| TargetError::Syntax(input.to_string()))
    }

    /// Whether resolution depends on the applied marker.
    pub fn needs_current(&self) -> bool {
        matches!(
            self,
            Target::Relative {
                anchor: Anchor::Current,
                ..
            }
        )
    }

    /// Resolve to a revision (`None` = empty marker) given the current marker.
    pub fn resolve(
        &self,
        graph: &MigrationGraph,
        current: Option<&str>,
    ) -> Result<Option<&'static str>, TargetError> {
        match self {
            Target::Head => Ok(Some(graph.head().revision)),
            Target::Base => Ok(None),
            Target::Revision(prefix) => graph.resolve_prefix(prefix).map(Some),
            Target::Relative { anchor, offset } => {
                let start = match anchor {
                    Anchor::Current => graph.position(current)?,
                    Anchor::Head => graph.len(),
                    Anchor::Base => 0,
                    Anchor::Revision(prefix) => {
                        let rev = graph.resolve_prefix(prefix)?;
                        graph.position(Some(rev))?
                    }
                };
                let out_of_range = || TargetError::OutOfRange(self.to_string());
                let position = i64::try_from(start)
                    .ok()
                    .and_then(|s| s.checked_add(*offset))
                    .and_then(|p| usize::try_from(p).ok())
                    .ok_or_else(out_of_range)?;
                graph.at_position(position).ok_or_else(out_of_range)
            }
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Head => write!(f, "head"),
            Target::Base => write!(f, "base"),
            Target::Revision(rev) => write!(f, "{}", rev),
            Target::Relative { anchor, offset } => {
                match anchor {
                    Anchor::Current => {}
                    Anchor::Head => write!(f, "head")?,
                    Anchor::Base => write!(f, "base")?,
                    Anchor::Revision(rev) => write!(f, "{}", rev)?,
                }
                write!(f, "{:+}", offset)
            }
        }
    }
}

/// Parse an offline `from:to` range. A bare target yields `(None, target)`.
pub fn parse_range(input: &str) -> Result<(Option<Target>, Target), TargetError> {
    let range = separated_pair(target, char(':'), target);
    let single = map(target, |t| (None, t));
    all_consuming(alt((map(range, |(from, to)| (Some(from), to)), single)))(input.trim())
        .map(|(_, r)| r)
        .map_err(|_| TargetError::Syntax(input.to_string()))
}
