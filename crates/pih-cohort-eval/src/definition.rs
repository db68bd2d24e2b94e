//! Cohort definitions
//!
//! A [`CohortDefinition`] is built once, validated at build time and then shared
//! through `Arc` by every parent that composes it. Its [`DefinitionId`] keys the
//! per-run memo, so a sub-cohort shared by several parents is evaluated once
//! per evaluation context.

use crate::predicate::Predicate;
use pih_cohort_diagnostics::{ConfigError, ConfigResult};
use pih_cohort_types::PatientSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared handle to a cohort definition
pub type CohortRef = Arc<CohortDefinition>;

static NEXT_DEFINITION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a cohort definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(u64);

impl DefinitionId {
    fn next() -> Self {
        Self(NEXT_DEFINITION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operator of a composition chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOperator {
    /// Intersection
    And,
    /// Union
    Or,
    /// Difference
    AndNot,
}

impl SetOperator {
    /// Fold one operand into an accumulated result
    pub fn apply(self, mut acc: PatientSet, rhs: &PatientSet) -> PatientSet {
        match self {
            Self::And => acc.retain(|p| rhs.contains(p)),
            Self::Or => acc.extend(rhs.iter().copied()),
            Self::AndNot => acc.retain(|p| !rhs.contains(p)),
        }
        acc
    }
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::AndNot => write!(f, "AND NOT"),
        }
    }
}

impl FromStr for SetOperator {
    type Err = ConfigError;

    /// Accepts `AND`, `OR` and `AND NOT` in any case and with any inner spacing
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let words: Vec<String> = token
            .split_whitespace()
            .map(str::to_ascii_uppercase)
            .collect();
        match words.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["AND"] => Ok(Self::And),
            ["OR"] => Ok(Self::Or),
            ["AND", "NOT"] => Ok(Self::AndNot),
            _ => Err(ConfigError::unknown_operator(token)),
        }
    }
}

/// Ordered chain `c0 op1 c1 op2 c2 ...`, folded left to right
#[derive(Debug, Clone)]
pub struct Composition {
    first: CohortRef,
    steps: Vec<(SetOperator, CohortRef)>,
}

impl Composition {
    pub fn start(first: CohortRef) -> Self {
        Self {
            first,
            steps: Vec::new(),
        }
    }

    pub fn then(mut self, op: SetOperator, operand: CohortRef) -> Self {
        self.steps.push((op, operand));
        self
    }

    pub fn and(self, operand: CohortRef) -> Self {
        self.then(SetOperator::And, operand)
    }

    pub fn or(self, operand: CohortRef) -> Self {
        self.then(SetOperator::Or, operand)
    }

    pub fn and_not(self, operand: CohortRef) -> Self {
        self.then(SetOperator::AndNot, operand)
    }

    /// Build a chain from textual operator tokens, e.g. `(a, [("AND", b), ("AND NOT", c)])`
    pub fn from_tokens<'a>(
        first: CohortRef,
        rest: impl IntoIterator<Item = (&'a str, CohortRef)>,
    ) -> ConfigResult<Self> {
        rest.into_iter()
            .try_fold(Self::start(first), |chain, (token, operand)| {
                Ok(chain.then(token.parse()?, operand))
            })
    }

    pub fn first(&self) -> &CohortRef {
        &self.first
    }

    pub fn steps(&self) -> &[(SetOperator, CohortRef)] {
        &self.steps
    }

    /// Every operand in chain order
    pub fn operands(&self) -> impl Iterator<Item = &CohortRef> {
        std::iter::once(&self.first).chain(self.steps.iter().map(|(_, c)| c))
    }
}

/// How a cohort is computed
#[derive(Debug)]
pub enum CohortKind {
    Predicate(Predicate),
    /// Intersection of all operands
    All(Vec<CohortRef>),
    /// Union of all operands
    Any(Vec<CohortRef>),
    Composition(Composition),
}

/// A named, immutable cohort definition
#[derive(Debug)]
pub struct CohortDefinition {
    id: DefinitionId,
    description: String,
    kind: CohortKind,
}

impl CohortDefinition {
    fn build(description: impl Into<String>, kind: CohortKind) -> CohortRef {
        Arc::new(Self {
            id: DefinitionId::next(),
            description: description.into(),
            kind,
        })
    }

    pub fn predicate(description: impl Into<String>, predicate: Predicate) -> CohortRef {
        Self::build(description, CohortKind::Predicate(predicate))
    }

    /// Patients in every operand; at least one operand is required
    pub fn all(description: impl Into<String>, operands: Vec<CohortRef>) -> ConfigResult<CohortRef> {
        if operands.is_empty() {
            return Err(ConfigError::empty_operands("intersectAll"));
        }
        Ok(Self::build(description, CohortKind::All(operands)))
    }

    /// Patients in any operand; at least one operand is required
    pub fn any(description: impl Into<String>, operands: Vec<CohortRef>) -> ConfigResult<CohortRef> {
        if operands.is_empty() {
            return Err(ConfigError::empty_operands("unionAny"));
        }
        Ok(Self::build(description, CohortKind::Any(operands)))
    }

    pub fn composition(description: impl Into<String>, chain: Composition) -> CohortRef {
        Self::build(description, CohortKind::Composition(chain))
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &CohortKind {
        &self.kind
    }

    /// Sub-cohorts this definition is computed from
    pub fn children(&self) -> Vec<&CohortRef> {
        match &self.kind {
            CohortKind::Predicate(_) => Vec::new(),
            CohortKind::All(ops) | CohortKind::Any(ops) => ops.iter().collect(),
            CohortKind::Composition(chain) => chain.operands().collect(),
        }
    }
}

impl fmt::Display for CohortDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::TimeWindow;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn leaf(name: &str) -> CohortRef {
        CohortDefinition::predicate(
            name,
            Predicate::AnyEncounter {
                types: [name.to_string()].into_iter().collect(),
                window: TimeWindow::ByEndDate,
            },
        )
    }

    #[rstest]
    #[case("AND", SetOperator::And)]
    #[case("and", SetOperator::And)]
    #[case("OR", SetOperator::Or)]
    #[case("AND NOT", SetOperator::AndNot)]
    #[case("  and   not ", SetOperator::AndNot)]
    fn test_operator_tokens(#[case] token: &str, #[case] expected: SetOperator) {
        assert_eq!(token.parse::<SetOperator>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("NOT")]
    #[case("AND OR")]
    #[case("ANDNOT")]
    #[case("XOR")]
    fn test_unknown_operator_tokens(#[case] token: &str) {
        let err = token.parse::<SetOperator>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOperator { .. }));
    }

    #[test]
    fn test_operator_display_parses_back() {
        for op in [SetOperator::And, SetOperator::Or, SetOperator::AndNot] {
            assert_eq!(op.to_string().parse::<SetOperator>().unwrap(), op);
        }
    }

    #[test]
    fn test_empty_combinations_fail_at_build_time() {
        assert!(matches!(
            CohortDefinition::all("none", Vec::new()),
            Err(ConfigError::EmptyOperands { .. })
        ));
        assert!(matches!(
            CohortDefinition::any("none", Vec::new()),
            Err(ConfigError::EmptyOperands { .. })
        ));
    }

    #[test]
    fn test_chain_from_tokens() {
        let (a, b, c) = (leaf("a"), leaf("b"), leaf("c"));
        let chain =
            Composition::from_tokens(a.clone(), [("AND", b.clone()), ("AND NOT", c.clone())])
                .unwrap();

        let ops: Vec<_> = chain.steps().iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![SetOperator::And, SetOperator::AndNot]);
        let ids: Vec<_> = chain.operands().map(|d| d.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);

        assert!(Composition::from_tokens(a, [("BUT", b)]).is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(leaf("a").id(), leaf("a").id());
    }
}
