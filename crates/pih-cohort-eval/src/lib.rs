//! Cohort evaluation engine
//!
//! This crate turns cohort definitions into patient sets:
//!
//! - **Definitions**: leaf predicates, `All`/`Any` combinations and ordered
//!   AND / OR / AND NOT composition chains, validated when they are built
//! - **Predicates**: state history, identifiers, encounters and observations,
//!   evaluated against an [`EvaluationContext`](pih_cohort_types::EvaluationContext)
//! - **Temporal utilities**: completed-unit ages and calendar month arithmetic
//! - **State-transition resolver**: the outcome a patient moved into after
//!   leaving a tracked state
//! - **Engine and sessions**: per-run memoization of shared sub-cohorts and
//!   provider fetches, concurrent sibling evaluation, cancellation and timeout
//!
//! # Example
//!
//! ```ignore
//! use pih_cohort_eval::{CohortEngine, predicates};
//!
//! let engine = CohortEngine::new(sources);
//! let on_art = predicates::currently_in_state_on_end_date(on_art_state)?;
//! let patients = engine.evaluate(&on_art, population, &ctx).await?;
//! ```

pub mod algebra;
pub mod definition;
pub mod engine;
pub mod error;
pub mod operators;
pub mod predicate;
pub mod predicates;
pub mod resolver;
pub mod session;
pub mod temporal;

pub use algebra::{compose, intersect_all, union_any};
pub use definition::{CohortDefinition, CohortKind, CohortRef, Composition, DefinitionId, SetOperator};
pub use engine::{CohortEngine, EngineOptions};
pub use error::{EvalError, EvalResult};
pub use predicate::{DateAnchor, Predicate, TimeWindow};
pub use resolver::{AnchorPolicy, StateTransitionResolver, first_entry_into, state_on};
pub use session::{CancellationFlag, EvaluationSession};
