//! HCC register
//!
//! One row per patient of the HIV care clinic register: identifiers, first
//! pre-ART and exposed-child contacts, the outcome of the HCC enrolment at the
//! report location, CD4, visits and the whole enrolment history.

use super::row::{CellValue, FieldError, Row};
use crate::library::HivMetadata;
use chrono::NaiveDate;
use pih_cohort_eval::temporal::age_at;
use pih_cohort_eval::{EvalError, EvalResult, EvaluationSession, first_entry_into, state_on};
use pih_cohort_model::{ObservationQuery, PatientIndex};
use pih_cohort_types::{AgeUnit, Encounter, EvaluationContext, ObsValue, PatientId};
use std::sync::Arc;

type Fetched<T> = EvalResult<Arc<PatientIndex<T>>>;

/// Records of one patient from a fetch; a failed fetch fails the column
fn records<'a, T>(fetched: &'a Fetched<T>, patient: PatientId) -> Result<&'a [T], FieldError> {
    match fetched {
        Ok(index) => Ok(index.get(&patient).map(Vec::as_slice).unwrap_or_default()),
        Err(err) => Err(err.clone().into()),
    }
}

/// A date column and a location column from one lookup
fn push_dated(
    row: &mut Row,
    label: &str,
    found: Result<Option<(NaiveDate, Option<String>)>, FieldError>,
) {
    match found {
        Ok(found) => {
            let (date, location) = found.map_or((None, None), |(d, l)| (Some(d), l));
            row.push(format!("{label} date"), Ok(CellValue::date(date)));
            row.push(
                format!("{label} location"),
                Ok(location.map_or(CellValue::Empty, CellValue::Text)),
            );
        }
        Err(err) => {
            row.push(format!("{label} date"), Err(err.clone()));
            row.push(format!("{label} location"), Err(err));
        }
    }
}

fn dated(encounter: &Encounter) -> (NaiveDate, Option<String>) {
    (encounter.date(), encounter.location.clone())
}

/// Renders the HCC register
#[derive(Debug, Clone)]
pub struct HccRegisterRenderer {
    metadata: HivMetadata,
}

impl HccRegisterRenderer {
    pub fn new(metadata: HivMetadata) -> Self {
        Self { metadata }
    }

    /// One row per patient of the session population, in patient order
    ///
    /// Stops with `Cancelled` if the session is cancelled between rows.
    pub async fn render(&self, session: &EvaluationSession, ctx: &EvaluationContext) -> EvalResult<Vec<Row>> {
        let mut rows = Vec::with_capacity(session.population().len());
        for &patient in session.population() {
            if session.cancellation().is_cancelled() {
                return Err(EvalError::Cancelled);
            }
            rows.push(self.render_row(session, patient, ctx).await);
        }
        log::debug!("rendered {} HCC register rows", rows.len());
        Ok(rows)
    }

    /// Render one patient; fetches are shared with every other row of the session
    pub async fn render_row(&self, session: &EvaluationSession, patient: PatientId, ctx: &EvaluationContext) -> Row {
        let m = &self.metadata;
        let end = ctx.end_date;
        let mut row = Row::new();

        // Identifiers
        let hcc = [m.hcc_number.clone()];
        let hcc_here = session.identifiers(&hcc, ctx.location.as_deref()).await;
        let hcc_all = session.identifiers(&hcc, None).await;
        let arv_all = session.identifiers(&[m.arv_number.clone()], None).await;

        row.push(
            "HCC #",
            records(&hcc_here, patient).map(|ids| {
                ids.first()
                    .map_or(CellValue::Empty, |id| CellValue::text(id.value.as_str()))
            }),
        );
        for (column, fetched) in [("All HCC #s", &hcc_all), ("All ARV #s", &arv_all)] {
            row.push(
                column,
                records(fetched, patient)
                    .map(|ids| CellValue::List(ids.iter().map(|id| id.value.clone()).collect())),
            );
        }

        // First initial encounters
        for (label, encounter_type) in [
            ("Pre-ART initial", &m.pre_art_initial),
            ("Exposed initial", &m.exposed_child_initial),
        ] {
            let fetched = session.encounters(std::slice::from_ref(encounter_type)).await;
            let first = records(&fetched, patient)
                .map(|encounters| encounters.iter().min_by_key(|e| e.datetime).map(dated));
            push_dated(&mut row, label, first);
        }

        // First change to state
        let history = session.state_history(&m.pre_art.workflow).await;
        for (label, state) in [("Pre-ART state", &m.pre_art), ("Exposed state", &m.exposed_child)] {
            let first = records(&history, patient).map(|spans| {
                first_entry_into(spans, state).map(|span| (span.start_date, span.location.clone()))
            });
            push_dated(&mut row, label, first);
        }

        // Demographics
        match session.birth_dates().await {
            Ok(births) => {
                let birth = births.get(&patient).copied();
                let age = |unit| {
                    birth
                        .and_then(|b| age_at(b, end, unit))
                        .map_or(CellValue::Empty, |a| CellValue::Integer(i64::from(a)))
                };
                row.push("Birthdate", Ok(CellValue::date(birth)));
                row.push("Age at end (yr)", Ok(age(AgeUnit::Years)));
                row.push("Age at end (mth)", Ok(age(AgeUnit::Months)));
            }
            Err(err) => {
                for column in ["Birthdate", "Age at end (yr)", "Age at end (mth)"] {
                    row.push(column, Err(err.clone().into()));
                }
            }
        }

        // Outcomes
        let resolver = session.resolver();
        let hcc_states = [m.exposed_child.clone(), m.pre_art.clone()];
        let outcome = records(&history, patient)
            .map(|spans| resolver.resolve(spans, &hcc_states, ctx.location.as_deref()));
        row.push(
            "Outcome in HCC",
            outcome.clone().map(|o| {
                o.map_or(CellValue::Empty, |o| CellValue::Text(o.resulting_state))
            }),
        );
        row.push(
            "Outcome in HCC change date",
            outcome.map(|o| CellValue::date(o.map(|o| o.transition_date))),
        );

        let latest = records(&history, patient)
            .map(|spans| state_on(spans, end).map(|span| (span.state.clone(), span.start_date)));
        row.push(
            "Most recent outcome",
            latest
                .clone()
                .map(|s| s.map_or(CellValue::Empty, |(state, _)| CellValue::Text(state))),
        );
        row.push(
            "Most recent outcome change date",
            latest.map(|s| CellValue::date(s.map(|(_, date)| date))),
        );

        // CD4
        let cd4 = session.observations(&ObservationQuery::new(m.cd4_count.as_str())).await;
        let recent = records(&cd4, patient).map(|observations| {
            observations
                .iter()
                .filter(|obs| obs.date() <= end)
                .max_by_key(|obs| obs.datetime)
                .cloned()
        });
        row.push(
            "Most recent CD4",
            recent.clone().map(|obs| match obs.map(|o| o.value) {
                Some(ObsValue::Numeric(n)) => CellValue::Number(n),
                Some(other) => CellValue::Text(other.to_string()),
                None => CellValue::Empty,
            }),
        );
        row.push(
            "Most recent CD4 date",
            recent.map(|obs| CellValue::date(obs.map(|o| o.date()))),
        );

        // Visits
        let followups = session.encounters(&m.hcc_followup_encounter_types()).await;
        for (label, nth) in [("1st visit", 0), ("2nd visit", 1)] {
            let visit = records(&followups, patient).map(|encounters| {
                let mut sorted: Vec<&Encounter> = encounters.iter().collect();
                sorted.sort_by_key(|e| e.datetime);
                sorted.get(nth).map(|e| dated(e))
            });
            push_dated(&mut row, label, visit);
        }
        let mut visit_types = vec![m.art_followup.clone()];
        visit_types.extend(m.hcc_followup_encounter_types());
        let visits = session.encounters(&visit_types).await;
        let last = records(&visits, patient).map(|encounters| {
            encounters
                .iter()
                .filter(|e| e.date() <= end)
                .max_by_key(|e| e.datetime)
                .map(dated)
        });
        push_dated(&mut row, "Last visit", last);

        // Enrolment history
        row.push(
            "All enrollments",
            records(&history, patient).map(|spans| {
                CellValue::List(
                    spans
                        .iter()
                        .map(|span| {
                            let at = span.location.as_deref().unwrap_or("unknown location");
                            match span.end_date {
                                Some(until) => format!("{} at {at} ({} - {until})", span.state, span.start_date),
                                None => format!("{} at {at} (since {})", span.state, span.start_date),
                            }
                        })
                        .collect(),
                )
            }),
        );

        row
    }
}
