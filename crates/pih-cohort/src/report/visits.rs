//! HIV visits datasets
//!
//! One row per encounter of a type within the reporting period, with the
//! patient's identifiers and age at the encounter.

use super::row::{CellValue, FieldResult, Row};
use crate::library::HivMetadata;
use pih_cohort_eval::temporal::age_at;
use pih_cohort_eval::{EvalResult, EvaluationSession};
use pih_cohort_types::{AgeUnit, Encounter, EvaluationContext};

/// Encounters of one type, with identifiers of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitsDataset {
    pub key: String,
    pub encounter_type: String,
    pub identifier_type: String,
}

impl VisitsDataset {
    pub fn new(
        key: impl Into<String>,
        encounter_type: impl Into<String>,
        identifier_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            encounter_type: encounter_type.into(),
            identifier_type: identifier_type.into(),
        }
    }

    /// The six datasets of the HIV visits report
    pub fn hiv_visits(m: &HivMetadata) -> Vec<Self> {
        vec![
            Self::new("art_initial", &m.art_initial, &m.arv_number),
            Self::new("art_followup", &m.art_followup, &m.arv_number),
            Self::new("part_initial", &m.pre_art_initial, &m.hcc_number),
            Self::new("part_followup", &m.pre_art_followup, &m.hcc_number),
            Self::new("exposed_child_initial", &m.exposed_child_initial, &m.hcc_number),
            Self::new("exposed_child_followup", &m.exposed_child_followup, &m.hcc_number),
        ]
    }

    /// Rows for every population encounter dated within `[start, end]`
    ///
    /// Ordered by encounter datetime, then id. Failing to fetch the encounters
    /// fails the dataset; identifier and birth date failures only fail their
    /// columns.
    pub async fn evaluate(&self, session: &EvaluationSession, ctx: &EvaluationContext) -> EvalResult<Vec<Row>> {
        let index = session.encounters(std::slice::from_ref(&self.encounter_type)).await?;
        let mut encounters: Vec<&Encounter> = index
            .iter()
            .filter(|(pid, _)| session.population().contains(*pid))
            .flat_map(|(_, encounters)| encounters)
            .filter(|e| ctx.start_date <= e.date() && e.date() <= ctx.end_date)
            .collect();
        encounters.sort_by_key(|e| (e.datetime, e.encounter_id));

        let identifiers = session
            .identifiers(std::slice::from_ref(&self.identifier_type), None)
            .await;
        let births = session.birth_dates().await;

        let rows: Vec<Row> = encounters
            .into_iter()
            .map(|encounter| {
                let mut row = Row::new();
                let pid = encounter.patient_id;
                row.push("ENCOUNTER_ID", CellValue::id(encounter.encounter_id));
                row.push("ENCOUNTER_DATETIME", Ok(CellValue::DateTime(encounter.datetime)));
                row.push(
                    "LOCATION",
                    Ok(encounter
                        .location
                        .clone()
                        .map_or(CellValue::Empty, CellValue::Text)),
                );
                row.push("INTERNAL_PATIENT_ID", CellValue::id(pid));
                row.push(
                    self.identifier_type.as_str(),
                    identifiers
                        .as_ref()
                        .map(|index| {
                            CellValue::List(
                                index
                                    .get(&pid)
                                    .into_iter()
                                    .flatten()
                                    .map(|id| id.value.clone())
                                    .collect(),
                            )
                        })
                        .map_err(|e| e.clone().into()),
                );

                let birth = births.as_ref().map(|b| b.get(&pid).copied()).map_err(Clone::clone);
                let age = |unit: AgeUnit| -> FieldResult {
                    let birth = birth.clone()?;
                    Ok(birth
                        .and_then(|b| age_at(b, encounter.date(), unit))
                        .map_or(CellValue::Empty, |a| CellValue::Integer(i64::from(a))))
                };
                row.push("Birthdate", birth.clone().map(CellValue::date).map_err(Into::into));
                row.push("Age at encounter (yr)", age(AgeUnit::Years));
                row.push("Age at encounter (mth)", age(AgeUnit::Months));
                row
            })
            .collect();

        log::debug!("visits dataset '{}': {} rows", self.key, rows.len());
        Ok(rows)
    }
}
