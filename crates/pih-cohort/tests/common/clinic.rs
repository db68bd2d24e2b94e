//! HIV clinic fixture
//!
//! | patient | born       | treatment status                                                         |
//! |---------|------------|--------------------------------------------------------------------------|
//! | 1       | 2018-01-01 | pre-ART @Neno 2020-01-10..04-01, on ART @Neno from 2020-04-01             |
//! | 2       | 1985-03-15 | pre-ART @Neno 2019-05-01..2020-02-20, transferred out @Neno from 02-20    |
//! | 3       | 2019-12-20 | exposed child @Neno from 2020-01-05                                      |
//! | 4       | 1970-07-07 | pre-ART @Neno 2019-01-01..2020-05-15, died @Neno from 2020-05-15          |
//! | 5       | 1990-01-01 | on ART @Lisungwi from 2018-01-01                                         |

use chrono::{NaiveDate, NaiveDateTime};
use pih_cohort::library::metadata::TREATMENT_STATUS;
use pih_cohort::model::InMemoryStore;
use pih_cohort::types::{
    Encounter, Identifier, ObsValue, Observation, Patient, StateRef, StateSpan,
};
use pih_cohort::{EvaluationContext, HivMetadata, MetadataCatalog, PatientSet};

pub const NENO: &str = "Neno";
pub const LISUNGWI: &str = "Lisungwi";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, 0, 0).unwrap()
}

pub fn patients(ids: &[u64]) -> PatientSet {
    ids.iter().copied().collect()
}

pub fn everyone() -> PatientSet {
    patients(&[1, 2, 3, 4, 5])
}

pub fn metadata() -> HivMetadata {
    HivMetadata::resolve(&MetadataCatalog::hiv_defaults()).unwrap()
}

/// First half of 2020 at Neno
pub fn neno_h1_2020() -> EvaluationContext {
    EvaluationContext::new(date(2020, 1, 1), date(2020, 6, 30)).with_location(NENO)
}

fn state(name: &str) -> StateRef {
    StateRef::new(TREATMENT_STATUS, name)
}

fn span(patient: u64, name: &str, loc: &str, start: NaiveDate, end: Option<NaiveDate>) -> StateSpan {
    StateSpan::new(patient, &state(name), Some(loc), start, end)
}

fn encounter(id: u64, patient: u64, kind: &str, loc: &str, datetime: NaiveDateTime) -> Encounter {
    Encounter {
        encounter_id: id,
        patient_id: patient,
        encounter_type: kind.to_string(),
        location: Some(loc.to_string()),
        datetime,
    }
}

fn obs(patient: u64, concept: &str, kind: Option<&str>, loc: &str, value: ObsValue, datetime: NaiveDateTime) -> Observation {
    Observation {
        patient_id: patient,
        concept: concept.to_string(),
        encounter_type: kind.map(str::to_string),
        location: Some(loc.to_string()),
        value,
        datetime,
    }
}

pub fn clinic() -> InMemoryStore {
    let store = InMemoryStore::new();

    store.add_patient(Patient::new(1, Some(date(2018, 1, 1))));
    store.add_patient(Patient::new(2, Some(date(1985, 3, 15))));
    store.add_patient(Patient::new(3, Some(date(2019, 12, 20))));
    store.add_patient(Patient::new(4, Some(date(1970, 7, 7))));
    store.add_patient(Patient::new(5, Some(date(1990, 1, 1))));

    store.add_state_span(span(1, "Pre-ART (Continue)", NENO, date(2020, 1, 10), Some(date(2020, 4, 1))));
    store.add_state_span(span(1, "On antiretrovirals", NENO, date(2020, 4, 1), None));
    store.add_state_span(span(2, "Pre-ART (Continue)", NENO, date(2019, 5, 1), Some(date(2020, 2, 20))));
    store.add_state_span(span(2, "Patient transferred out", NENO, date(2020, 2, 20), None));
    store.add_state_span(span(3, "Exposed Child (Continue)", NENO, date(2020, 1, 5), None));
    store.add_state_span(span(4, "Pre-ART (Continue)", NENO, date(2019, 1, 1), Some(date(2020, 5, 15))));
    store.add_state_span(span(4, "Patient died", NENO, date(2020, 5, 15), None));
    store.add_state_span(span(5, "On antiretrovirals", LISUNGWI, date(2018, 1, 1), None));

    store.add_identifier(Identifier::new(1, "HCC Number", "NNO 1 HCC", Some(NENO)));
    store.add_identifier(Identifier::new(1, "ARV Number", "NNO 11", Some(NENO)));
    store.add_identifier(Identifier::new(2, "HCC Number", "NNO 2 HCC", Some(NENO)));
    store.add_identifier(Identifier::new(3, "HCC Number", "NNO 3 HCC", Some(NENO)));
    store.add_identifier(Identifier::new(4, "HCC Number", "NNO 4 HCC", Some(NENO)));
    store.add_identifier(Identifier::new(5, "ARV Number", "LSI 5", Some(LISUNGWI)));

    store.add_encounter(encounter(100, 1, "PART_INITIAL", NENO, at(2020, 1, 10, 9)));
    store.add_encounter(encounter(101, 1, "PART_FOLLOWUP", NENO, at(2020, 2, 10, 9)));
    store.add_encounter(encounter(102, 1, "PART_FOLLOWUP", NENO, at(2020, 3, 10, 9)));
    store.add_encounter(encounter(103, 1, "ART_INITIAL", NENO, at(2020, 4, 1, 9)));
    store.add_encounter(encounter(104, 1, "ART_FOLLOWUP", NENO, at(2020, 5, 1, 9)));
    store.add_encounter(encounter(200, 2, "PART_INITIAL", NENO, at(2019, 5, 1, 10)));
    store.add_encounter(encounter(201, 2, "PART_FOLLOWUP", NENO, at(2020, 1, 15, 10)));
    store.add_encounter(encounter(300, 3, "EXPOSED_CHILD_INITIAL", NENO, at(2020, 1, 5, 11)));
    store.add_encounter(encounter(500, 5, "ART_FOLLOWUP", LISUNGWI, at(2020, 3, 1, 8)));

    store.add_observation(obs(1, "CD4 count", Some("PART_FOLLOWUP"), NENO, ObsValue::Numeric(350.into()), at(2020, 3, 10, 9)));
    store.add_observation(obs(1, "Appointment date", Some("ART_FOLLOWUP"), NENO, ObsValue::Text("2020-06-01".into()), at(2020, 5, 1, 9)));
    store.add_observation(obs(1, "Weight (kg)", Some("PART_FOLLOWUP"), NENO, ObsValue::Numeric(13.into()), at(2020, 2, 10, 9)));
    store.add_observation(obs(3, "DNA-PCR Testing Result", None, NENO, ObsValue::Coded("Positive".into()), at(2020, 3, 1, 8)));
    store.add_observation(obs(5, "Appointment date", Some("ART_FOLLOWUP"), LISUNGWI, ObsValue::Text("2020-04-01".into()), at(2020, 3, 1, 8)));

    store
}
