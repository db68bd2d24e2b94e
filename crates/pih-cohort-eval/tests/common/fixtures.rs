//! Fixture data: five patients at two locations
//!
//! | patient | born       | history                                                      |
//! |---------|------------|--------------------------------------------------------------|
//! | 1       | 2018-01-01 | pre-ART @Neno 2020-01-01..2020-06-01, on ART @Neno from 06-01 |
//! | 2       | 1990-05-05 | on ART @Lisungwi from 2019-03-01                             |
//! | 3       | unknown    | pre-ART @Neno 2019-06-01..2020-02-01, died @Neno 2020-02-01   |
//! | 4       | 2020-01-10 | exposed child @Neno from 2020-02-15                          |
//! | 5       | 2000-01-01 | no program history, one pre-ART follow-up encounter          |

use chrono::{NaiveDate, NaiveDateTime};
use pih_cohort_model::InMemoryStore;
use pih_cohort_types::{
    Encounter, EvaluationContext, Identifier, ObsValue, Observation, Patient, PatientSet,
    StateRef, StateSpan,
};

pub const WORKFLOW: &str = "Treatment status";
pub const NENO: &str = "Neno";
pub const LISUNGWI: &str = "Lisungwi";
pub const HCC_NUMBER: &str = "HCC Number";
pub const ARV_NUMBER: &str = "ARV Number";
pub const ART_FOLLOWUP: &str = "ART_FOLLOWUP";
pub const PART_INITIAL: &str = "PART_INITIAL";
pub const PART_FOLLOWUP: &str = "PART_FOLLOWUP";
pub const APPOINTMENT_DATE: &str = "Appointment date";
pub const PCR_RESULT: &str = "DNA-PCR Testing Result";
pub const WEIGHT: &str = "Weight (kg)";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, 0, 0).unwrap()
}

pub fn pre_art() -> StateRef {
    StateRef::new(WORKFLOW, "Pre-ART (Continue)")
}

pub fn on_art() -> StateRef {
    StateRef::new(WORKFLOW, "On antiretrovirals")
}

pub fn died() -> StateRef {
    StateRef::new(WORKFLOW, "Patient died")
}

pub fn exposed_child() -> StateRef {
    StateRef::new(WORKFLOW, "Exposed Child (Continue)")
}

pub fn patients(ids: &[u64]) -> PatientSet {
    ids.iter().copied().collect()
}

pub fn everyone() -> PatientSet {
    patients(&[1, 2, 3, 4, 5])
}

/// First half of 2020 at Neno
pub fn neno_h1_2020() -> EvaluationContext {
    EvaluationContext::new(date(2020, 1, 1), date(2020, 6, 30)).with_location(NENO)
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
    store.add_patient(Patient::new(2, Some(date(1990, 5, 5))));
    store.add_patient(Patient::new(3, None));
    store.add_patient(Patient::new(4, Some(date(2020, 1, 10))));
    store.add_patient(Patient::new(5, Some(date(2000, 1, 1))));

    store.add_state_span(StateSpan::new(1, &pre_art(), Some(NENO), date(2020, 1, 1), Some(date(2020, 6, 1))));
    store.add_state_span(StateSpan::new(1, &on_art(), Some(NENO), date(2020, 6, 1), None));
    store.add_state_span(StateSpan::new(2, &on_art(), Some(LISUNGWI), date(2019, 3, 1), None));
    store.add_state_span(StateSpan::new(3, &pre_art(), Some(NENO), date(2019, 6, 1), Some(date(2020, 2, 1))));
    store.add_state_span(StateSpan::new(3, &died(), Some(NENO), date(2020, 2, 1), None));
    store.add_state_span(StateSpan::new(4, &exposed_child(), Some(NENO), date(2020, 2, 15), None));

    store.add_identifier(Identifier::new(1, HCC_NUMBER, "NNO 1 HCC", Some(NENO)));
    store.add_identifier(Identifier::new(2, ARV_NUMBER, "LSI 2", Some(LISUNGWI)));
    store.add_identifier(Identifier::new(3, HCC_NUMBER, "NNO 3 HCC", Some(NENO)));
    store.add_identifier(Identifier::new(4, HCC_NUMBER, "NNO 4 HCC", Some(NENO)));

    store.add_encounter(encounter(10, 1, PART_INITIAL, NENO, at(2020, 1, 1, 9)));
    store.add_encounter(encounter(11, 1, ART_FOLLOWUP, NENO, at(2020, 6, 15, 10)));
    store.add_encounter(encounter(12, 2, ART_FOLLOWUP, LISUNGWI, at(2019, 12, 31, 14)));
    store.add_encounter(encounter(13, 5, PART_FOLLOWUP, NENO, at(2020, 6, 30, 23)));

    store.add_observation(obs(1, APPOINTMENT_DATE, Some(ART_FOLLOWUP), NENO, ObsValue::Text("2020-07-15".into()), at(2020, 6, 15, 10)));
    store.add_observation(obs(2, APPOINTMENT_DATE, Some(ART_FOLLOWUP), LISUNGWI, ObsValue::Text("2020-05-29".into()), at(2020, 5, 1, 9)));
    store.add_observation(obs(2, APPOINTMENT_DATE, Some(ART_FOLLOWUP), LISUNGWI, ObsValue::Text("2020-08-01".into()), at(2020, 7, 20, 9)));
    store.add_observation(obs(4, PCR_RESULT, None, NENO, ObsValue::Coded("Negative".into()), at(2020, 3, 1, 8)));
    store.add_observation(obs(1, WEIGHT, Some(PART_FOLLOWUP), NENO, ObsValue::Numeric(12.into()), at(2020, 3, 1, 8)));

    store
}
