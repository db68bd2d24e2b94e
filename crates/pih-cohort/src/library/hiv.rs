//! HIV cohort definition library
//!
//! Every documented HIV cohort of the PIH Malawi reports, registered under
//! [`HIV_PREFIX`]. Definitions that appear inside others are built once and
//! shared, so a report evaluating several of them in one session computes the
//! shared parts once.

use super::metadata::HivMetadata;
use super::registry::{CohortRegistry, HIV_PREFIX};
use pih_cohort_diagnostics::ConfigResult;
use pih_cohort_eval::predicates::{
    active_in_multiple_states_at_location_on_end_date, active_in_state_at_location_num_months_before_end_date,
    active_in_state_at_location_on_end_date, any_encounter_of_types_before_start_date,
    any_encounter_of_types_by_end_date, any_encounter_of_types_during_period,
    any_encounter_of_types_within_months_by_end_date, currently_in_state_on_end_date,
    ever_enrolled_in_state_at_location_by_end_date, ever_enrolled_in_states_by_end_date,
    ever_in_state_by_end_date, patient_composition, patients_in_all, patients_in_any,
    patients_whose_most_recent_obs_date_is_older_than_value_at_location_by_end_date,
    patients_with_any_obs_during_period, patients_with_any_obs_within_months_by_end_date,
    patients_with_coded_obs_by_end_date, patients_with_identifier_of_type,
    started_in_state_at_location_during_period, started_in_states_during_period,
    started_state_when_in_age_range_at_location_by_end_date,
};
use pih_cohort_eval::{CohortRef, Composition};
use pih_cohort_types::{Age, LocationScope, StateRef};

fn here() -> LocationScope {
    LocationScope::FromContext
}

/// The HIV cohort library
#[derive(Debug, Clone)]
pub struct HivCohortLibrary {
    metadata: HivMetadata,
    registry: CohortRegistry,
}

impl HivCohortLibrary {
    /// Build and register every documented definition
    pub fn build(metadata: &HivMetadata) -> ConfigResult<Self> {
        let m = metadata;
        let mut r = CohortRegistry::new(HIV_PREFIX);

        // Identifiers
        let hcc_here = patients_with_identifier_of_type([&m.hcc_number], here())?;
        r.register(
            "hasAnHccNumber",
            patients_with_identifier_of_type([&m.hcc_number], LocationScope::Any)?,
        )?;
        r.register("hasAnHccNumberAtLocation", hcc_here.clone())?;
        r.register(
            "hasAnArvNumber",
            patients_with_identifier_of_type([&m.arv_number], LocationScope::Any)?,
        )?;
        r.register(
            "hasAnyPreArvNumber",
            patients_with_identifier_of_type(
                [&m.hcc_number, &m.old_part_number, &m.old_pre_art_number_old_format],
                LocationScope::Any,
            )?,
        )?;

        // Program enrolment
        let program = m.treatment_status_states.clone();
        r.register(
            "enrolledInHivProgramByEndDate",
            ever_enrolled_in_states_by_end_date(program.clone(), LocationScope::Any)?,
        )?;
        r.register(
            "activelyEnrolledInHivProgramOnEndDate",
            active_in_multiple_states_at_location_on_end_date(program.clone(), here())?,
        )?;
        r.register(
            "enrolledInHivProgramDuringPeriod",
            started_in_states_during_period(program, LocationScope::Any)?,
        )?;

        // Pre-ART and exposed children
        let started_pre_art_in_period = patients_in_all(vec![
            started_in_state_at_location_during_period(m.pre_art.clone(), here())?,
            hcc_here.clone(),
        ])?;
        let started_pre_art_by_end = patients_in_all(vec![
            ever_enrolled_in_state_at_location_by_end_date(m.pre_art.clone(), here())?,
            hcc_here.clone(),
        ])?;
        r.register("startedPreArtWithHccNumberAtLocationInPeriod", started_pre_art_in_period)?;
        r.register(
            "startedPreArtWithHccNumberAtLocationByEndDate",
            started_pre_art_by_end.clone(),
        )?;
        r.register(
            "inPreArtOrExposedChildStateWithHccNumberAtLocationOnEndDate",
            patients_in_all(vec![
                active_in_multiple_states_at_location_on_end_date(
                    vec![m.pre_art.clone(), m.exposed_child.clone()],
                    here(),
                )?,
                hcc_here.clone(),
            ])?,
        )?;
        r.register(
            "inPreArtStateWithHccNumberAtLocationOnEndDate",
            patients_in_all(vec![
                active_in_state_at_location_on_end_date(m.pre_art.clone(), here())?,
                hcc_here.clone(),
            ])?,
        )?;
        r.register(
            "startedExposedChildWithHccNumberAtLocationByEndDate",
            patients_in_all(vec![
                ever_enrolled_in_state_at_location_by_end_date(m.exposed_child.clone(), here())?,
                hcc_here.clone(),
            ])?,
        )?;
        r.register(
            "startedExposedChildWithHccNumberAtLocationInPeriod",
            patients_in_all(vec![
                started_in_state_at_location_during_period(m.exposed_child.clone(), here())?,
                hcc_here,
            ])?,
        )?;

        // ART
        let ever_art = ever_enrolled_in_state_at_location_by_end_date(m.on_arvs.clone(), here())?;
        let started_art = started_in_state_at_location_during_period(m.on_arvs.clone(), here())?;
        let on_art = active_in_state_at_location_on_end_date(m.on_arvs.clone(), here())?;
        r.register("everEnrolledInArtAtLocationByEndDate", ever_art.clone())?;
        r.register("startedOnArtStateAtLocationDuringPeriod", started_art.clone())?;
        r.register("inOnArtStateAtLocationOnEndDate", on_art.clone())?;

        // Transfers and transitions
        let transferred_out = active_in_state_at_location_on_end_date(m.transferred_out.clone(), here())?;
        let died = active_in_state_at_location_on_end_date(m.died.clone(), here())?;
        r.register("inTransferredOutAtLocationOnEndDate", transferred_out.clone())?;
        r.register(
            "inTransferredInternallyAtLocationOnEndDate",
            active_in_state_at_location_on_end_date(m.transferred_internally.clone(), here())?,
        )?;
        r.register(
            "transitionedFromPreArtToArtAtLocationDuringPeriod",
            patients_in_all(vec![started_pre_art_by_end.clone(), started_art])?,
        )?;
        r.register(
            "transitionedFromPreArtToArtAtLocationByEnd",
            patients_in_all(vec![started_pre_art_by_end.clone(), ever_art.clone()])?,
        )?;
        r.register(
            "transferredOutOfPreArtAtLocationByEnd",
            patient_composition(
                Composition::start(started_pre_art_by_end.clone())
                    .and(transferred_out)
                    .and_not(ever_art.clone()),
            )?,
        )?;
        r.register(
            "diedWhilePreArtAtLocationByEnd",
            patient_composition(
                Composition::start(started_pre_art_by_end)
                    .and(died.clone())
                    .and_not(ever_art.clone()),
            )?,
        )?;

        // Missed appointments
        let overdue = |types: Vec<String>, threshold: &str| {
            patients_whose_most_recent_obs_date_is_older_than_value_at_location_by_end_date(
                m.appointment_date.as_str(),
                types,
                threshold,
                here(),
            )
        };
        r.register(
            "inArtAndLastAppointmentDate3WeeksOrMoreByEndDate",
            patients_in_all(vec![on_art.clone(), overdue(vec![m.art_followup.clone()], "3w")?])?,
        )?;
        r.register(
            "inArtAndLastAppointmentDate2MonthsOrMoreByEndDate",
            patients_in_all(vec![on_art, overdue(vec![m.art_followup.clone()], "2m")?])?,
        )?;
        r.register(
            "lastPreArtOrExposedAppointmentDate8weeksOrMoreByEndDate",
            overdue(m.hcc_followup_encounter_types(), "8w")?,
        )?;

        // Defaulted and died
        let defaulted_during = started_in_state_at_location_during_period(m.defaulted.clone(), here())?;
        let defaulted_at_end = active_in_state_at_location_on_end_date(m.defaulted.clone(), here())?;
        r.register("startedDefaultedStateAtLocationDuringPeriod", defaulted_during.clone())?;
        r.register("inDefaultedStateAtLocationOnEndDate", defaulted_at_end.clone())?;
        r.register(
            "everArtDefaultedDuringPeriodAndStillDefaultedOnEndDate",
            patients_in_all(vec![ever_art, defaulted_during, defaulted_at_end])?,
        )?;
        r.register(
            "startedDiedStateAtLocationDuringPeriod",
            started_in_state_at_location_during_period(m.died.clone(), here())?,
        )?;
        r.register("inDiedStateAtLocationOnEndDate", died)?;

        // Encounters
        register_encounter_windows(&mut r, "PreArt", &m.pre_art_encounter_types())?;
        r.register(
            "hadPreArtInitialEncounterByEndDate",
            any_encounter_of_types_by_end_date([&m.pre_art_initial])?,
        )?;
        r.register(
            "hadPreArtFollowupEncounterByEndDate",
            any_encounter_of_types_by_end_date([&m.pre_art_followup])?,
        )?;
        register_encounter_windows(&mut r, "Art", &m.art_encounter_types())?;
        r.register(
            "hadArtInitialEncounterByEndDate",
            any_encounter_of_types_by_end_date([&m.art_initial])?,
        )?;
        r.register(
            "hadArtFollowupEncounterByEndDate",
            any_encounter_of_types_by_end_date([&m.art_followup])?,
        )?;
        register_encounter_windows(&mut r, "Hiv", &m.hiv_encounter_types())?;

        // State on end date, at any location
        for (name, state) in [
            ("ExposedChild", &m.exposed_child),
            ("PreArt", &m.pre_art),
            ("OnArvs", &m.on_arvs),
        ] {
            r.register(
                &format!("in{name}StateOnEndDate"),
                currently_in_state_on_end_date(state.clone())?,
            )?;
        }
        for (name, state) in [
            ("ExposedChild", &m.exposed_child),
            ("PreArt", &m.pre_art),
            ("OnArvs", &m.on_arvs),
        ] {
            r.register(
                &format!("everIn{name}StateByEndDate"),
                ever_in_state_by_end_date(state.clone())?,
            )?;
        }

        // Age at state start
        for (name, state) in [("PreArt", &m.pre_art), ("ExposedChild", &m.exposed_child)] {
            register_age_bands(&mut r, name, state)?;
        }

        // Observations
        r.register(
            "hadWeightAtHivEncounterDuringPeriod",
            patients_with_any_obs_during_period(m.weight.as_str(), m.hiv_encounter_types())?,
        )?;
        let results = [&m.positive, &m.negative, &m.indeterminate];
        r.register(
            "hasPcrTestResultByEndDate",
            patients_in_any(vec![
                patients_with_coded_obs_by_end_date(m.hiv_dna_pcr_test.as_str(), results)?,
                patients_with_coded_obs_by_end_date(m.dna_pcr_result.as_str(), results)?,
                patients_with_coded_obs_by_end_date(m.dna_pcr_result_2.as_str(), results)?,
                patients_with_coded_obs_by_end_date(m.dna_pcr_result_3.as_str(), results)?,
            ])?,
        )?;

        log::info!("built HIV cohort library with {} definitions", r.len());
        Ok(Self {
            metadata: metadata.clone(),
            registry: r,
        })
    }

    pub fn metadata(&self) -> &HivMetadata {
        &self.metadata
    }

    pub fn registry(&self) -> &CohortRegistry {
        &self.registry
    }

    /// A registered definition by full or short key
    pub fn get(&self, key: &str) -> ConfigResult<CohortRef> {
        self.registry.get(key).cloned()
    }

    /// Died at the location within `months` before the end date
    ///
    /// In the died state on the end date but not `months` earlier.
    pub fn died_at_location_within_months(&self, months: u32) -> ConfigResult<CohortRef> {
        let died_at_end = self.get("inDiedStateAtLocationOnEndDate")?;
        let died_before = active_in_state_at_location_num_months_before_end_date(
            self.metadata.died.clone(),
            here(),
            months,
        )?;
        patient_composition(Composition::start(died_at_end).and_not(died_before))
    }

    pub fn pre_art_encounter_within_months(&self, months: u32) -> ConfigResult<CohortRef> {
        any_encounter_of_types_within_months_by_end_date(self.metadata.pre_art_encounter_types(), months)
    }

    pub fn art_encounter_within_months(&self, months: u32) -> ConfigResult<CohortRef> {
        any_encounter_of_types_within_months_by_end_date(self.metadata.art_encounter_types(), months)
    }

    /// CD4 measured in the lab or reported by a clinician
    pub fn cd4_recorded_within_months(&self, months: u32) -> ConfigResult<CohortRef> {
        patients_in_any(vec![
            self.cd4_measured_in_lab_within_months(months)?,
            patients_with_any_obs_within_months_by_end_date(
                self.metadata.clinician_reported_cd4.as_str(),
                months,
            )?,
        ])
    }

    pub fn cd4_measured_in_lab_within_months(&self, months: u32) -> ConfigResult<CohortRef> {
        patients_with_any_obs_within_months_by_end_date(self.metadata.cd4_count.as_str(), months)
    }
}

/// Before start date, during period and by end date
fn register_encounter_windows(r: &mut CohortRegistry, group: &str, types: &[String]) -> ConfigResult<()> {
    r.register(
        &format!("had{group}EncounterBeforeStartDate"),
        any_encounter_of_types_before_start_date(types)?,
    )?;
    r.register(
        &format!("had{group}EncounterDuringPeriod"),
        any_encounter_of_types_during_period(types)?,
    )?;
    r.register(
        &format!("had{group}EncounterByEndDate"),
        any_encounter_of_types_by_end_date(types)?,
    )
}

/// 0-1 months, 2-23 months, 2-14 years and 15 years up, at state start
fn register_age_bands(r: &mut CohortRegistry, name: &str, state: &StateRef) -> ConfigResult<()> {
    let bands = [
        ("0to1MonthsOld", None, Some(Age::months(1))),
        ("2to23MonthsOld", Some(Age::months(2)), Some(Age::months(23))),
        ("2to14YearsOld", Some(Age::years(2)), Some(Age::years(14))),
        ("15YearsUp", Some(Age::years(15)), None),
    ];
    for (band, min, max) in bands {
        r.register(
            &format!("{band}At{name}StateStartAtLocationByEndDate"),
            started_state_when_in_age_range_at_location_by_end_date(state.clone(), here(), min, max)?,
        )?;
    }
    Ok(())
}
