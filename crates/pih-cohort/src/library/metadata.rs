//! Metadata catalog
//!
//! The names of identifier types, program workflows and their states,
//! encounter types and concepts a deployment knows about. Cohort libraries
//! resolve every name they use against the catalog once, at startup, so a
//! misspelt name fails the build instead of silently matching nobody.

use indexmap::IndexMap;
use pih_cohort_diagnostics::{ConfigError, ConfigResult, MetadataKind};
use pih_cohort_types::StateRef;
use serde::{Deserialize, Serialize};

pub const HIV_PROGRAM: &str = "HIV program";
pub const TREATMENT_STATUS: &str = "Treatment status";

/// Workflows of one program, each with its state names
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgramMetadata {
    pub workflows: IndexMap<String, Vec<String>>,
}

/// Known metadata names
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataCatalog {
    pub identifier_types: Vec<String>,
    pub programs: IndexMap<String, ProgramMetadata>,
    pub encounter_types: Vec<String>,
    pub concepts: Vec<String>,
}

impl MetadataCatalog {
    /// Load a catalog from JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::invalid_catalog(e.to_string()))
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::invalid_catalog(e.to_string()))
    }

    /// The standard names of the PIH Malawi HIV program
    pub fn hiv_defaults() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut workflows = IndexMap::new();
        workflows.insert(
            TREATMENT_STATUS.to_string(),
            names(&[
                "Pre-ART (Continue)",
                "Exposed Child (Continue)",
                "On antiretrovirals",
                "Patient transferred out",
                "Transferred internally",
                "Patient defaulted",
                "Patient died",
                "Treatment stopped",
                "Discharged uninfected",
            ]),
        );
        let mut programs = IndexMap::new();
        programs.insert(HIV_PROGRAM.to_string(), ProgramMetadata { workflows });

        Self {
            identifier_types: names(&[
                "HCC Number",
                "ARV Number",
                "PART Number",
                "Old Identification Number",
            ]),
            programs,
            encounter_types: names(&[
                "ART_INITIAL",
                "ART_FOLLOWUP",
                "PART_INITIAL",
                "PART_FOLLOWUP",
                "EXPOSED_CHILD_INITIAL",
                "EXPOSED_CHILD_FOLLOWUP",
            ]),
            concepts: names(&[
                "Appointment date",
                "Weight (kg)",
                "CD4 count",
                "Clinician reported to CD4",
                "Positive",
                "Negative",
                "Indeterminate",
                "HIV DNA polymerase chain reaction",
                "DNA-PCR Testing Result",
                "DNA-PCR Testing Result 2",
                "DNA-PCR Testing Result 3",
            ]),
        }
    }

    fn lookup(list: &[String], kind: MetadataKind, name: &str) -> ConfigResult<String> {
        list.iter()
            .find(|known| *known == name)
            .cloned()
            .ok_or_else(|| ConfigError::unknown_metadata(kind, name))
    }

    pub fn identifier_type(&self, name: &str) -> ConfigResult<String> {
        Self::lookup(&self.identifier_types, MetadataKind::IdentifierType, name)
    }

    pub fn encounter_type(&self, name: &str) -> ConfigResult<String> {
        Self::lookup(&self.encounter_types, MetadataKind::EncounterType, name)
    }

    pub fn concept(&self, name: &str) -> ConfigResult<String> {
        Self::lookup(&self.concepts, MetadataKind::Concept, name)
    }

    /// Every state of a program workflow, in catalog order
    pub fn workflow_states(&self, program: &str, workflow: &str) -> ConfigResult<Vec<StateRef>> {
        let states = self
            .programs
            .get(program)
            .and_then(|p| p.workflows.get(workflow))
            .ok_or_else(|| {
                ConfigError::unknown_metadata(MetadataKind::Workflow, format!("{program}/{workflow}"))
            })?;
        Ok(states.iter().map(|s| StateRef::new(workflow, s.as_str())).collect())
    }

    pub fn state(&self, program: &str, workflow: &str, state: &str) -> ConfigResult<StateRef> {
        self.workflow_states(program, workflow)?
            .into_iter()
            .find(|s| s.state == state)
            .ok_or_else(|| {
                ConfigError::unknown_metadata(
                    MetadataKind::WorkflowState,
                    format!("{workflow}/{state}"),
                )
            })
    }
}

/// HIV program metadata resolved from a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HivMetadata {
    pub hcc_number: String,
    pub arv_number: String,
    pub old_part_number: String,
    pub old_pre_art_number_old_format: String,

    /// Every state of the treatment status workflow; enrolment in the program
    /// is a span of any of them
    pub treatment_status_states: Vec<StateRef>,
    pub pre_art: StateRef,
    pub exposed_child: StateRef,
    pub on_arvs: StateRef,
    pub transferred_out: StateRef,
    pub transferred_internally: StateRef,
    pub defaulted: StateRef,
    pub died: StateRef,

    pub art_initial: String,
    pub art_followup: String,
    pub pre_art_initial: String,
    pub pre_art_followup: String,
    pub exposed_child_initial: String,
    pub exposed_child_followup: String,

    pub appointment_date: String,
    pub weight: String,
    pub cd4_count: String,
    pub clinician_reported_cd4: String,
    pub positive: String,
    pub negative: String,
    pub indeterminate: String,
    pub hiv_dna_pcr_test: String,
    pub dna_pcr_result: String,
    pub dna_pcr_result_2: String,
    pub dna_pcr_result_3: String,
}

impl HivMetadata {
    /// Resolve every HIV name; the first unknown one is the error
    pub fn resolve(catalog: &MetadataCatalog) -> ConfigResult<Self> {
        let state = |name: &str| catalog.state(HIV_PROGRAM, TREATMENT_STATUS, name);
        Ok(Self {
            hcc_number: catalog.identifier_type("HCC Number")?,
            arv_number: catalog.identifier_type("ARV Number")?,
            old_part_number: catalog.identifier_type("PART Number")?,
            old_pre_art_number_old_format: catalog.identifier_type("Old Identification Number")?,

            treatment_status_states: catalog.workflow_states(HIV_PROGRAM, TREATMENT_STATUS)?,
            pre_art: state("Pre-ART (Continue)")?,
            exposed_child: state("Exposed Child (Continue)")?,
            on_arvs: state("On antiretrovirals")?,
            transferred_out: state("Patient transferred out")?,
            transferred_internally: state("Transferred internally")?,
            defaulted: state("Patient defaulted")?,
            died: state("Patient died")?,

            art_initial: catalog.encounter_type("ART_INITIAL")?,
            art_followup: catalog.encounter_type("ART_FOLLOWUP")?,
            pre_art_initial: catalog.encounter_type("PART_INITIAL")?,
            pre_art_followup: catalog.encounter_type("PART_FOLLOWUP")?,
            exposed_child_initial: catalog.encounter_type("EXPOSED_CHILD_INITIAL")?,
            exposed_child_followup: catalog.encounter_type("EXPOSED_CHILD_FOLLOWUP")?,

            appointment_date: catalog.concept("Appointment date")?,
            weight: catalog.concept("Weight (kg)")?,
            cd4_count: catalog.concept("CD4 count")?,
            clinician_reported_cd4: catalog.concept("Clinician reported to CD4")?,
            positive: catalog.concept("Positive")?,
            negative: catalog.concept("Negative")?,
            indeterminate: catalog.concept("Indeterminate")?,
            hiv_dna_pcr_test: catalog.concept("HIV DNA polymerase chain reaction")?,
            dna_pcr_result: catalog.concept("DNA-PCR Testing Result")?,
            dna_pcr_result_2: catalog.concept("DNA-PCR Testing Result 2")?,
            dna_pcr_result_3: catalog.concept("DNA-PCR Testing Result 3")?,
        })
    }

    /// Pre-ART initial and follow-up
    pub fn pre_art_encounter_types(&self) -> Vec<String> {
        vec![self.pre_art_initial.clone(), self.pre_art_followup.clone()]
    }

    /// ART initial and follow-up
    pub fn art_encounter_types(&self) -> Vec<String> {
        vec![self.art_initial.clone(), self.art_followup.clone()]
    }

    pub fn exposed_child_encounter_types(&self) -> Vec<String> {
        vec![
            self.exposed_child_initial.clone(),
            self.exposed_child_followup.clone(),
        ]
    }

    /// Every HIV encounter type
    pub fn hiv_encounter_types(&self) -> Vec<String> {
        let mut types = self.art_encounter_types();
        types.extend(self.pre_art_encounter_types());
        types.extend(self.exposed_child_encounter_types());
        types
    }

    /// Follow-up encounters of pre-ART and exposed children
    pub fn hcc_followup_encounter_types(&self) -> Vec<String> {
        vec![
            self.pre_art_followup.clone(),
            self.exposed_child_followup.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_resolve() {
        let hiv = HivMetadata::resolve(&MetadataCatalog::hiv_defaults()).unwrap();
        assert_eq!(hiv.pre_art, StateRef::new(TREATMENT_STATUS, "Pre-ART (Continue)"));
        assert_eq!(hiv.treatment_status_states.len(), 9);
        assert_eq!(hiv.hiv_encounter_types().len(), 6);
        assert_eq!(
            hiv.pre_art_encounter_types(),
            vec!["PART_INITIAL".to_string(), "PART_FOLLOWUP".to_string()]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = MetadataCatalog::hiv_defaults();
        let json = catalog.to_json().unwrap();
        assert_eq!(MetadataCatalog::from_json(&json).unwrap(), catalog);
    }

    #[test]
    fn test_missing_name_is_reported() {
        let mut catalog = MetadataCatalog::hiv_defaults();
        catalog.concepts.retain(|c| c != "CD4 count");

        let err = HivMetadata::resolve(&catalog).unwrap_err();
        assert_eq!(
            err,
            ConfigError::unknown_metadata(MetadataKind::Concept, "CD4 count")
        );
    }

    #[test]
    fn test_missing_state_is_reported() {
        let mut catalog = MetadataCatalog::hiv_defaults();
        for program in catalog.programs.values_mut() {
            for states in program.workflows.values_mut() {
                states.retain(|s| s != "Patient died");
            }
        }
        let err = HivMetadata::resolve(&catalog).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownMetadata {
                kind: MetadataKind::WorkflowState,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_json() {
        let err = MetadataCatalog::from_json("{\"concepts\": 3}").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCatalog { .. }));

        // missing sections default to empty
        let empty = MetadataCatalog::from_json("{}").unwrap();
        assert!(empty.concepts.is_empty());
        assert!(HivMetadata::resolve(&empty).is_err());
    }
}
