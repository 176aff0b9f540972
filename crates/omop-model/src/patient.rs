//! Harmonized patient data.
//!
//! A [`Patient`] is produced by the harmonization collaborator and consumed
//! read-only here. Serde field names are the attribute names used in field
//! paths.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::c30::C30;
use crate::record::{Field, Record};

/// All data harmonized for a single trial patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Trial-local patient identifier; unique within one run.
    pub patient_id: String,
    #[serde(default)]
    pub trial_id: String,

    // scalars
    pub cohort_name: Option<String>,
    pub age: Option<i64>,
    /// Required for a `person` row; patients without it are skipped.
    pub date_of_birth: Option<NaiveDate>,
    /// Local sex code, resolved through the static `sex` value set.
    pub sex: Option<String>,
    pub evaluable_for_efficacy_analysis: Option<bool>,
    /// Start of the observation period.
    pub treatment_start_date: Option<NaiveDate>,
    /// End of the observation period.
    pub treatment_end_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub end_of_treatment_reason: Option<String>,

    // singletons
    pub tumor_type: Option<TumorType>,
    pub study_drugs: Option<StudyDrugs>,
    pub biomarkers: Option<Biomarkers>,
    pub ecog_baseline: Option<EcogBaseline>,
    /// Dates the baseline visit.
    pub tumor_assessment_baseline: Option<TumorAssessmentBaseline>,
    pub best_overall_response: Option<BestOverallResponse>,

    // collections
    /// Dated terms become `condition_occurrence` rows.
    #[serde(default)]
    pub medical_histories: Vec<MedicalHistory>,
    #[serde(default)]
    pub previous_treatments: Vec<PreviousTreatment>,
    #[serde(default)]
    pub concomitant_medications: Vec<ConcomitantMedication>,
    /// Dated terms become `condition_occurrence` rows.
    #[serde(default)]
    pub adverse_events: Vec<AdverseEvent>,
    /// Follow-up assessments; each distinct `event_id` is one visit.
    #[serde(default)]
    pub tumor_assessments: Vec<TumorAssessment>,
    /// QLQ-C30 questionnaires in the order they were recorded.
    #[serde(default)]
    pub c30: Vec<C30>,
}

impl Patient {
    /// A patient with only identifiers set.
    pub fn new(patient_id: impl Into<String>, trial_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            trial_id: trial_id.into(),
            ..Self::default()
        }
    }
}

impl Record for Patient {
    fn record_name(&self) -> &'static str {
        "Patient"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "patient_id" => Field::Text(&self.patient_id),
            "trial_id" => Field::Text(&self.trial_id),
            "cohort_name" => Field::text(&self.cohort_name),
            "age" => Field::int(self.age),
            "date_of_birth" => Field::date(self.date_of_birth),
            "sex" => Field::text(&self.sex),
            "evaluable_for_efficacy_analysis" => Field::bool(self.evaluable_for_efficacy_analysis),
            "treatment_start_date" => Field::date(self.treatment_start_date),
            "treatment_end_date" => Field::date(self.treatment_end_date),
            "date_of_death" => Field::date(self.date_of_death),
            "end_of_treatment_reason" => Field::text(&self.end_of_treatment_reason),
            "tumor_type" => Field::record(&self.tumor_type),
            "study_drugs" => Field::record(&self.study_drugs),
            "biomarkers" => Field::record(&self.biomarkers),
            "ecog_baseline" => Field::record(&self.ecog_baseline),
            "tumor_assessment_baseline" => Field::record(&self.tumor_assessment_baseline),
            "best_overall_response" => Field::record(&self.best_overall_response),
            "medical_histories" => Field::collection(&self.medical_histories),
            "previous_treatments" => Field::collection(&self.previous_treatments),
            "concomitant_medications" => Field::collection(&self.concomitant_medications),
            "adverse_events" => Field::collection(&self.adverse_events),
            "tumor_assessments" => Field::collection(&self.tumor_assessments),
            "c30" => Field::collection(&self.c30),
            _ => return None,
        };
        Some(value)
    }
}

/// Primary tumor classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TumorType {
    /// ICD-10 code as recorded, e.g. `C34.9`.
    pub icd10_code: Option<String>,
    /// Free-text ICD-10 description; a semantic query source.
    pub icd10_description: Option<String>,
    /// Free-text tumor type; a semantic query source.
    pub main_tumor_type: Option<String>,
    /// eCRF code paired with `main_tumor_type`.
    pub main_tumor_type_code: Option<i64>,
    pub cohort_tumor_type: Option<String>,
    pub other_tumor_type: Option<String>,
}

impl Record for TumorType {
    fn record_name(&self) -> &'static str {
        "TumorType"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "icd10_code" => Field::text(&self.icd10_code),
            "icd10_description" => Field::text(&self.icd10_description),
            "main_tumor_type" => Field::text(&self.main_tumor_type),
            "main_tumor_type_code" => Field::int(self.main_tumor_type_code),
            "cohort_tumor_type" => Field::text(&self.cohort_tumor_type),
            "other_tumor_type" => Field::text(&self.other_tumor_type),
            _ => return None,
        };
        Some(value)
    }
}

/// Trial treatment drugs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyDrugs {
    /// Drug name as entered; a semantic query source.
    pub primary_treatment_drug: Option<String>,
    pub primary_treatment_drug_code: Option<i64>,
    pub secondary_treatment_drug: Option<String>,
    pub secondary_treatment_drug_code: Option<i64>,
}

impl Record for StudyDrugs {
    fn record_name(&self) -> &'static str {
        "StudyDrugs"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "primary_treatment_drug" => Field::text(&self.primary_treatment_drug),
            "primary_treatment_drug_code" => Field::int(self.primary_treatment_drug_code),
            "secondary_treatment_drug" => Field::text(&self.secondary_treatment_drug),
            "secondary_treatment_drug_code" => Field::int(self.secondary_treatment_drug_code),
            _ => return None,
        };
        Some(value)
    }
}

/// Molecular profile used for cohort assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Biomarkers {
    pub gene_and_mutation: Option<String>,
    pub gene_and_mutation_code: Option<i64>,
    pub cohort_target_name: Option<String>,
    pub cohort_target_mutation: Option<String>,
    pub date: Option<NaiveDate>,
}

impl Record for Biomarkers {
    fn record_name(&self) -> &'static str {
        "Biomarkers"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "gene_and_mutation" => Field::text(&self.gene_and_mutation),
            "gene_and_mutation_code" => Field::int(self.gene_and_mutation_code),
            "cohort_target_name" => Field::text(&self.cohort_target_name),
            "cohort_target_mutation" => Field::text(&self.cohort_target_mutation),
            "date" => Field::date(self.date),
            _ => return None,
        };
        Some(value)
    }
}

/// ECOG performance status at baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcogBaseline {
    pub description: Option<String>,
    /// ECOG grade, 0 to 5.
    pub grade: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl Record for EcogBaseline {
    fn record_name(&self) -> &'static str {
        "EcogBaseline"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "description" => Field::text(&self.description),
            "grade" => Field::int(self.grade),
            "date" => Field::date(self.date),
            _ => return None,
        };
        Some(value)
    }
}

/// Baseline tumor assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TumorAssessmentBaseline {
    /// Response criteria used, e.g. `RECIST`.
    pub assessment_type: Option<String>,
    pub assessment_date: Option<NaiveDate>,
    /// Sum of target lesion diameters in millimetres.
    pub target_lesion_size: Option<i64>,
    pub target_lesion_nadir: Option<i64>,
    pub target_lesion_measurement_date: Option<NaiveDate>,
    pub off_target_lesions_number: Option<i64>,
    pub off_target_lesion_measurement_date: Option<NaiveDate>,
}

impl TumorAssessmentBaseline {
    /// First available baseline date: assessment, then target lesion, then off-target lesion.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.assessment_date
            .or(self.target_lesion_measurement_date)
            .or(self.off_target_lesion_measurement_date)
    }
}

impl Record for TumorAssessmentBaseline {
    fn record_name(&self) -> &'static str {
        "TumorAssessmentBaseline"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "assessment_type" => Field::text(&self.assessment_type),
            "assessment_date" => Field::date(self.assessment_date),
            "target_lesion_size" => Field::int(self.target_lesion_size),
            "target_lesion_nadir" => Field::int(self.target_lesion_nadir),
            "target_lesion_measurement_date" => Field::date(self.target_lesion_measurement_date),
            "off_target_lesions_number" => Field::int(self.off_target_lesions_number),
            "off_target_lesion_measurement_date" => {
                Field::date(self.off_target_lesion_measurement_date)
            }
            _ => return None,
        };
        Some(value)
    }
}

/// Best response over the whole treatment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestOverallResponse {
    pub response: Option<String>,
    pub code: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl Record for BestOverallResponse {
    fn record_name(&self) -> &'static str {
        "BestOverallResponse"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "response" => Field::text(&self.response),
            "code" => Field::int(self.code),
            "date" => Field::date(self.date),
            _ => return None,
        };
        Some(value)
    }
}

/// A prior or ongoing condition reported at enrollment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    /// Free-text condition; a semantic query source.
    pub term: Option<String>,
    pub sequence_id: Option<i64>,
    /// Histories without a start date produce no condition row.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Ongoing or resolved, as entered.
    pub status: Option<String>,
    pub status_code: Option<i64>,
}

impl Record for MedicalHistory {
    fn record_name(&self) -> &'static str {
        "MedicalHistory"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "term" => Field::text(&self.term),
            "sequence_id" => Field::int(self.sequence_id),
            "start_date" => Field::date(self.start_date),
            "end_date" => Field::date(self.end_date),
            "status" => Field::text(&self.status),
            "status_code" => Field::int(self.status_code),
            _ => return None,
        };
        Some(value)
    }
}

/// A line of therapy given before the trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousTreatment {
    /// Free-text treatment name; a semantic query source.
    pub treatment: Option<String>,
    pub treatment_code: Option<i64>,
    pub treatment_sequence_number: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub additional_treatment: Option<String>,
}

impl Record for PreviousTreatment {
    fn record_name(&self) -> &'static str {
        "PreviousTreatment"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "treatment" => Field::text(&self.treatment),
            "treatment_code" => Field::int(self.treatment_code),
            "treatment_sequence_number" => Field::int(self.treatment_sequence_number),
            "start_date" => Field::date(self.start_date),
            "end_date" => Field::date(self.end_date),
            "additional_treatment" => Field::text(&self.additional_treatment),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcomitantMedication {
    /// Free-text medication; a semantic query source.
    pub medication_name: Option<String>,
    pub medication_ongoing: Option<bool>,
    pub was_taken_due_to_medical_history_event: Option<bool>,
    pub was_taken_due_to_adverse_event: Option<bool>,
    pub is_adverse_event_ongoing: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sequence_id: Option<i64>,
}

impl Record for ConcomitantMedication {
    fn record_name(&self) -> &'static str {
        "ConcomitantMedication"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "medication_name" => Field::text(&self.medication_name),
            "medication_ongoing" => Field::bool(self.medication_ongoing),
            "was_taken_due_to_medical_history_event" => {
                Field::bool(self.was_taken_due_to_medical_history_event)
            }
            "was_taken_due_to_adverse_event" => Field::bool(self.was_taken_due_to_adverse_event),
            "is_adverse_event_ongoing" => Field::bool(self.is_adverse_event_ongoing),
            "start_date" => Field::date(self.start_date),
            "end_date" => Field::date(self.end_date),
            "sequence_id" => Field::int(self.sequence_id),
            _ => return None,
        };
        Some(value)
    }
}

/// An adverse event reported during treatment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdverseEvent {
    /// Free-text event term; a semantic query source.
    pub term: Option<String>,
    /// CTCAE grade, 1 to 5.
    pub grade: Option<i64>,
    pub outcome: Option<String>,
    /// Events without a start date produce no condition row.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub was_serious: Option<bool>,
    pub turned_serious_date: Option<NaiveDate>,
    pub related_to_treatment_1_status: Option<String>,
    pub treatment_1_name: Option<String>,
    pub related_to_treatment_2_status: Option<String>,
    pub treatment_2_name: Option<String>,
}

impl Record for AdverseEvent {
    fn record_name(&self) -> &'static str {
        "AdverseEvent"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "term" => Field::text(&self.term),
            "grade" => Field::int(self.grade),
            "outcome" => Field::text(&self.outcome),
            "start_date" => Field::date(self.start_date),
            "end_date" => Field::date(self.end_date),
            "was_serious" => Field::bool(self.was_serious),
            "turned_serious_date" => Field::date(self.turned_serious_date),
            "related_to_treatment_1_status" => Field::text(&self.related_to_treatment_1_status),
            "treatment_1_name" => Field::text(&self.treatment_1_name),
            "related_to_treatment_2_status" => Field::text(&self.related_to_treatment_2_status),
            "treatment_2_name" => Field::text(&self.treatment_2_name),
            _ => return None,
        };
        Some(value)
    }
}

/// A follow-up tumor assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TumorAssessment {
    pub assessment_type: Option<String>,
    pub target_lesion_change_from_baseline: Option<f64>,
    pub target_lesion_change_from_nadir: Option<f64>,
    pub was_new_lesions_registered_after_baseline: Option<bool>,
    /// Visit date; assessments without one produce no visit.
    pub date: Option<NaiveDate>,
    pub recist_response: Option<String>,
    pub irecist_response: Option<String>,
    pub rano_response: Option<String>,
    pub recist_date_of_progression: Option<NaiveDate>,
    pub irecist_date_of_progression: Option<NaiveDate>,
    /// Study event identifier; assessments sharing it form one visit.
    pub event_id: Option<String>,
}

impl Record for TumorAssessment {
    fn record_name(&self) -> &'static str {
        "TumorAssessment"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        let value = match name {
            "assessment_type" => Field::text(&self.assessment_type),
            "target_lesion_change_from_baseline" => {
                Field::float(self.target_lesion_change_from_baseline)
            }
            "target_lesion_change_from_nadir" => Field::float(self.target_lesion_change_from_nadir),
            "was_new_lesions_registered_after_baseline" => {
                Field::bool(self.was_new_lesions_registered_after_baseline)
            }
            "date" => Field::date(self.date),
            "recist_response" => Field::text(&self.recist_response),
            "irecist_response" => Field::text(&self.irecist_response),
            "rano_response" => Field::text(&self.rano_response),
            "recist_date_of_progression" => Field::date(self.recist_date_of_progression),
            "irecist_date_of_progression" => Field::date(self.irecist_date_of_progression),
            "event_id" => Field::text(&self.event_id),
            _ => return None,
        };
        Some(value)
    }
}
