mod cdm_source;
mod condition_occurrence;
mod observation_period;
mod person;
mod visit_occurrence;

pub use cdm_source::{CdmSourceBuilder, CdmSourceSettings};
pub use condition_occurrence::ConditionOccurrenceBuilder;
pub use observation_period::ObservationPeriodBuilder;
pub use person::PersonBuilder;
pub use visit_occurrence::VisitOccurrenceBuilder;
