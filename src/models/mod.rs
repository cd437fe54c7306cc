pub mod field;
pub mod loaders;
pub mod posting;
pub mod run_state;
pub mod settings;

pub use field::{AnswerOutcome, ElementKind, FieldContext, FieldElement, FieldWrite};
pub use loaders::load_settings;
pub use posting::{ApplicationOutcome, Posting, SkipReason};
pub use run_state::{RunState, RunStatus, Stats};
pub use settings::{CoverLetterStyle, DatePosted, Profile, SearchFilters, Settings};
