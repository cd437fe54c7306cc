pub mod answer_resolver;
pub mod answer_rules;
pub mod decision;
pub mod eligibility;
pub mod field_labeler;
pub mod human_input;
pub mod llm_service;
pub mod state_store;

pub use answer_resolver::AnswerResolver;
pub use decision::{DecisionAnswer, DecisionService};
pub use field_labeler::FieldLabeler;
pub use human_input::{HumanInput, HumanReply, ReviewDecision};
pub use llm_service::LlmService;
pub use state_store::StateStore;
