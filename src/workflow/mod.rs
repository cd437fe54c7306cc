pub mod application_ctx;
pub mod modal_flow;
pub mod run_control;

pub use application_ctx::ApplicationCtx;
pub use modal_flow::{ModalFlow, ModalResult};
pub use run_control::RunControl;
