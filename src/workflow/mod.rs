pub mod apply_ctx;
pub mod apply_flow;
pub mod external_flow;
pub mod state;

pub use apply_ctx::ApplyCtx;
pub use apply_flow::{ApplyFlow, FlowSettings};
pub use external_flow::ExternalProgress;
pub use state::ApplyState;
