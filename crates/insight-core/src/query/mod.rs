//! Query domain module.
//!
//! # Module Structure
//!
//! - `session`: The session state machine (`QuerySession`)
//! - `state`: Lifecycle types (`SessionState`, `Submission`, `Outcome`, `Completion`)
//! - `history`: Bounded, deduplicated query history
//! - `result`: `ChartResult`, a dataset stamped with its query
//! - `resolver`: The async contract a query backend satisfies
//! - `snapshot`: Read-only view handed to the presentation layer

mod history;
mod resolver;
mod result;
mod session;
mod snapshot;
mod state;

pub use history::QueryHistory;
pub use resolver::QueryResolver;
pub use result::ChartResult;
pub use session::QuerySession;
pub use snapshot::{ResolvedChart, SessionSnapshot};
pub use state::{Completion, Outcome, SessionState, Submission};
