mod execute;
mod plan;

pub use execute::{delete_all_objects, execute_reconciliation, ExecuteError, ReconciliationResult};
pub use plan::{build_reconciliation_plan, ReconciliationPlan};
