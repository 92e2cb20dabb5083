//! # Shiftgate Kernel
//!
//! Pure evaluators for workforce legitimacy and operational readiness.
//!
//! Every function in this crate is a deterministic map from explicit inputs
//! to a verdict. Reference dates are parameters, rowsets are slices, and
//! nothing here touches a datastore or the wall clock. That makes the whole
//! crate safe to call concurrently from any number of request threads.
//!
//! ## Evaluation pipeline
//!
//! ```text
//! ExpiryStatus            <- one compliance record against a warning window
//!     |
//! ComplianceCell          <- scoped-binding resolution per requirement
//!     |
//! EmployeeVerdict         <- induction + disciplinary + compliance lattice
//!     |
//! ShiftVerdict            <- fold over the rostered employees
//!     |
//! StationReadiness        <- skills vs. requirements, independent of legality
//! ```

pub mod compliance;
pub mod expiry;
pub mod legitimacy;
pub mod reason;
pub mod station;

pub use compliance::{
    BindingScope, ComplianceCell, ComplianceCellStatus, ComplianceRequirement,
    EmployeeComplianceRecord, EmployeeScope, RequirementBinding, resolve_employee_compliance,
};
pub use expiry::{ExpiryStatus, evaluate_expiry};
pub use legitimacy::{
    EmployeeVerdict, InductionStatus, LegitimacyStatus, ShiftVerdict, evaluate_employee,
    evaluate_shift,
};
pub use station::{
    EmployeeSkillLevel, OpsStatus, SkillGap, StationReadiness, StationSkillRequirement,
    evaluate_station, fold_shift_ops,
};
