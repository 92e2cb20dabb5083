//! Employee and shift legitimacy verdicts.
//!
//! The employee evaluator is a fixed-priority lattice: the first matching
//! rule wins and later rules never append to it. An employee who is both
//! disciplinarily restricted and out of compliance reports exactly one
//! blocker, `DISCIPLINARY_RESTRICTION`. Callers must not read the blocker
//! list as exhaustive across failure categories.

use serde::{Deserialize, Serialize};

use crate::compliance::{ComplianceCell, ComplianceCellStatus};
use crate::reason::legitimacy as reason;

/// Whether an employee or shift may legally operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegitimacyStatus {
    Go,
    Warning,
    Illegal,
    Restricted,
}

/// Derived induction state for one employee at their site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InductionStatus {
    Restricted,
    Cleared,
}

/// Per-employee verdict. Computed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeVerdict {
    pub employee_id: String,
    pub status: LegitimacyStatus,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
}

/// Combine induction, disciplinary, and compliance signals for one employee.
///
/// Priority order is a hard contract:
/// 1. restricted induction (absolute gate, no blockers recorded)
/// 2. disciplinary restriction
/// 3. any expired compliance
/// 4. any expiring compliance
/// 5. go
pub fn evaluate_employee(
    employee_id: impl Into<String>,
    induction: InductionStatus,
    disciplinary_restriction: bool,
    compliance: &[ComplianceCell],
) -> EmployeeVerdict {
    let employee_id = employee_id.into();

    if induction == InductionStatus::Restricted {
        return EmployeeVerdict {
            employee_id,
            status: LegitimacyStatus::Restricted,
            blockers: vec![],
            warnings: vec![],
        };
    }

    if disciplinary_restriction {
        return EmployeeVerdict {
            employee_id,
            status: LegitimacyStatus::Illegal,
            blockers: vec![reason::DISCIPLINARY_RESTRICTION.to_string()],
            warnings: vec![],
        };
    }

    let any_illegal = compliance
        .iter()
        .any(|cell| cell.status == ComplianceCellStatus::Illegal);
    if any_illegal {
        return EmployeeVerdict {
            employee_id,
            status: LegitimacyStatus::Illegal,
            blockers: vec![reason::COMPLIANCE_EXPIRED.to_string()],
            warnings: vec![],
        };
    }

    let any_warning = compliance
        .iter()
        .any(|cell| cell.status == ComplianceCellStatus::Warning);
    if any_warning {
        return EmployeeVerdict {
            employee_id,
            status: LegitimacyStatus::Warning,
            blockers: vec![],
            warnings: vec![reason::COMPLIANCE_EXPIRING.to_string()],
        };
    }

    EmployeeVerdict {
        employee_id,
        status: LegitimacyStatus::Go,
        blockers: vec![],
        warnings: vec![],
    }
}

/// Shift-level fold over per-employee verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftVerdict {
    pub status: LegitimacyStatus,
    pub blocking_employees: usize,
    pub warning_employees: usize,
}

/// Fold employee verdicts into one shift verdict.
///
/// Any `Illegal` or `Restricted` employee makes the shift `Illegal`; else
/// any `Warning` makes it `Warning`. An empty roster is a defined neutral
/// `Go`; "unstaffed" is a separate reason code owned by the aggregator, not
/// a legitimacy signal.
pub fn evaluate_shift(verdicts: &[EmployeeVerdict]) -> ShiftVerdict {
    let blocking_employees = verdicts
        .iter()
        .filter(|v| {
            matches!(
                v.status,
                LegitimacyStatus::Illegal | LegitimacyStatus::Restricted
            )
        })
        .count();
    let warning_employees = verdicts
        .iter()
        .filter(|v| v.status == LegitimacyStatus::Warning)
        .count();

    let status = if blocking_employees > 0 {
        LegitimacyStatus::Illegal
    } else if warning_employees > 0 {
        LegitimacyStatus::Warning
    } else {
        LegitimacyStatus::Go
    };

    ShiftVerdict {
        status,
        blocking_employees,
        warning_employees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(status: ComplianceCellStatus) -> ComplianceCell {
        ComplianceCell {
            requirement_code: "FORKLIFT".to_string(),
            requirement_name: "Forklift licence".to_string(),
            status,
            warning_window_days: 30,
            decided_by: None,
            expires_on: None,
        }
    }

    fn verdict(status: LegitimacyStatus) -> EmployeeVerdict {
        EmployeeVerdict {
            employee_id: "emp".to_string(),
            status,
            blockers: vec![],
            warnings: vec![],
        }
    }

    /// Full 2x2x3 combination table: induction x disciplinary x compliance.
    #[test]
    fn priority_table_holds_for_all_combinations() {
        use ComplianceCellStatus as C;
        use InductionStatus as I;
        use LegitimacyStatus as L;

        let cases = [
            (I::Restricted, false, C::Valid, L::Restricted),
            (I::Restricted, false, C::Warning, L::Restricted),
            (I::Restricted, false, C::Illegal, L::Restricted),
            (I::Restricted, true, C::Valid, L::Restricted),
            (I::Restricted, true, C::Warning, L::Restricted),
            (I::Restricted, true, C::Illegal, L::Restricted),
            (I::Cleared, true, C::Valid, L::Illegal),
            (I::Cleared, true, C::Warning, L::Illegal),
            (I::Cleared, true, C::Illegal, L::Illegal),
            (I::Cleared, false, C::Illegal, L::Illegal),
            (I::Cleared, false, C::Warning, L::Warning),
            (I::Cleared, false, C::Valid, L::Go),
        ];

        for (induction, disciplinary, compliance, expected) in cases {
            let got = evaluate_employee("emp", induction, disciplinary, &[cell(compliance)]);
            assert_eq!(
                got.status, expected,
                "induction={induction:?} disciplinary={disciplinary} compliance={compliance:?}"
            );
        }
    }

    #[test]
    fn restricted_induction_records_no_blockers() {
        let got = evaluate_employee(
            "emp",
            InductionStatus::Restricted,
            true,
            &[cell(ComplianceCellStatus::Illegal)],
        );
        assert_eq!(got.status, LegitimacyStatus::Restricted);
        assert!(got.blockers.is_empty());
        assert!(got.warnings.is_empty());
    }

    #[test]
    fn disciplinary_beats_compliance_with_single_blocker() {
        let got = evaluate_employee(
            "emp",
            InductionStatus::Cleared,
            true,
            &[cell(ComplianceCellStatus::Illegal)],
        );
        assert_eq!(got.status, LegitimacyStatus::Illegal);
        assert_eq!(got.blockers, vec!["DISCIPLINARY_RESTRICTION".to_string()]);
    }

    #[test]
    fn illegal_compliance_masks_warnings() {
        let got = evaluate_employee(
            "emp",
            InductionStatus::Cleared,
            false,
            &[
                cell(ComplianceCellStatus::Warning),
                cell(ComplianceCellStatus::Illegal),
            ],
        );
        assert_eq!(got.status, LegitimacyStatus::Illegal);
        assert_eq!(got.blockers, vec!["COMPLIANCE_EXPIRED".to_string()]);
        assert!(got.warnings.is_empty());
    }

    #[test]
    fn missing_and_waived_cells_do_not_block() {
        let got = evaluate_employee(
            "emp",
            InductionStatus::Cleared,
            false,
            &[
                cell(ComplianceCellStatus::Missing),
                cell(ComplianceCellStatus::Waived),
            ],
        );
        assert_eq!(got.status, LegitimacyStatus::Go);
    }

    #[test]
    fn empty_shift_is_neutral_go() {
        let got = evaluate_shift(&[]);
        assert_eq!(got.status, LegitimacyStatus::Go);
        assert_eq!(got.blocking_employees, 0);
        assert_eq!(got.warning_employees, 0);
    }

    #[test]
    fn single_warning_makes_shift_warning() {
        let got = evaluate_shift(&[
            verdict(LegitimacyStatus::Go),
            verdict(LegitimacyStatus::Warning),
            verdict(LegitimacyStatus::Go),
        ]);
        assert_eq!(got.status, LegitimacyStatus::Warning);
        assert_eq!(got.warning_employees, 1);
    }

    #[test]
    fn any_illegal_or_restricted_makes_shift_illegal_in_any_order() {
        for verdicts in [
            vec![verdict(LegitimacyStatus::Illegal), verdict(LegitimacyStatus::Go)],
            vec![verdict(LegitimacyStatus::Go), verdict(LegitimacyStatus::Illegal)],
            vec![
                verdict(LegitimacyStatus::Warning),
                verdict(LegitimacyStatus::Restricted),
            ],
            vec![
                verdict(LegitimacyStatus::Restricted),
                verdict(LegitimacyStatus::Warning),
            ],
        ] {
            let got = evaluate_shift(&verdicts);
            assert_eq!(got.status, LegitimacyStatus::Illegal);
            assert_eq!(got.blocking_employees, 1);
        }
    }
}
