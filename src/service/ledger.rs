//! Per-employee balance accounting for leave requests.

use crate::error::ServiceError;
use crate::model::employee::Employee;
use crate::model::leave_request::{DaysOffSummary, LeaveType, PtoRequest};
use crate::store::{BalanceKind, Deduction};
use chrono::NaiveDate;

/// Inclusive number of calendar days between two dates.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// Balance column backing a leave type; `personal` leave has none.
pub fn balance_kind(leave_type: LeaveType) -> Option<BalanceKind> {
    match leave_type {
        LeaveType::Vacation => Some(BalanceKind::Vacation),
        LeaveType::Sick => Some(BalanceKind::Sick),
        LeaveType::Personal => None,
    }
}

pub fn available(employee: &Employee, kind: BalanceKind) -> i64 {
    match kind {
        BalanceKind::Vacation => employee.vacation_days_balance as i64,
        BalanceKind::Sick => employee.sick_days_balance as i64,
    }
}

/// Checks a new request against the employee's balance without touching it.
pub fn ensure_covered(
    employee: &Employee,
    leave_type: LeaveType,
    days: i64,
) -> Result<(), ServiceError> {
    let Some(kind) = balance_kind(leave_type) else {
        return Ok(());
    };

    if available(employee, kind) < days {
        return Err(ServiceError::InsufficientBalance(leave_type.into()));
    }
    Ok(())
}

/// Days to charge when `request` is approved by HR.
pub fn deduction_for(request: &PtoRequest) -> Deduction {
    let days = day_count(request.start_date, request.end_date);
    let balance = request
        .leave_type
        .parse::<LeaveType>()
        .ok()
        .and_then(balance_kind);

    Deduction {
        balance,
        days: i32::try_from(days).unwrap_or(i32::MAX),
    }
}

/// Buckets approved requests by their lower-cased type.
pub fn summarize<'a>(requests: impl IntoIterator<Item = &'a PtoRequest>) -> DaysOffSummary {
    let mut summary = DaysOffSummary::default();

    for request in requests {
        let days = day_count(request.start_date, request.end_date);
        match request.leave_type.to_lowercase().as_str() {
            "vacation" => summary.vacation += days,
            "sick" => summary.sick += days,
            "personal" => summary.personal += days,
            _ => summary.other += days,
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::PtoStatus;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn employee(vacation: i32, sick: i32) -> Employee {
        Employee {
            id: 1,
            employee_code: "EMP-001".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            department_id: None,
            vacation_days_balance: vacation,
            sick_days_balance: sick,
            annual_days_off: 30,
            active_pto_request: false,
        }
    }

    fn approved(leave_type: &str, start: NaiveDate, end: NaiveDate) -> PtoRequest {
        PtoRequest {
            id: 1,
            employee_id: 1,
            approver_id: Some(2),
            department_id: None,
            start_date: start,
            end_date: end,
            leave_type: leave_type.into(),
            status: PtoStatus::HrApproved,
            reason: None,
            status_reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counts_days_inclusively() {
        assert_eq!(day_count(date(2024, 1, 1), date(2024, 1, 1)), 1);
        assert_eq!(day_count(date(2024, 1, 1), date(2024, 1, 5)), 5);
        assert_eq!(day_count(date(2024, 2, 28), date(2024, 3, 1)), 3);
    }

    #[test]
    fn rejects_requests_over_balance() {
        let emp = employee(3, 10);
        let err = ensure_covered(&emp, LeaveType::Vacation, 5).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientBalance("vacation")));
        assert!(ensure_covered(&emp, LeaveType::Vacation, 3).is_ok());
        assert!(ensure_covered(&emp, LeaveType::Sick, 10).is_ok());
        assert!(matches!(
            ensure_covered(&emp, LeaveType::Sick, 11),
            Err(ServiceError::InsufficientBalance("sick"))
        ));
    }

    #[test]
    fn personal_leave_is_never_checked() {
        let emp = employee(0, 0);
        assert!(ensure_covered(&emp, LeaveType::Personal, 40).is_ok());
    }

    #[test]
    fn deduction_targets_the_matching_balance() {
        let vacation = approved("vacation", date(2024, 6, 1), date(2024, 6, 3));
        assert_eq!(
            deduction_for(&vacation),
            Deduction {
                balance: Some(BalanceKind::Vacation),
                days: 3
            }
        );

        let personal = approved("personal", date(2024, 6, 1), date(2024, 6, 1));
        assert_eq!(deduction_for(&personal).balance, None);
    }

    #[test]
    fn summary_buckets_unknown_types_as_other() {
        let requests = vec![
            approved("vacation", date(2024, 3, 1), date(2024, 3, 5)),
            approved("Sick", date(2024, 4, 1), date(2024, 4, 2)),
            approved("bereavement", date(2024, 5, 1), date(2024, 5, 1)),
        ];
        assert_eq!(
            summarize(&requests),
            DaysOffSummary {
                vacation: 5,
                sick: 2,
                personal: 0,
                other: 1
            }
        );
    }
}
