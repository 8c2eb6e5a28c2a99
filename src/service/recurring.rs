use crate::domain::platform::PlanFrequency;
use crate::host::{CyclePeriod, RecurringCycle};
use chrono::{DateTime, Months, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub frequency: PlanFrequency,
    /// Multiplier over the base frequency; omitted from the wire when 1.
    pub interval: Option<i32>,
    /// First recurring charge, one full cycle after signup.
    pub start_date: NaiveDate,
    /// Recurring cycles after the setup charge; None runs until cancelled.
    pub duration: Option<i32>,
}

/// Maps the host's free-form cycle (period unit x integer length) onto the
/// gateway's fixed frequency vocabulary. Day-based cycles are only
/// representable when they collapse to whole weeks or months.
pub fn normalize_cycle(cycle: &RecurringCycle, now: DateTime<Utc>) -> Result<Schedule, String> {
    if cycle.length < 1 {
        return Err("recurring cycle length must be at least 1".to_string());
    }
    if let Some(cycles) = cycle.total_cycles {
        if cycles < 1 {
            return Err("recurring cycle count must be at least 1".to_string());
        }
    }

    let (frequency, interval) = match (cycle.period, cycle.length) {
        (CyclePeriod::Days, n) if n % 7 == 0 => weekly(n / 7),
        (CyclePeriod::Days, n) if n % 30 == 0 => monthly(n / 30),
        (CyclePeriod::Days, n) => {
            return Err(format!(
                "a {n}-day cycle is not billable: day-based cycles must divide into whole weeks or months"
            ))
        }
        (CyclePeriod::Weeks, n) => weekly(n),
        (CyclePeriod::Months, n) => monthly(n),
        (CyclePeriod::Years, n) => (PlanFrequency::Annually, n),
    };

    let start_date = add_cycle(now, cycle.period, cycle.length)?.date_naive();

    Ok(Schedule {
        frequency,
        interval: (interval > 1).then_some(interval),
        start_date,
        duration: cycle.total_cycles.map(|cycles| cycles - 1),
    })
}

fn weekly(n: i32) -> (PlanFrequency, i32) {
    match n {
        1 => (PlanFrequency::Weekly, 1),
        2 => (PlanFrequency::BiWeekly, 1),
        n => (PlanFrequency::Weekly, n),
    }
}

fn monthly(n: i32) -> (PlanFrequency, i32) {
    match n {
        1 => (PlanFrequency::Monthly, 1),
        3 => (PlanFrequency::Quarterly, 1),
        6 => (PlanFrequency::BiAnnually, 1),
        12 => (PlanFrequency::Annually, 1),
        n => (PlanFrequency::Monthly, n),
    }
}

fn add_cycle(
    now: DateTime<Utc>,
    period: CyclePeriod,
    length: i32,
) -> Result<DateTime<Utc>, String> {
    let out_of_range = || "recurring start date out of range".to_string();
    match period {
        CyclePeriod::Days => Ok(now + chrono::Duration::days(i64::from(length))),
        CyclePeriod::Weeks => Ok(now + chrono::Duration::weeks(i64::from(length))),
        CyclePeriod::Months => now
            .checked_add_months(Months::new(length as u32))
            .ok_or_else(out_of_range),
        CyclePeriod::Years => now
            .checked_add_months(Months::new(length as u32 * 12))
            .ok_or_else(out_of_range),
    }
}
