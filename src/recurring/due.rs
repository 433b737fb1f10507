//! Deciding whether a recurring rule should produce a transaction today.

use time::{Date, Duration};

use crate::{
    Error,
    recurring::{Frequency, StoredRule},
    timezone::parse_date,
};

/// Whether a rule with `frequency` that last applied on `reference` is due on `today`.
///
/// - daily: the reference is before today,
/// - weekly: at least seven days have passed since the reference,
/// - monthly: today is in a different calendar month to the reference.
///
/// A reference after `today` is never due.
pub fn is_due(frequency: Frequency, reference: Date, today: Date) -> bool {
    if reference > today {
        return false;
    }

    match frequency {
        Frequency::Daily => reference < today,
        Frequency::Weekly => reference
            .checked_add(Duration::days(7))
            .is_some_and(|next| next <= today),
        Frequency::Monthly => {
            reference.month() != today.month() || reference.year() != today.year()
        }
    }
}

/// The date a rule counts from: when it last applied, or its start date if it never has.
///
/// # Errors
/// Returns [Error::MalformedDate] if the stored date cannot be parsed.
pub fn reference_date(rule: &StoredRule) -> Result<Date, Error> {
    parse_date(rule.last_applied.as_deref().unwrap_or(&rule.start_date))
}

/// Interpret a stored rule and check whether it is due on `today`.
///
/// # Errors
/// Returns [Error::InvalidFrequency] or [Error::MalformedDate] if the stored
/// rule cannot be interpreted.
pub fn rule_is_due(rule: &StoredRule, today: Date) -> Result<bool, Error> {
    let frequency = rule.frequency.parse::<Frequency>()?;
    let reference = reference_date(rule)?;

    Ok(is_due(frequency, reference, today))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        recurring::{Frequency, StoredRule},
        transaction::Descriptor,
    };

    use super::{is_due, rule_is_due};

    #[test]
    fn daily_is_not_due_on_the_same_day() {
        let today = date!(2024 - 06 - 08);

        assert!(!is_due(Frequency::Daily, today, today));
    }

    #[test]
    fn daily_is_due_the_next_day() {
        assert!(is_due(
            Frequency::Daily,
            date!(2024 - 06 - 07),
            date!(2024 - 06 - 08)
        ));
    }

    #[test]
    fn weekly_is_not_due_after_six_days() {
        assert!(!is_due(
            Frequency::Weekly,
            date!(2024 - 06 - 01),
            date!(2024 - 06 - 07)
        ));
    }

    #[test]
    fn weekly_is_due_after_exactly_seven_days() {
        assert!(is_due(
            Frequency::Weekly,
            date!(2024 - 06 - 01),
            date!(2024 - 06 - 08)
        ));
    }

    #[test]
    fn weekly_is_due_after_more_than_seven_days() {
        assert!(is_due(
            Frequency::Weekly,
            date!(2024 - 05 - 01),
            date!(2024 - 06 - 08)
        ));
    }

    #[test]
    fn monthly_is_due_on_calendar_month_change() {
        assert!(is_due(
            Frequency::Monthly,
            date!(2024 - 01 - 31),
            date!(2024 - 02 - 01)
        ));
    }

    #[test]
    fn monthly_is_not_due_within_the_same_month() {
        assert!(!is_due(
            Frequency::Monthly,
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 28)
        ));
    }

    #[test]
    fn monthly_is_due_in_the_same_month_of_another_year() {
        assert!(is_due(
            Frequency::Monthly,
            date!(2023 - 02 - 01),
            date!(2024 - 02 - 28)
        ));
    }

    #[test]
    fn future_reference_is_never_due() {
        let today = date!(2024 - 06 - 08);
        let future = date!(2024 - 08 - 01);

        for frequency in Frequency::ALL {
            assert!(
                !is_due(frequency, future, today),
                "{frequency} rule starting in the future should not be due"
            );
        }
    }

    fn stored_rule(frequency: &str, start_date: &str, last_applied: Option<&str>) -> StoredRule {
        StoredRule {
            id: 1,
            owner: UserID::new(1),
            amount: 10.0,
            descriptor: Descriptor::Income {
                source: "Allowance".to_owned(),
            },
            frequency: frequency.to_owned(),
            start_date: start_date.to_owned(),
            last_applied: last_applied.map(str::to_owned),
        }
    }

    #[test]
    fn last_applied_takes_precedence_over_start_date() {
        let rule = stored_rule("weekly", "2024-01-01", Some("2024-06-05"));

        assert_eq!(rule_is_due(&rule, date!(2024 - 06 - 08)), Ok(false));
    }

    #[test]
    fn start_date_is_used_when_never_applied() {
        let rule = stored_rule("weekly", "2024-06-01", None);

        assert_eq!(rule_is_due(&rule, date!(2024 - 06 - 08)), Ok(true));
    }

    #[test]
    fn malformed_stored_values_are_errors() {
        let today = date!(2024 - 06 - 08);

        assert_eq!(
            rule_is_due(&stored_rule("yearly", "2024-06-01", None), today),
            Err(Error::InvalidFrequency("yearly".to_owned()))
        );
        assert_eq!(
            rule_is_due(&stored_rule("daily", "01/06/2024", None), today),
            Err(Error::MalformedDate("01/06/2024".to_owned()))
        );
    }
}
