use chrono::NaiveDate;

/// Start of the Unix epoch, 1970-01-01.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date")
}

/// Seconds elapsed between the Unix epoch and midnight UTC on the given
/// date. This is the `period1`/`period2` representation the Yahoo Finance
/// download endpoint expects.
pub fn unix_midnight(date: NaiveDate) -> i64 {
    (date - epoch()).num_days() * 86_400
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_epoch() {
        assert_eq!(unix_midnight(epoch()), 0);
    }

    #[test]
    fn test_2021_01_08() {
        // Cross-checked against https://www.unixtimestamp.com/
        let date = NaiveDate::from_ymd_opt(2021, 1, 8).unwrap();
        assert_eq!(unix_midnight(date), 1_610_064_000);
    }

    #[test]
    fn test_pre_epoch_date_is_negative() {
        let date = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(unix_midnight(date), -86_400);
    }
}
