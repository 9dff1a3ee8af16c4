use chrono::{Datelike, NaiveDate, Weekday};

/// Maps a date to the schedule service class it runs under.
pub fn service_class(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
        _ => "wkd",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekdays_map_to_wkd() {
        // 2024-03-04 is a Monday
        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(service_class(d), "wkd");
        assert_eq!(service_class(d + chrono::Duration::days(4)), "wkd");
    }

    #[test]
    fn saturday_and_sunday_map_separately() {
        let sat = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let sun = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(service_class(sat), "sat");
        assert_eq!(service_class(sun), "sun");
    }
}
