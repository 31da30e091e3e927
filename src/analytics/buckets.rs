use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Months shown on the monthly charts, current month included
pub const TRAILING_MONTHS: u32 = 6;

/// One calendar month, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl MonthBucket {
    /// The month that contains `date`
    pub fn containing(date: NaiveDate) -> Self {
        let first = date - Duration::days(i64::from(date.day0()));
        let start = first.and_time(NaiveTime::MIN);
        let end = first
            .checked_add_months(Months::new(1))
            .map(|next| next.and_time(NaiveTime::MIN) - Duration::milliseconds(1))
            .unwrap_or(NaiveDateTime::MAX);
        Self { start, end }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    /// Chart label, e.g. "Oct 2026"
    pub fn label(&self) -> String {
        self.start.format("%b %Y").to_string()
    }
}

/// The `count` months ending with the month of `today`, oldest first.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<MonthBucket> {
    (0..count)
        .rev()
        .filter_map(|back| today.checked_sub_months(Months::new(back)))
        .map(MonthBucket::containing)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bucket_spans_whole_month() {
        let feb = MonthBucket::containing(date(2028, 2, 17));
        assert_eq!(feb.start, date(2028, 2, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            feb.end,
            date(2028, 2, 29).and_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
        assert_eq!(feb.label(), "Feb 2028");
    }

    #[test]
    fn boundaries_are_inclusive() {
        let bucket = MonthBucket::containing(date(2026, 10, 16));
        assert!(bucket.contains(bucket.start));
        assert!(bucket.contains(bucket.end));
        assert!(!bucket.contains(bucket.start - Duration::milliseconds(1)));
        assert!(!bucket.contains(bucket.end + Duration::milliseconds(1)));
    }

    #[test]
    fn six_contiguous_months_oldest_first() {
        for today in [date(2026, 10, 16), date(2026, 3, 31), date(2027, 1, 1)] {
            let buckets = trailing_months(today, TRAILING_MONTHS);
            assert_eq!(buckets.len(), 6);

            for pair in buckets.windows(2) {
                assert!(pair[0].start < pair[1].start);
                assert_eq!(pair[0].end + Duration::milliseconds(1), pair[1].start);
            }

            let current = MonthBucket::containing(today);
            assert_eq!(buckets[5], current);
            let five_back = today.checked_sub_months(Months::new(5)).unwrap();
            assert_eq!(buckets[0], MonthBucket::containing(five_back));
        }
    }

    #[test]
    fn labels_cross_year_boundary() {
        let labels: Vec<String> = trailing_months(date(2027, 2, 10), 6)
            .iter()
            .map(MonthBucket::label)
            .collect();
        assert_eq!(
            labels,
            ["Sep 2026", "Oct 2026", "Nov 2026", "Dec 2026", "Jan 2027", "Feb 2027"]
        );
    }
}
