//! Splits the import window into request-sized batches.

use chrono::{Days, NaiveDate, NaiveTime};

/// Upper bound on days per batch, matching the kline `limit` so a batch
/// can never be truncated remotely.
pub const BATCH_DAYS: u64 = 1000;

/// The last day to import: yesterday relative to `today`. The current day
/// may still be trading.
pub fn end_date(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Batch {
    pub fn start_millis(&self) -> i64 {
        midnight_millis(self.start)
    }

    pub fn end_millis(&self) -> i64 {
        midnight_millis(self.end)
    }

    /// Days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Lazy, contiguous batches covering `[start, end]`.
#[derive(Debug, Clone)]
pub struct DateChunks {
    next_start: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateChunks {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next_start: Some(start),
            end,
        }
    }
}

impl Iterator for DateChunks {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let start = self.next_start?;
        if start > self.end {
            self.next_start = None;
            return None;
        }

        let end = start
            .checked_add_days(Days::new(BATCH_DAYS - 1))
            .map_or(self.end, |d| d.min(self.end));

        self.next_start = end.succ_opt();
        Some(Batch { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expected_batches(start: NaiveDate, end: NaiveDate) -> usize {
        let days = (end - start).num_days() + 1;
        ((days + BATCH_DAYS as i64 - 1) / BATCH_DAYS as i64) as usize
    }

    #[test]
    fn test_end_date_is_yesterday() {
        assert_eq!(end_date(date(2024, 3, 1)), date(2024, 2, 29));
        assert_eq!(end_date(date(2024, 1, 1)), date(2023, 12, 31));
    }

    #[test]
    fn test_short_range_is_one_batch() {
        let batches: Vec<_> = DateChunks::new(date(2024, 1, 1), date(2024, 1, 10)).collect();

        assert_eq!(
            batches,
            vec![Batch {
                start: date(2024, 1, 1),
                end: date(2024, 1, 10)
            }]
        );
    }

    #[test]
    fn test_single_day_range() {
        let batches: Vec<_> = DateChunks::new(date(2024, 1, 1), date(2024, 1, 1)).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].days(), 1);
    }

    #[test]
    fn test_exactly_one_full_batch() {
        let start = date(2020, 1, 1);
        let end = start + Days::new(999);
        let batches: Vec<_> = DateChunks::new(start, end).collect();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].days(), 1000);
    }

    #[test]
    fn test_one_day_over_a_full_batch() {
        let start = date(2020, 1, 1);
        let end = start + Days::new(1000);
        let batches: Vec<_> = DateChunks::new(start, end).collect();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].start, end);
        assert_eq!(batches[1].end, end);
    }

    #[test]
    fn test_batch_count_and_contiguity() {
        let start = date(2017, 8, 17);
        for end in [date(2017, 8, 17), date(2019, 1, 1), date(2020, 5, 12), date(2025, 10, 18)] {
            let batches: Vec<_> = DateChunks::new(start, end).collect();

            assert_eq!(batches.len(), expected_batches(start, end), "end {}", end);
            assert_eq!(batches.first().unwrap().start, start);
            assert_eq!(batches.last().unwrap().end, end);

            for batch in &batches {
                assert!(batch.end >= batch.start);
                assert!(batch.days() <= BATCH_DAYS as i64);
            }
            for pair in batches.windows(2) {
                assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
            }
        }
    }

    #[test]
    fn test_start_after_end_yields_nothing() {
        let mut chunks = DateChunks::new(date(2024, 1, 2), date(2024, 1, 1));
        assert!(chunks.next().is_none());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_batch_millis_are_utc_midnight() {
        let batch = Batch {
            start: date(2023, 11, 14),
            end: date(2023, 11, 15),
        };

        assert_eq!(batch.start_millis(), 1_699_920_000_000);
        assert_eq!(batch.end_millis() - batch.start_millis(), 86_400_000);
    }
}
