#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use crate::api::{Event, EventDetails, EventId, UserId};
    use crate::models::{DateRange, ForecastPoint};
    use crate::services::aggregation::{
        average_forecasts, build_daily_counts, build_event_category_map,
        merge_and_average_forecasts, AggregationError, DatedRecord,
    };

    struct Record {
        at: DateTime<Utc>,
        owner: UserId,
    }

    impl DatedRecord for Record {
        fn timestamp(&self) -> DateTime<Utc> {
            self.at
        }

        fn owner(&self) -> UserId {
            self.owner
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(y: i32, m: u32, d: u32, hour: u32, owner: i64) -> Record {
        Record {
            at: Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap(),
            owner: UserId(owner),
        }
    }

    fn range(from: NaiveDate, to: NaiveDate) -> DateRange {
        DateRange::new(from, to).unwrap()
    }

    fn event(id: i64, kind: &str, name: &str, date: NaiveDate) -> Event {
        Event {
            id: EventId(id),
            user_id: UserId(1),
            event_details: EventDetails {
                event_type: kind.to_string(),
                event_name: name.to_string(),
                date,
            },
        }
    }

    fn series(points: &[(&str, f64)]) -> Vec<ForecastPoint> {
        points
            .iter()
            .map(|(date, value)| ForecastPoint::new(*date, *value))
            .collect()
    }

    // =========================================================================
    // Daily counts
    // =========================================================================

    #[test]
    fn test_daily_counts_zero_fill_every_day() {
        let records = vec![
            record(2024, 1, 1, 9, 1),
            record(2024, 1, 1, 17, 2),
            record(2024, 1, 3, 23, 1),
        ];
        let counts = build_daily_counts(&records, &range(day(2024, 1, 1), day(2024, 1, 3)), None);

        let entries: Vec<_> = counts.iter().map(|(d, c)| (*d, *c)).collect();
        assert_eq!(
            entries,
            vec![(day(2024, 1, 1), 2), (day(2024, 1, 2), 0), (day(2024, 1, 3), 1)]
        );
    }

    #[test]
    fn test_daily_counts_length_matches_range() {
        let counts = build_daily_counts::<Record>(&[], &range(day(2024, 2, 1), day(2024, 3, 1)), None);
        assert_eq!(counts.len(), 30);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_daily_counts_ignore_out_of_range_records() {
        let records = vec![
            record(2023, 12, 31, 23, 1),
            record(2024, 1, 2, 0, 1),
            record(2024, 1, 3, 0, 1),
        ];
        let counts = build_daily_counts(&records, &range(day(2024, 1, 1), day(2024, 1, 2)), None);
        assert_eq!(counts.get(&day(2024, 1, 1)), Some(0));
        assert_eq!(counts.get(&day(2024, 1, 2)), Some(1));
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_daily_counts_owner_filter() {
        let records = vec![
            record(2024, 1, 1, 9, 1),
            record(2024, 1, 1, 10, 2),
            record(2024, 1, 2, 11, 2),
        ];
        let r = range(day(2024, 1, 1), day(2024, 1, 2));

        let mine = build_daily_counts(&records, &r, Some(UserId(2)));
        assert_eq!(mine.get(&day(2024, 1, 1)), Some(1));
        assert_eq!(mine.get(&day(2024, 1, 2)), Some(1));

        let nobody = build_daily_counts(&records, &r, Some(UserId(99)));
        assert_eq!(nobody.total(), 0);
        assert_eq!(nobody.len(), 2);
    }

    #[test]
    fn test_daily_counts_are_ascending() {
        let records = vec![record(2024, 1, 5, 1, 1), record(2024, 1, 1, 1, 1)];
        let counts = build_daily_counts(&records, &range(day(2024, 1, 1), day(2024, 1, 5)), None);
        let dates: Vec<_> = counts.iter().map(|(d, _)| *d).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_daily_counts_serialize_in_date_order() {
        let records = vec![record(2024, 1, 2, 12, 1)];
        let counts = build_daily_counts(&records, &range(day(2024, 1, 1), day(2024, 1, 2)), None);
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"2024-01-01":0,"2024-01-02":1}"#
        );
    }

    // =========================================================================
    // Event categories
    // =========================================================================

    #[test]
    fn test_event_categories_case_insensitive() {
        let events = vec![
            event(1, "Public HOLIDAY", "New Year", day(2024, 1, 1)),
            event(2, "Product Launch", "v2", day(2024, 1, 2)),
            event(3, "major release", "v3", day(2024, 1, 3)),
            event(4, "Team offsite", "Retreat", day(2024, 1, 4)),
        ];
        let map = build_event_category_map(&events, &range(day(2024, 1, 1), day(2024, 1, 31)));

        assert_eq!(map.holidays.len(), 1);
        assert_eq!(map.holidays[&day(2024, 1, 1)], "New Year");
        assert_eq!(map.product_launches.len(), 2);
        assert_eq!(map.product_launches[&day(2024, 1, 2)], "v2");
        assert_eq!(map.product_launches[&day(2024, 1, 3)], "v3");
    }

    #[test]
    fn test_event_matching_both_categories_lands_in_both() {
        let events = vec![event(1, "Holiday product release", "Gala", day(2024, 1, 5))];
        let map = build_event_category_map(&events, &range(day(2024, 1, 1), day(2024, 1, 31)));
        assert_eq!(map.holidays[&day(2024, 1, 5)], "Gala");
        assert_eq!(map.product_launches[&day(2024, 1, 5)], "Gala");
    }

    #[test]
    fn test_event_same_date_last_write_wins() {
        let events = vec![
            event(1, "Holiday", "First", day(2024, 1, 5)),
            event(2, "holiday", "Second", day(2024, 1, 5)),
        ];
        let map = build_event_category_map(&events, &range(day(2024, 1, 1), day(2024, 1, 31)));
        assert_eq!(map.holidays[&day(2024, 1, 5)], "Second");
    }

    #[test]
    fn test_event_outside_range_excluded() {
        let events = vec![
            event(1, "Holiday", "Before", day(2023, 12, 31)),
            event(2, "Holiday", "Edge", day(2024, 1, 31)),
            event(3, "Release", "After", day(2024, 2, 1)),
        ];
        let map = build_event_category_map(&events, &range(day(2024, 1, 1), day(2024, 1, 31)));
        assert_eq!(map.holidays.len(), 1);
        assert!(map.holidays.contains_key(&day(2024, 1, 31)));
        assert!(map.product_launches.is_empty());
    }

    #[test]
    fn test_event_map_without_matches_has_empty_buckets() {
        let map = build_event_category_map(&[], &range(day(2024, 1, 1), day(2024, 1, 31)));
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            serde_json::json!({"holidays": {}, "product_launches": {}})
        );
    }

    // =========================================================================
    // Forecast merging
    // =========================================================================

    #[test]
    fn test_merge_sums_rounded_daily_averages() {
        let a = series(&[("2024-01-01", 10.0), ("2024-01-02", 20.0)]);
        let b = series(&[("2024-01-01", 12.0), ("2024-01-02", 25.0)]);
        // 11 + round(22.5) = 11 + 23
        assert_eq!(merge_and_average_forecasts(&a, &b), Ok(34));
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        let a = series(&[("2024-01-01", 1.0), ("2024-01-02", -1.0)]);
        let b = series(&[("2024-01-01", 2.0), ("2024-01-02", -2.0)]);
        let averaged = average_forecasts(&a, &b).unwrap();
        assert_eq!(averaged[0].forecasted_value, 2.0);
        assert_eq!(averaged[1].forecasted_value, -2.0);
        assert_eq!(averaged[0].date, "2024-01-01");
    }

    #[test]
    fn test_merge_empty_series_is_zero() {
        assert_eq!(merge_and_average_forecasts(&[], &[]), Ok(0));
    }

    #[test]
    fn test_merge_saturates_on_extreme_values() {
        let a = series(&[("2024-01-01", 1e300), ("2024-01-02", 1e300)]);
        let b = series(&[("2024-01-01", 1e300), ("2024-01-02", 1e300)]);
        assert_eq!(merge_and_average_forecasts(&a, &b), Ok(i64::MAX));

        let a = series(&[("2024-01-01", -1e300), ("2024-01-02", -1e300)]);
        assert_eq!(merge_and_average_forecasts(&a, &a), Ok(i64::MIN));
    }

    #[test]
    fn test_merge_length_mismatch() {
        let a = series(&[("2024-01-01", 1.0), ("2024-01-02", 1.0)]);
        let b = series(&[("2024-01-01", 1.0)]);
        assert_eq!(
            merge_and_average_forecasts(&a, &b),
            Err(AggregationError::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_merge_date_mismatch_reports_position() {
        let a = series(&[("2024-01-01", 1.0), ("2024-01-02", 1.0)]);
        let b = series(&[("2024-01-01", 1.0), ("2024-01-03", 1.0)]);
        match merge_and_average_forecasts(&a, &b) {
            Err(AggregationError::DateMismatch { index, left, right }) => {
                assert_eq!(index, 1);
                assert_eq!(left, "2024-01-02");
                assert_eq!(right, "2024-01-03");
            }
            other => panic!("expected date mismatch, got {:?}", other),
        }
    }
}
