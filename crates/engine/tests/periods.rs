use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use engine::{MoneyCents, Month, Period, Tz};

fn timezone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(chrono_tz::Europe::Rome),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::Asia::Kolkata),
    ]
}

proptest! {
    #[test]
    fn prop_month_text_round_trip(year in 1i32..=9999, month in 1u32..=12) {
        let parsed: Month = format!("{year:04}-{month:02}").parse().unwrap();
        prop_assert_eq!(parsed.year(), year);
        prop_assert_eq!(parsed.month(), month);
        prop_assert_eq!(parsed.to_string(), format!("{year:04}-{month:02}"));
    }

    #[test]
    fn prop_consecutive_months_tile(year in 1970i32..=9998, month in 1u32..=12, tz in timezone()) {
        let current = Month::new(year, month).unwrap();
        let next = current.next();
        prop_assert!(next > current);
        prop_assert_eq!(next.first_day().day(), 1);
        prop_assert_eq!(current.range(tz).end, next.range(tz).start);
        prop_assert!(current.range(tz).start < current.range(tz).end);
    }

    #[test]
    fn prop_instant_falls_in_its_month(secs in 0i64..253_402_300_799 - 86_400 * 62, tz in timezone()) {
        let instant = Utc.timestamp_opt(secs, 0).unwrap();
        let month = Month::containing(local_day(instant, tz));
        prop_assert!(month.range(tz).contains(instant));
        prop_assert!(!month.next().range(tz).contains(instant));
    }

    #[test]
    fn prop_trailing_window_covers_today(days in 1u32..=365, secs in 86_400i64 * 400..4_000_000_000, tz in timezone()) {
        let now = Utc.timestamp_opt(secs, 0).unwrap();
        let window = Period::trailing_days(days, now, tz).unwrap();
        prop_assert!(window.contains(now));
        prop_assert!(!window.contains(now + Duration::nanoseconds(1)));
        prop_assert!(!window.contains(window.start - Duration::nanoseconds(1)));
    }

    #[test]
    fn prop_average_is_bounded(amounts in prop::collection::vec(1i64..1_000_000, 1..50)) {
        let total: MoneyCents = amounts.iter().copied().map(MoneyCents::new).sum();
        let average = total.average(amounts.len() as u64);
        let min = amounts.iter().copied().min().unwrap();
        let max = amounts.iter().copied().max().unwrap();
        prop_assert!(min <= average.cents() && average.cents() <= max);
    }
}

fn local_day(instant: chrono::DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

#[test]
fn december_rolls_into_january() {
    let december = Month::new(2024, 12).unwrap();
    assert_eq!(december.next(), Month::new(2025, 1).unwrap());
    assert_eq!(
        december.range(Tz::UTC).end,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    );
}
