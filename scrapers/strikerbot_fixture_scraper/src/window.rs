use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

use crate::config::WindowConfig;
use crate::types::{Fixture, FixtureStatus, ScheduledFixture};

pub const LIVE_LABEL: &str = "LIVE";
pub const UNKNOWN_TIME_LABEL: &str = "TBD";

/// Puts an `HH:MM` kickoff on `now`'s date. A kickoff further in the past than
/// the next-day tolerance is taken to be tomorrow's. A tolerance too large for
/// chrono never rolls over.
pub fn resolve_kickoff(
    kickoff_time: &str,
    now: NaiveDateTime,
    window: &WindowConfig,
) -> Option<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(kickoff_time.trim(), "%H:%M").ok()?;
    let same_day = now.date().and_time(time);

    let rolls_over = TimeDelta::try_minutes(window.next_day_tolerance_minutes)
        .is_some_and(|tolerance| now - same_day > tolerance);

    if rolls_over {
        same_day.checked_add_signed(TimeDelta::days(1))
    } else {
        Some(same_day)
    }
}

pub fn time_until_label(status: FixtureStatus, minutes_from_now: i64, window: &WindowConfig) -> String {
    let recently_started = (window.recent_past_minutes.saturating_neg()..=0).contains(&minutes_from_now);

    if status.is_in_play() || recently_started {
        LIVE_LABEL.to_string()
    } else if minutes_from_now > 0 {
        format!("in {}min", minutes_from_now)
    } else {
        format!("{}min ago", -minutes_from_now)
    }
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    ((to - from).num_seconds() as f64 / 60.0).round() as i64
}

fn schedule(fixture: Fixture, now: NaiveDateTime, window: &WindowConfig) -> Option<ScheduledFixture> {
    let Some(kickoff) = resolve_kickoff(&fixture.kickoff_time, now, window) else {
        debug!(
            "Unparseable kickoff {:?} for {}, keeping as TBD",
            fixture.kickoff_time, fixture.match_id
        );
        return Some(ScheduledFixture {
            fixture,
            calculated_datetime: now,
            minutes_from_now: 0,
            time_until_kickoff: UNKNOWN_TIME_LABEL.to_string(),
        });
    };

    // A bound chrono cannot represent leaves that side of the window open.
    let earliest = TimeDelta::try_minutes(window.recent_past_minutes)
        .and_then(|past| now.checked_sub_signed(past));
    let latest = TimeDelta::try_hours(window.horizon_hours)
        .and_then(|ahead| now.checked_add_signed(ahead));
    let in_window = earliest.map_or(true, |earliest| kickoff >= earliest)
        && latest.map_or(true, |latest| kickoff <= latest);

    if !fixture.status.is_in_play() && !in_window {
        return None;
    }

    let minutes_from_now = minutes_between(now, kickoff);
    let time_until_kickoff = time_until_label(fixture.status, minutes_from_now, window);

    Some(ScheduledFixture {
        fixture,
        calculated_datetime: kickoff,
        minutes_from_now,
        time_until_kickoff,
    })
}

/// Keeps live fixtures and those inside the window, live ones first and the
/// rest by minutes from now. Ties keep scan order.
pub fn filter_and_sort(
    fixtures: Vec<Fixture>,
    now: NaiveDateTime,
    window: &WindowConfig,
) -> Vec<ScheduledFixture> {
    let total = fixtures.len();
    let mut scheduled: Vec<ScheduledFixture> = fixtures
        .into_iter()
        .filter_map(|fixture| schedule(fixture, now, window))
        .collect();

    scheduled.sort_by_key(|f| {
        if f.fixture.status.is_in_play() {
            (0, 0)
        } else {
            (1, f.minutes_from_now)
        }
    });

    debug!(
        "Filtered {} of {} fixtures into the {}h window",
        scheduled.len(),
        total,
        window.horizon_hours
    );
    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn fixture(kickoff: &str, home: &str, status: FixtureStatus) -> Fixture {
        Fixture::new(kickoff, home, "Away Team", status, None)
    }

    #[test]
    fn test_resolve_same_day() {
        let window = WindowConfig::default();
        assert_eq!(resolve_kickoff("13:00", at(12, 45), &window), Some(at(13, 0)));
        // 40 minutes ago stays on today
        assert_eq!(resolve_kickoff("12:05", at(12, 45), &window), Some(at(12, 5)));
    }

    #[test]
    fn test_resolve_rolls_to_next_day() {
        let window = WindowConfig::default();
        let resolved = resolve_kickoff("11:30", at(12, 45), &window).unwrap();
        assert_eq!(resolved, at(11, 30) + TimeDelta::days(1));
    }

    #[test]
    fn test_resolve_late_evening_kickoff_after_midnight() {
        let window = WindowConfig::default();
        let now = at(0, 10);
        let resolved = resolve_kickoff("23:50", now, &window).unwrap();
        // yesterday's 23:50 pushed forward a day
        assert_eq!(resolved, at(23, 50));
        assert!(filter_and_sort(vec![fixture("23:50", "Home", FixtureStatus::Upcoming)], now, &window).is_empty());
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        let window = WindowConfig::default();
        assert_eq!(resolve_kickoff("TBC", at(12, 0), &window), None);
        assert_eq!(resolve_kickoff("25:00", at(12, 0), &window), None);
    }

    #[test]
    fn test_labels() {
        let window = WindowConfig::default();
        assert_eq!(time_until_label(FixtureStatus::Upcoming, 15, &window), "in 15min");
        assert_eq!(time_until_label(FixtureStatus::Upcoming, -10, &window), "LIVE");
        assert_eq!(time_until_label(FixtureStatus::Upcoming, 0, &window), "LIVE");
        assert_eq!(time_until_label(FixtureStatus::Live, 90, &window), "LIVE");
        assert_eq!(time_until_label(FixtureStatus::HT, -300, &window), "LIVE");
        assert_eq!(time_until_label(FixtureStatus::Finished, -10, &window), "LIVE");
        assert_eq!(time_until_label(FixtureStatus::Finished, -31, &window), "31min ago");
        assert_eq!(time_until_label(FixtureStatus::Upcoming, -45, &window), "45min ago");
    }

    #[test]
    fn test_window_bounds() {
        let window = WindowConfig::default();
        let now = at(12, 0);
        let fixtures = vec![
            fixture("11:29", "Too Early", FixtureStatus::Upcoming),
            fixture("11:30", "Recent Past", FixtureStatus::Upcoming),
            fixture("14:00", "Horizon Edge", FixtureStatus::Upcoming),
            fixture("14:01", "Too Late", FixtureStatus::Upcoming),
        ];

        let kept: Vec<_> = filter_and_sort(fixtures, now, &window)
            .into_iter()
            .map(|f| (f.fixture.home_team, f.minutes_from_now))
            .collect();

        assert_eq!(
            kept,
            vec![("Recent Past".to_string(), -30), ("Horizon Edge".to_string(), 120)]
        );
    }

    #[test]
    fn test_live_fixtures_always_kept_and_first() {
        let window = WindowConfig::default();
        let now = at(12, 0);
        let fixtures = vec![
            fixture("12:30", "Later", FixtureStatus::Upcoming),
            fixture("18:00", "Live Far", FixtureStatus::Live),
            fixture("12:10", "Soon", FixtureStatus::Upcoming),
            fixture("08:00", "Half Time", FixtureStatus::HT),
        ];

        let order: Vec<_> = filter_and_sort(fixtures, now, &window)
            .into_iter()
            .map(|f| (f.fixture.home_team, f.time_until_kickoff))
            .collect();

        assert_eq!(
            order,
            vec![
                ("Live Far".to_string(), "LIVE".to_string()),
                ("Half Time".to_string(), "LIVE".to_string()),
                ("Soon".to_string(), "in 10min".to_string()),
                ("Later".to_string(), "in 30min".to_string()),
            ]
        );
    }

    #[test]
    fn test_unparseable_time_kept_as_tbd() {
        let window = WindowConfig::default();
        let now = at(12, 0);
        let fixtures = vec![
            fixture("12:20", "Soon", FixtureStatus::Upcoming),
            fixture("late", "Unknown", FixtureStatus::Upcoming),
            fixture("11:50", "Started", FixtureStatus::Upcoming),
        ];

        let out = filter_and_sort(fixtures, now, &window);
        let names: Vec<_> = out.iter().map(|f| f.fixture.home_team.as_str()).collect();
        assert_eq!(names, vec!["Started", "Unknown", "Soon"]);

        let tbd = &out[1];
        assert_eq!(tbd.time_until_kickoff, "TBD");
        assert_eq!(tbd.calculated_datetime, now);
        assert_eq!(tbd.minutes_from_now, 0);
    }

    #[test]
    fn test_custom_horizon() {
        let window = WindowConfig {
            horizon_hours: 4,
            ..WindowConfig::default()
        };
        let out = filter_and_sort(
            vec![fixture("15:30", "Evening", FixtureStatus::Upcoming)],
            at(12, 0),
            &window,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time_until_kickoff, "in 210min");
    }

    #[test]
    fn test_zero_tolerance_rolls_any_past_kickoff() {
        let window = WindowConfig {
            next_day_tolerance_minutes: 0,
            ..WindowConfig::default()
        };
        let resolved = resolve_kickoff("12:35", at(12, 45), &window).unwrap();
        assert_eq!(resolved, at(12, 35) + TimeDelta::days(1));
        assert_eq!(resolve_kickoff("12:45", at(12, 45), &window), Some(at(12, 45)));
    }

    #[test]
    fn test_wide_tolerance_keeps_kickoff_on_today() {
        let window = WindowConfig {
            next_day_tolerance_minutes: 180,
            ..WindowConfig::default()
        };
        assert_eq!(resolve_kickoff("10:00", at(12, 45), &window), Some(at(10, 0)));
    }

    #[test]
    fn test_narrow_recent_past_window() {
        let window = WindowConfig {
            recent_past_minutes: 10,
            ..WindowConfig::default()
        };
        let now = at(12, 0);
        let fixtures = vec![
            fixture("11:40", "Twenty Ago", FixtureStatus::Upcoming),
            fixture("11:50", "Ten Ago", FixtureStatus::Upcoming),
        ];

        let kept: Vec<_> = filter_and_sort(fixtures, now, &window)
            .into_iter()
            .map(|f| (f.fixture.home_team, f.time_until_kickoff))
            .collect();
        assert_eq!(kept, vec![("Ten Ago".to_string(), "LIVE".to_string())]);

        assert_eq!(time_until_label(FixtureStatus::Upcoming, -15, &window), "15min ago");
    }

    #[test]
    fn test_finished_fixture_in_recent_past_is_labelled_live() {
        let window = WindowConfig::default();
        let out = filter_and_sort(
            vec![fixture("11:45", "Full Time", FixtureStatus::Finished)],
            at(12, 0),
            &window,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].minutes_from_now, -15);
        assert_eq!(out[0].time_until_kickoff, "LIVE");
    }

    #[test]
    fn test_oversized_window_does_not_panic() {
        let now = at(12, 0);
        let fixtures = || {
            vec![
                fixture("10:30", "Earlier", FixtureStatus::Upcoming),
                fixture("18:00", "Evening", FixtureStatus::Upcoming),
            ]
        };

        let huge_horizon = WindowConfig {
            horizon_hours: 10_000_000_000,
            ..WindowConfig::default()
        };
        let out = filter_and_sort(fixtures(), now, &huge_horizon);
        let names: Vec<_> = out.iter().map(|f| f.fixture.home_team.as_str()).collect();
        // 10:30 rolls to tomorrow, which an open horizon keeps
        assert_eq!(names, vec!["Evening", "Earlier"]);

        let huge_past = WindowConfig {
            recent_past_minutes: i64::MAX / 2,
            next_day_tolerance_minutes: i64::MAX,
            ..WindowConfig::default()
        };
        let out = filter_and_sort(fixtures(), now, &huge_past);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].fixture.home_team, "Earlier");
        assert_eq!(out[0].minutes_from_now, -90);
        assert_eq!(out[0].time_until_kickoff, "LIVE");
    }
}
