use crate::error::{EpexError, Result};
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Price of one delivery window on the market page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeWindowPrice {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub price: f64,
}

impl TimeWindowPrice {
    /// Half-open containment `start <= t < end`
    ///
    /// A window whose end is not after its start (`23:45 - 00:00`) runs past
    /// midnight and contains `t >= start` as well as `t < end`.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start < self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

/// Parse an `"HH:MM - HH:MM"` label into its bounds
pub fn parse_window_label(label: &str) -> Result<(NaiveTime, NaiveTime)> {
    let (start, end) = label
        .split_once('-')
        .ok_or_else(|| EpexError::parse(format!("time window label '{label}'")))?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")?;
    Ok((start, end))
}

/// Pair labels with prices by position, stopping at the shorter list
pub fn pair_windows<S: AsRef<str>>(labels: &[S], prices: &[f64]) -> Result<Vec<TimeWindowPrice>> {
    labels
        .iter()
        .zip(prices)
        .map(|(label, price)| {
            let (start, end) = parse_window_label(label.as_ref())?;
            Ok(TimeWindowPrice {
                start,
                end,
                price: *price,
            })
        })
        .collect()
}

/// Price of the first window containing `now`
pub fn select_price(windows: &[TimeWindowPrice], now: NaiveTime) -> Option<f64> {
    windows.iter().find(|w| w.contains(now)).map(|w| w.price)
}

/// Wall-clock time in the market timezone, truncated to the minute
pub fn market_time(now: DateTime<Utc>, tz: Tz) -> NaiveTime {
    let local = now.with_timezone(&tz).time();
    NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample() -> Vec<TimeWindowPrice> {
        pair_windows(&["14:00 - 14:15", "14:15 - 14:30"], &[10.0, 20.0]).unwrap()
    }

    #[test]
    fn picks_window_containing_now() {
        assert_eq!(select_price(&sample(), t(14, 16)), Some(20.0));
        assert_eq!(select_price(&sample(), t(14, 0)), Some(10.0));
    }

    #[test]
    fn boundary_belongs_to_later_window() {
        assert_eq!(select_price(&sample(), t(14, 15)), Some(20.0));
    }

    #[test]
    fn no_window_contains_now() {
        assert_eq!(select_price(&sample(), t(14, 30)), None);
        assert_eq!(select_price(&sample(), t(9, 0)), None);
    }

    #[test]
    fn pairing_stops_at_shorter_list() {
        let labels = ["00:00 - 00:15", "00:15 - 00:30", "00:30 - 00:45"];
        assert_eq!(pair_windows(&labels, &[1.0, 2.0, 3.0, 4.0]).unwrap().len(), 3);
        assert_eq!(pair_windows(&labels, &[1.0]).unwrap().len(), 1);
        let pairs = pair_windows(&labels, &[1.0, 2.0]).unwrap();
        assert_eq!(pairs[1].start, t(0, 15));
        assert_eq!(pairs[1].price, 2.0);
    }

    #[test]
    fn last_window_of_day_crosses_midnight() {
        let w = pair_windows(&["23:45 - 00:00"], &[55.0]).unwrap();
        assert_eq!(select_price(&w, t(23, 50)), Some(55.0));
        assert_eq!(select_price(&w, t(23, 44)), None);
        assert_eq!(select_price(&w, t(0, 0)), None);
    }

    #[test]
    fn malformed_label_is_parse_error() {
        assert!(parse_window_label("14:00").is_err());
        assert!(parse_window_label("14h00 - 14h15").is_err());
        assert!(pair_windows(&["bogus"], &[1.0]).is_err());
    }

    #[test]
    fn market_time_uses_brussels_clock() {
        // 13:16:42 UTC in March is 14:16 CET
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 13, 16, 42).unwrap();
        assert_eq!(market_time(now, chrono_tz::Europe::Brussels), t(14, 16));
        // Summer time: UTC+2
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 59).unwrap();
        assert_eq!(market_time(now, chrono_tz::Europe::Brussels), t(14, 0));
    }
}
