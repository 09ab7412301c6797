//! Rendering DuckDB values for display.

use duckdb::types::{TimeUnit, ValueRef};

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// DuckDB stores `infinity` and `-infinity` dates as these day counts
const DATE_INFINITY: i32 = i32::MAX;
const DATE_NEG_INFINITY: i32 = -i32::MAX;

/// Render a single value the way the CLI prints it
pub fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Boolean(b) => b.to_string(),
        ValueRef::TinyInt(n) => n.to_string(),
        ValueRef::SmallInt(n) => n.to_string(),
        ValueRef::Int(n) => n.to_string(),
        ValueRef::BigInt(n) => n.to_string(),
        ValueRef::HugeInt(n) => n.to_string(),
        ValueRef::UTinyInt(n) => n.to_string(),
        ValueRef::USmallInt(n) => n.to_string(),
        ValueRef::UInt(n) => n.to_string(),
        ValueRef::UBigInt(n) => n.to_string(),
        ValueRef::Float(f) => f.to_string(),
        ValueRef::Double(f) => f.to_string(),
        ValueRef::Decimal(d) => d.to_string(),
        ValueRef::Text(s) => String::from_utf8_lossy(s).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
        ValueRef::Timestamp(unit, ts) => {
            let micros = to_micros(unit, ts);
            let secs = micros.div_euclid(1_000_000);
            let nanos = (micros.rem_euclid(1_000_000) * 1000) as u32;
            match chrono::DateTime::from_timestamp(secs, nanos) {
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => ts.to_string(),
            }
        }
        ValueRef::Date32(DATE_INFINITY) => "infinity".to_string(),
        ValueRef::Date32(DATE_NEG_INFINITY) => "-infinity".to_string(),
        ValueRef::Date32(days) => {
            match UNIX_EPOCH_DAYS_FROM_CE
                .checked_add(days)
                .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
            {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => days.to_string(),
            }
        }
        ValueRef::Time64(unit, t) => {
            let micros = to_micros(unit, t);
            let secs = u32::try_from(micros.div_euclid(1_000_000)).ok();
            let nanos = (micros.rem_euclid(1_000_000) * 1000) as u32;
            let time =
                secs.and_then(|s| chrono::NaiveTime::from_num_seconds_from_midnight_opt(s, nanos));
            match time {
                Some(time) => time.format("%H:%M:%S").to_string(),
                None => t.to_string(),
            }
        }
        other => format!("{:?}", other),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_scalars() {
        assert_eq!(render_value(ValueRef::Null), "NULL");
        assert_eq!(render_value(ValueRef::Int(42)), "42");
        assert_eq!(render_value(ValueRef::Text(b"lincoln")), "lincoln");
        assert_eq!(render_value(ValueRef::Blob(&[1, 2, 3])), "<blob 3 bytes>");
    }

    #[test]
    fn test_render_date() {
        assert_eq!(render_value(ValueRef::Date32(0)), "1970-01-01");
        assert_eq!(render_value(ValueRef::Date32(19_723)), "2024-01-01");
    }

    #[test]
    fn test_render_special_dates() {
        assert_eq!(render_value(ValueRef::Date32(i32::MAX)), "infinity");
        assert_eq!(render_value(ValueRef::Date32(-i32::MAX)), "-infinity");
        // outside chrono's range: the raw day count
        assert_eq!(
            render_value(ValueRef::Date32(i32::MAX - 1)),
            (i32::MAX - 1).to_string()
        );
        assert_eq!(render_value(ValueRef::Date32(i32::MIN)), i32::MIN.to_string());
    }

    #[test]
    fn test_render_time_out_of_range() {
        assert_eq!(
            render_value(ValueRef::Time64(TimeUnit::Microsecond, 3_723_000_000)),
            "01:02:03"
        );
        assert_eq!(render_value(ValueRef::Time64(TimeUnit::Second, -5)), "-5");
        assert_eq!(
            render_value(ValueRef::Time64(TimeUnit::Second, i64::MAX)),
            i64::MAX.to_string()
        );
    }

    #[test]
    fn test_render_timestamp_units() {
        assert_eq!(
            render_value(ValueRef::Timestamp(TimeUnit::Microsecond, 1_704_067_200_000_000)),
            "2024-01-01 00:00:00"
        );
        assert_eq!(
            render_value(ValueRef::Timestamp(TimeUnit::Second, 1_704_067_200)),
            "2024-01-01 00:00:00"
        );
    }
}
