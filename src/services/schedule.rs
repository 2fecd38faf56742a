//! Ajuste de horarios
//!
//! Recalcula la hora programada de cada checkpoint a partir de la llegada real
//! al primer punto, conservando el desfase relativo entre paradas.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, Timelike, Utc};

const SCHEDULE_FORMAT: &str = "%H:%M";

/// Minutos desde medianoche de una hora "HH:mm"
pub fn parse_schedule_minutes(value: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(value.trim(), SCHEDULE_FORMAT).ok()?;
    Some(i64::from(time.hour()) * 60 + i64::from(time.minute()))
}

/// Hora ajustada de `scheduled` dado el horario base (primer punto) y la
/// llegada real al primer punto.
///
/// Sin llegada real, o con horas no interpretables, devuelve la hora programada
/// tal cual.
pub fn adjusted_time(
    scheduled: &str,
    base_scheduled: &str,
    actual_start: Option<DateTime<Utc>>,
    local_offset: FixedOffset,
) -> String {
    let Some(actual_start) = actual_start else {
        return scheduled.to_string();
    };
    let (Some(scheduled_min), Some(base_min)) =
        (parse_schedule_minutes(scheduled), parse_schedule_minutes(base_scheduled))
    else {
        return scheduled.to_string();
    };

    let adjusted = actual_start.with_timezone(&local_offset) + Duration::minutes(scheduled_min - base_min);
    adjusted.format(SCHEDULE_FORMAT).to_string()
}

/// Desfase local configurado, con UTC como respaldo si el valor no es válido
pub fn local_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kst() -> FixedOffset {
        local_offset(9 * 60)
    }

    fn at_kst(h: u32, m: u32) -> DateTime<Utc> {
        kst()
            .with_ymd_and_hms(2026, 10, 17, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parse_schedule_minutes() {
        assert_eq!(parse_schedule_minutes("05:30"), Some(330));
        assert_eq!(parse_schedule_minutes("23:59"), Some(1439));
        assert_eq!(parse_schedule_minutes("24:00"), None);
        assert_eq!(parse_schedule_minutes("5h30"), None);
    }

    #[test]
    fn test_without_actual_start_returns_scheduled() {
        assert_eq!(adjusted_time("05:30", "05:00", None, kst()), "05:30");
    }

    #[test]
    fn test_shifts_by_actual_start() {
        let actual = at_kst(6, 10);
        assert_eq!(adjusted_time("05:30", "05:00", Some(actual), kst()), "06:40");
        assert_eq!(adjusted_time("05:00", "05:00", Some(actual), kst()), "06:10");
    }

    #[test]
    fn test_wraps_past_midnight() {
        let actual = at_kst(23, 55);
        assert_eq!(adjusted_time("23:50", "23:30", Some(actual), kst()), "00:15");
    }

    #[test]
    fn test_unparsable_schedule_is_returned_unchanged() {
        let actual = at_kst(6, 10);
        assert_eq!(adjusted_time("soon", "05:00", Some(actual), kst()), "soon");
    }
}
