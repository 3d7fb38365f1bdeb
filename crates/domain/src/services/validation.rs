use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use client_manager_core::{ManagerError, ManagerResult};

/// 必填字符串字段，空白视为缺失
pub fn require<'a>(field: &str, value: Option<&'a str>) -> ManagerResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ManagerError::validation(field, format!("{field} 不能为空"))),
    }
}

/// 区间边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// 解析日期参数
///
/// 接受 RFC 3339 时间戳或 `YYYY-MM-DD`。纯日期作为区间起点取当天零点，
/// 作为区间终点取当天最后一毫秒，使终点日期整天都被包含。
pub fn parse_date(field: &str, value: Option<&str>, bound: DateBound) -> ManagerResult<DateTime<Utc>> {
    let raw = require(field, value)?.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ManagerError::validation(field, format!("{field} 格式无效，应为 YYYY-MM-DD 或 RFC 3339: {raw}"))
    })?;

    let time = match bound {
        DateBound::Start => NaiveTime::MIN,
        DateBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };

    Ok(date.and_time(time).and_utc())
}

/// 解析统计区间，要求起点不晚于终点
pub fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> ManagerResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_date("start_date", start, DateBound::Start)?;
    let end = parse_date("end_date", end, DateBound::End)?;

    if start > end {
        return Err(ManagerError::validation("start_date", "start_date 不能晚于 end_date"));
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_require() {
        assert_eq!(require("key", Some("timeout")).unwrap(), "timeout");
        assert!(require("key", Some("   ")).is_err());

        match require("namespace", None) {
            Err(ManagerError::Validation { field, .. }) => assert_eq!(field, "namespace"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_plain_dates() {
        let start = parse_date("start_date", Some("2024-03-01"), DateBound::Start).unwrap();
        assert_eq!((start.year(), start.month(), start.day(), start.hour()), (2024, 3, 1, 0));

        let end = parse_date("end_date", Some("2024-03-01"), DateBound::End).unwrap();
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        let ts = parse_date("start_date", Some("2024-03-01T08:00:00+08:00"), DateBound::Start).unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.day(), 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_date("start_date", Some("03/01/2024"), DateBound::Start).is_err());
        assert!(parse_date_range(Some("2024-03-02"), Some("2024-03-01")).is_err());
        assert!(parse_date_range(Some("2024-03-01"), None).is_err());
        assert!(parse_date_range(Some("2024-03-01"), Some("2024-03-01")).is_ok());
    }
}
