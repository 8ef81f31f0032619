//! 时间工具函数: 业务时区转换
//!
//! 所有日期→时间戳转换统一在 handler/stats 层完成，
//! storage 层只接收 `i64` Unix millis。

use chrono::{Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
///
/// `param` 是查询参数名，用于错误信息。
pub fn parse_date(value: &str, param: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid_date_filter(param, value))
}

/// 解析月份字符串 (YYYY-MM 或 YYYY-MM-DD)，返回该月任意一天
pub fn parse_month(value: &str, param: &str) -> AppResult<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::invalid_date_filter(param, value))
}

/// 本地时间 → Unix millis (业务时区)
///
/// 重叠 (夏令时回拨) 取较早的时刻；
/// 不存在 (夏令时跳跃) 顺延一小时，仍失败则按 UTC 解释。
fn local_to_millis(naive: NaiveDateTime, tz: Tz) -> i64 {
    naive
        .and_local_timezone(tz)
        .earliest()
        .or_else(|| (naive + Duration::hours(1)).and_local_timezone(tz).earliest())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00.000) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_to_millis(date.and_time(chrono::NaiveTime::MIN), tz)
}

/// 日期结束 (23:59:59.999) → Unix millis (业务时区)
///
/// 次日零点减 1 毫秒，调用方使用 `<= end` (含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    match date.succ_opt() {
        Some(next) => day_start_millis(next, tz) - 1,
        None => day_start_millis(date, tz) + 86_399_999,
    }
}

/// Unix millis → RFC 3339 (业务时区，毫秒精度)
pub fn millis_to_local_rfc3339(millis: i64, tz: Tz) -> String {
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, false),
        None => millis.to_string(),
    }
}

/// 当前日期 (业务时区)
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAIGON: Tz = chrono_tz::Asia::Ho_Chi_Minh;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15", "day").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(parse_date("2024-02-30", "day").is_err());
        assert!(parse_date("15/03/2024", "day").is_err());
    }

    #[test]
    fn test_parse_month_accepts_both_forms() {
        let a = parse_month("2024-02", "month").unwrap();
        let b = parse_month("2024-02-17", "month").unwrap();
        assert_eq!(a, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(b, NaiveDate::from_ymd_opt(2024, 2, 17).unwrap());
        assert!(parse_month("2024-13", "month").is_err());
        assert!(parse_month("", "month").is_err());
    }

    #[test]
    fn test_day_bounds_in_business_timezone() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let start = day_start_millis(date, SAIGON);
        let end = day_end_millis(date, SAIGON);

        // 2024-03-15 00:00 +07:00 == 2024-03-14 17:00 UTC
        assert_eq!(start, 1_710_435_600_000);
        assert_eq!(end - start, 86_399_999);
    }

    #[test]
    fn test_dst_day_is_23_hours() {
        let tz: Tz = chrono_tz::Europe::Madrid;
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let span = day_end_millis(date, tz) - day_start_millis(date, tz);
        assert_eq!(span, 23 * 3_600_000 - 1);
    }

    #[test]
    fn test_rfc3339_output() {
        assert_eq!(
            millis_to_local_rfc3339(1_710_435_600_000, SAIGON),
            "2024-03-15T00:00:00.000+07:00"
        );
    }
}
