use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};

/// 开奖方所在时区固定为 UTC+9
const KST_OFFSET_HOURS: i64 = 9;

/// 每周起点：周日 06:00（当地时间）
const WEEK_START_HOUR: i64 = 6;

pub fn to_local(now: DateTime<Utc>) -> NaiveDateTime {
    now.naive_utc() + Duration::hours(KST_OFFSET_HOURS)
}

pub fn from_local(local: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(local - Duration::hours(KST_OFFSET_HOURS), Utc)
}

/// 可购买：周日至周五 06:00-24:00，周六 06:00-20:00
pub fn is_purchasable(now: DateTime<Utc>) -> bool {
    let local = to_local(now);
    let hour = local.hour();
    if hour < 6 {
        return false;
    }
    !(local.weekday() == Weekday::Sat && hour >= 20)
}

/// 可推荐：周日 06:00 至周六 20:00
pub fn is_recommendable(now: DateTime<Utc>) -> bool {
    let local = to_local(now);
    let hour = local.hour();
    match local.weekday() {
        Weekday::Sun => hour >= 6,
        Weekday::Sat => hour < 20,
        _ => true,
    }
}

/// 当前所在周的起点（周日 06:00 当地时间），返回 UTC
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = to_local(now);
    let days_back = local.weekday().num_days_from_sunday() as i64;
    let sunday = local.date() - Duration::days(days_back);
    let mut start = sunday.and_time(NaiveTime::MIN) + Duration::hours(WEEK_START_HOUR);
    if local < start {
        start -= Duration::days(7);
    }
    from_local(start)
}

/// 下一次每周定点触发时刻（严格晚于 now）
pub fn next_weekly_fire(now: DateTime<Utc>, weekday: Weekday, hour: u32, minute: u32) -> DateTime<Utc> {
    let local = to_local(now);
    let ahead = (7 + weekday.num_days_from_sunday() as i64
        - local.weekday().num_days_from_sunday() as i64)
        % 7;
    let date = local.date() + Duration::days(ahead);
    let mut fire = date.and_time(NaiveTime::MIN)
        + Duration::hours(hour as i64)
        + Duration::minutes(minute as i64);
    if fire <= local {
        fire += Duration::days(7);
    }
    from_local(fire)
}
