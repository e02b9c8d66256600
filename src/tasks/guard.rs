use std::sync::atomic::{AtomicBool, Ordering};

/// 单飞标志：上一次执行未结束时，新的 tick 直接跳过
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_enter(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 离开作用域（包括出错返回）时清除标志
#[derive(Debug)]
pub struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 单次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 完成，附带处理条数
    Completed(usize),
    /// 上一次仍在执行
    Busy,
    OutsideWindow,
    /// 已记录日志
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_entry_is_rejected_until_release() {
        let flight = SingleFlight::new();
        let guard = flight.try_enter().unwrap();
        assert!(flight.is_busy());
        assert!(flight.try_enter().is_none());
        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_enter().is_some());
    }
}
