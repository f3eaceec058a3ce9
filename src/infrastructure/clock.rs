//! 时钟
//!
//! "今天"的判断和写入时间戳都依赖当前时间；统一从 `Clock` 取，测试中可注入固定时间。

use chrono::{DateTime, FixedOffset, Local, Utc};

/// 当前时间来源
pub trait Clock: Send + Sync {
    /// 带时区偏移的当前时间，日历日比较都在该偏移下进行
    fn now(&self) -> DateTime<FixedOffset>;
}

/// 系统时钟（本机时区或固定偏移）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// 从 RFC 3339 字符串构造
    pub fn parse(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value).ok().map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
