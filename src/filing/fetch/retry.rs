use std::time::Duration;

/// 重试策略：最多 `max_attempts` 次请求，第 n 次失败后等待
/// `initial_backoff * multiplier^(n-1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_secs(10),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// 不等待的重试策略
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// 第 `attempt` 次（从1开始）失败之后的等待时长
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        let factor = self.multiplier.max(1).saturating_pow(exp);
        self.initial_backoff.saturating_mul(factor)
    }

    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// 抓取策略：最小请求间隔 + 重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// 任意两次网络请求之间的最小间隔，跨记录、跨重试都生效
    pub min_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}
