use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// 请求节流：上一次请求结束到下一次请求开始之间至少间隔 `min_interval`
///
/// 慢响应不会吃掉间隔：`release` 记录的是请求完成时刻。
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// 在发起网络请求前调用，必要时等待到允许的时间点
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    /// 请求完成（无论成败）后调用，间隔从此刻起算
    pub fn release(&mut self) {
        self.last_request = Some(Instant::now());
    }
}
