//! Campus Hero 评选 Worker
//!
//! 按 cron 表达式（默认每周一 00:00 UTC）评选上一个自然周积分最高的用户。
//! 启动时先补评一次，评选本身对同一周幂等。

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use lostfound_shared::observability::metrics;
use tracing::{error, info, warn};

use crate::error::{Result, ServiceError};
use crate::models::LeaderboardEntry;
use crate::service::RewardService;

const WORKER_NAME: &str = "campus_hero";

pub struct CampusHeroWorker {
    rewards: Arc<RewardService>,
    schedule: Schedule,
    expression: String,
}

impl CampusHeroWorker {
    /// 创建 Worker，cron 表达式为六段格式（秒 分 时 日 月 周）
    pub fn new(rewards: Arc<RewardService>, cron_expression: &str) -> Result<Self> {
        let schedule = Schedule::from_str(cron_expression).map_err(|e| {
            ServiceError::Validation(format!("无效的 cron 表达式 {}: {}", cron_expression, e))
        })?;
        Ok(Self {
            rewards,
            schedule,
            expression: cron_expression.to_string(),
        })
    }

    /// 下一次触发时间
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// 主循环：持续调度直到进程退出
    pub async fn run(&self) {
        info!(schedule = %self.expression, "CampusHeroWorker 已启动");

        self.tick(Utc::now()).await;

        loop {
            let now = Utc::now();
            let Some(next) = self.next_fire_after(now) else {
                warn!("cron 表达式没有后续触发时间，CampusHeroWorker 退出");
                return;
            };

            let wait = (next - now).to_std().unwrap_or_default();
            info!(next_run = %next, "等待下一次 Campus Hero 评选");
            tokio::time::sleep(wait).await;

            self.tick(next).await;
        }
    }

    /// 执行一次评选，失败只记录日志
    pub async fn tick(&self, now: DateTime<Utc>) -> Option<LeaderboardEntry> {
        let hero = match self.rewards.crown_weekly_hero(now).await {
            Ok(hero) => hero,
            Err(e) => {
                error!(error = %e, "Campus Hero 评选失败");
                None
            }
        };

        metrics::set_worker_last_run(WORKER_NAME);
        hero
    }
}
