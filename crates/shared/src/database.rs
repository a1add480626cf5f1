//! 数据库连接管理模块
//!
//! 托管 PostgreSQL 的连接池。表结构与行级权限由托管后端维护，
//! 这里只负责连接参数、就绪检查和优雅关闭。

use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, instrument, warn};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// 就绪检查结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub latency_ms: u64,
    pub connections: u32,
    pub idle: usize,
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 建立连接池
    ///
    /// 每个连接都带上 application_name 和 statement_timeout，
    /// 慢查询不会一直占住连接
    #[instrument(skip(config), fields(application = %config.application_name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = connect_options(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections,
            statement_timeout_ms = config.statement_timeout_ms,
            "数据库连接池已建立"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 执行一次往返查询，返回耗时和连接池占用
    pub async fn ping(&self) -> Result<PoolStatus> {
        let started = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if latency_ms > 1_000 {
            warn!(latency_ms, "数据库响应缓慢");
        }

        Ok(PoolStatus {
            latency_ms,
            connections: self.pool.size(),
            idle: self.pool.num_idle(),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("数据库连接池已关闭");
    }
}

/// 由配置生成连接参数
fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    let mut options =
        PgConnectOptions::from_str(&config.url)?.application_name(&config.application_name);

    if config.statement_timeout_ms > 0 {
        options = options.options([(
            "statement_timeout",
            config.statement_timeout_ms.to_string(),
        )]);
    }

    Ok(options)
}
