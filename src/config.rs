use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lotto_api: LottoApiConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LottoApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LottoApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.dhlottery.co.kr".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub purchase_interval_secs: u64,
    pub recommend_interval_secs: u64,
    pub dashboard_interval_secs: u64,
    /// 每周开奖同步时间（UTC+9）
    pub draw_sync_weekday: Weekday,
    pub draw_sync_hour: u32,
    pub draw_sync_minute: u32,
    /// 自动推荐约束使用的统计期数
    pub frequency_window: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            purchase_interval_secs: 1,
            recommend_interval_secs: 600,
            dashboard_interval_secs: 60,
            draw_sync_weekday: Weekday::Sat,
            draw_sync_hour: 21,
            draw_sync_minute: 20,
            frequency_window: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// 为空时允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = env::var("DATABASE_URL")
                    .map_err(|_| "缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: "0.0.0.0".to_string(),
                        port: 8080,
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: 10,
                    },
                    lotto_api: LottoApiConfig::default(),
                    scheduler: SchedulerConfig::default(),
                    cors: CorsConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖），无法解析的值忽略
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = parsed(get("SERVER_PORT")) {
            self.server.port = p;
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(n) = parsed(get("DB_MAX_CONNECTIONS")) {
            self.database.max_connections = n;
        }
        if let Some(v) = get("LOTTO_API_BASE_URL") {
            self.lotto_api.base_url = v;
        }
        if let Some(n) = parsed(get("LOTTO_API_TIMEOUT_SECS")) {
            self.lotto_api.timeout_secs = n;
        }

        // 调度
        if let Some(b) = parsed(get("SCHEDULER_ENABLED")) {
            self.scheduler.enabled = b;
        }
        if let Some(n) = parsed(get("PURCHASE_INTERVAL_SECS")) {
            self.scheduler.purchase_interval_secs = n;
        }
        if let Some(n) = parsed(get("RECOMMEND_INTERVAL_SECS")) {
            self.scheduler.recommend_interval_secs = n;
        }
        if let Some(n) = parsed(get("DASHBOARD_INTERVAL_SECS")) {
            self.scheduler.dashboard_interval_secs = n;
        }
        if let Some(d) = parsed(get("DRAW_SYNC_WEEKDAY")) {
            self.scheduler.draw_sync_weekday = d;
        }
        if let Some(h) = parsed::<u32>(get("DRAW_SYNC_HOUR"))
            && h < 24
        {
            self.scheduler.draw_sync_hour = h;
        }
        if let Some(m) = parsed::<u32>(get("DRAW_SYNC_MINUTE"))
            && m < 60
        {
            self.scheduler.draw_sync_minute = m;
        }
        if let Some(n) = parsed(get("FREQUENCY_WINDOW")) {
            self.scheduler.frequency_window = n;
        }

        if let Some(v) = get("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = parse_origins(&v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "sqlite::memory:"
max_connections = 2

[scheduler]
enabled = false
draw_sync_weekday = "Sat"
"#;

    #[test]
    fn test_file_sections_default() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(!config.scheduler.enabled);
        assert_eq!(config.scheduler.purchase_interval_secs, 1);
        assert_eq!(config.scheduler.recommend_interval_secs, 600);
        assert_eq!(config.scheduler.frequency_window, 20);
        assert_eq!(config.lotto_api.base_url, "https://www.dhlottery.co.kr");
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "8088"),
            ("SCHEDULER_ENABLED", "true"),
            ("FREQUENCY_WINDOW", "30"),
            ("DRAW_SYNC_HOUR", "25"),
            ("DB_MAX_CONNECTIONS", "lots"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
        ]);
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.server.port, 8088);
        assert!(config.scheduler.enabled);
        assert_eq!(config.scheduler.frequency_window, 30);
        // 越界与无法解析的值保持原样
        assert_eq!(config.scheduler.draw_sync_hour, 21);
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
