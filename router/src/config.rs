use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub weather_api_key: Option<String>,
    pub weather_api_url: String,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub memory_capacity: usize,
    pub planner_timeout_secs: u64,
    pub synthesis_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            gemini_endpoint: std::env::var("GEMINI_ENDPOINT").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            weather_api_key: non_empty_var("WEATHER_API_KEY"),
            weather_api_url: std::env::var("WEATHER_API_URL").unwrap_or_else(|_| {
                "http://api.openweathermap.org/data/2.5/weather".to_string()
            }),
            news_api_key: non_empty_var("NEWS_API_KEY"),
            news_api_url: std::env::var("NEWS_API_URL")
                .unwrap_or_else(|_| "https://newsapi.org/v2/everything".to_string()),
            memory_capacity: std::env::var("MEMORY_CAPACITY")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            planner_timeout_secs: std::env::var("PLANNER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()?,
            synthesis_timeout_secs: std::env::var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()?,
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            planner: Duration::from_secs(self.planner_timeout_secs),
            synthesis: Duration::from_secs(self.synthesis_timeout_secs),
            fetch: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

/// Per-call budgets for every external call the router makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub planner: Duration,
    pub synthesis: Duration,
    pub fetch: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            planner: Duration::from_secs(15),
            synthesis: Duration::from_secs(12),
            fetch: Duration::from_secs(8),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
