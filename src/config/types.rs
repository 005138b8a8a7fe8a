use chrono::NaiveDate;
use serde::Deserialize;

/// Municipal districts of Irkutsk oblast, the default crawl scope
pub const DEFAULT_REGIONS: &[u32] = &[
    7419, 7449, 4854, 1125, 1126, 7340, 7377, 1127, 11487, 4855, 7420, 6249, 4856, 7446, 1128,
    1129, 7442, 4857, 4858, 1130, 7393, 6657, 6746, 7351, 1131, 4864, 7408, 11572, 4859, 7311,
    1132, 4860, 4861, 7400, 3716, 1133, 7386, 35, 7418, 7362, 4862, 4863, 7324, 1134, 4865, 4866,
    7459, 4867, 4868, 7329, 4869, 4870, 7431, 4871, 4872, 4873, 4874, 1135, 4875, 4876, 4877,
    4878, 4879, 7394, 11189, 4880, 7321, 7378, 4881, 1136, 1137, 7292, 1138, 6519, 4882, 4883,
    1139, 7413, 4884, 7361, 1140, 5895, 4885, 7395, 4886, 1141, 1142, 1143, 217, 4887, 7322, 7387,
    4888, 4891, 1144, 4889, 1145, 7414, 7350, 7404, 7289, 4890, 7349,
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for hh-harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Region identifiers to crawl
    pub regions: Vec<u32>,

    /// Windows reaching back before this year are never queried
    pub earliest_year: i32,

    /// Maximum number of listing pages per window (API ceiling)
    pub max_pages: u32,

    /// Postings requested per listing page
    pub per_page: u32,

    /// Result count at which a window is split instead of slid
    pub split_threshold: u64,

    /// Width of the initial window and of every slide step, in days
    pub window_days: u32,

    /// Date the first window ends on; today when unset
    pub anchor_date: Option<NaiveDate>,

    /// Maximum number of regions traversed at once
    pub max_concurrent_regions: u32,

    /// Number of workers fetching posting details
    pub detail_workers: u32,

    /// Capacity of the pending posting queue
    pub queue_capacity: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS.to_vec(),
            earliest_year: 2005,
            max_pages: 20,
            per_page: 100,
            split_threshold: 2000,
            window_days: 7,
            anchor_date: None,
            max_concurrent_regions: 8,
            detail_workers: 4,
            queue_capacity: 1000,
        }
    }
}

/// Upstream API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiConfig {
    /// API root, e.g. `https://api.hh.ru`
    pub base_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Minimum time between requests to the same host (milliseconds)
    pub minimum_request_delay: u64,

    /// Maximum number of requests in flight
    pub max_concurrent_requests: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.hh.ru".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            minimum_request_delay: 1000,
            max_concurrent_requests: 4,
            timeout_secs: 30,
        }
    }
}

/// Where emitted postings are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// Rows in a SQLite database
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Path to the JSON-lines file or SQLite database
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jsonl,
            path: "./vacancies.jsonl".to_string(),
        }
    }
}
