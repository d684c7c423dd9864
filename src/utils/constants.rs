/// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://api.waqi.info";
pub const TOKEN_ENV_VAR: &str = "AQICN_TOKEN";
pub const API_STATUS_OK: &str = "ok";

/// File names
pub const DEFAULT_OUTPUT_FILE: &str = "aqi_data.csv";
pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_CONFIG_FILE: &str = "aqi-crawler.toml";

/// Environment prefix for settings overrides (AQI_CRAWLER_MAX_WORKERS, ...)
pub const SETTINGS_ENV_PREFIX: &str = "AQI_CRAWLER";

/// Processing defaults
pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const MAX_WORKERS_LIMIT: usize = 256;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Built-in station catalog: (location name, WAQI station id).
pub const BUILTIN_STATIONS: &[(&str, &str)] = &[
    ("Hanoi", "1583"),
    ("Bangkok", "5773"),
    ("Delhi", "2554"),
    ("Mumbai", "12454"),
    ("Seoul", "5508"),
    ("Beijing", "1451"),
    ("Shanghai", "1437"),
    ("Shinjuku (Tokyo)", "2289"),
    ("Osaka", "5543"),
    ("Paris", "5722"),
    ("London", "5724"),
    ("Frankfurt", "10842"),
    ("Hamburg", "6125"),
    ("Moscow", "13618"),
    ("Wuhan", "1529"),
    ("Warsaw (Poland)", "3399"),
    ("Winnellie (Australia)", "6442"),
    ("Bangalore (India)", "3758"),
    ("Chennai (India)", "13739"),
    ("Boston", "3577"),
    ("Georgia", "3906"),
    ("Phoenix", "5944"),
    ("Hyderabad (India)", "14125"),
    ("Denver", "6323"),
    ("Daegu", "5523"),
    ("Gyeonggi", "1696"),
    ("Nagoya", "5540"),
    ("Fukuoka", "5551"),
    ("Kawasaki", "5580"),
    ("Shenzhen", "1539"),
    ("Zhongshan (Taiwan)", "1597"),
    ("Chongqing", "1453"),
    ("Istanbul (Turkey)", "4151"),
];
