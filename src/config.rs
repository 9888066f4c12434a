use std::convert::TryInto;
use std::ffi::OsStr;
use std::fs::File;

use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::swing::DEFAULT_SWING_ALPHA;

// Set some default values
const DEFAULT_NUM_ITEMS_TO_RECOMMEND: usize = 10;
const DEFAULT_RECENT_ITEMS_WINDOW: usize = 10;
const DEFAULT_SWING_RETRIEVAL_K: usize = 10;
const DEFAULT_MAX_RATING: f64 = 5.0;

pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
}

pub struct ServerConfig {
    pub host: String,
    pub port: usize,
    pub num_workers: usize,
}

pub struct DataConfig {
    pub interactions_path: String,
}

pub struct ModelConfig {
    pub num_items_to_recommend: usize,
    pub recent_items_window: usize,
    pub swing_retrieval_k: usize,
    pub swing_alpha: f64,
    pub max_rating: f64,
}

impl AppConfig {
    pub fn new(config_path: String) -> AppConfig {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path)
                .expect("Loading configuration file failed.");
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "interactions_path"]),
                OsStr::new("INTERACTIONS_DATA"),
            ),
            (
                ConfPath::from(&["server", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    fn parse(conf: justconfig::Config) -> AppConfig {
        AppConfig {
            server: ServerConfig::parse(&conf, ConfPath::from(&["server"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"])),
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"])),
        }
    }
}

impl ServerConfig {
    fn parse(conf: &Config, path: ConfPath) -> ServerConfig {
        ServerConfig {
            host: conf
                .get(path.push("host"))
                .trim()
                .value()
                .unwrap_or_else(|_| String::from("0.0.0.0")),
            port: conf.get(path.push("port")).trim().value().unwrap_or(8080),
            num_workers: conf
                .get(path.push("num_workers"))
                .trim()
                .value()
                // Detect number of CPUs
                .unwrap_or_else(|_| sys_info::cpu_num().unwrap_or_default().try_into().unwrap()),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> DataConfig {
        DataConfig {
            interactions_path: conf
                .get(path.push("interactions_path"))
                .trim()
                .value()
                .unwrap(),
        }
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> ModelConfig {
        ModelConfig {
            num_items_to_recommend: conf
                .get(path.push("num_items_to_recommend"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_ITEMS_TO_RECOMMEND),
            recent_items_window: conf
                .get(path.push("recent_items_window"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_RECENT_ITEMS_WINDOW),
            swing_retrieval_k: conf
                .get(path.push("swing_retrieval_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_SWING_RETRIEVAL_K),
            swing_alpha: conf
                .get(path.push("swing_alpha"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_SWING_ALPHA),
            max_rating: conf
                .get(path.push("max_rating"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_MAX_RATING),
        }
    }
}
