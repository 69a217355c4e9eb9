pub mod config {
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_db_path")]
        pub db_path: PathBuf,
        #[serde(default = "default_public_dir")]
        pub public_dir: PathBuf,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::default())
        }

        /// Loads configuration from the given environment source.
        pub fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment)
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Path of the front-end entry document served at `/`.
        pub fn index_file(&self) -> PathBuf {
            self.public_dir.join("index.html")
        }
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                port: default_port(),
                db_path: default_db_path(),
                public_dir: default_public_dir(),
            }
        }
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_db_path() -> PathBuf {
        PathBuf::from("db.json")
    }

    fn default_public_dir() -> PathBuf {
        PathBuf::from("public")
    }

}
pub mod store;
pub mod task;
pub mod web;
