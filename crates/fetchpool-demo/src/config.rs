use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use fetchpool::PoolConfig;

/// Runtime configuration for the `fetchpool-demo` binary.
///
/// Values are parsed from CLI arguments or environment variables (a `.env`
/// file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fetchpool-demo",
    version,
    about = "Fetches pages of a JSON API concurrently through a fetchpool worker pool"
)]
pub struct CliArgs {
    /// Number of pool workers, which is also the queue capacity.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 5)]
    pub num_workers: usize,

    /// Per-request ceiling, in seconds, applied by every worker's client.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_SECS`
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Collection endpoint to page through. `?page=N` is appended per request.
    ///
    /// Environment variable: `BASE_URL`
    #[arg(
        long,
        env = "BASE_URL",
        default_value_t = String::from("https://rickandmortyapi.com/api/character")
    )]
    pub base_url: String,

    /// Pages to fetch, starting at page 1.
    ///
    /// Environment variable: `PAGES`
    #[arg(long, env = "PAGES", default_value_t = 2)]
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub pool: PoolConfig,
    pub base_url: String,
    pub pages: usize,
}

impl DemoConfig {
    /// URL of the given 1-based page.
    pub fn page_url(&self, page: usize) -> String {
        format!("{}?page={page}", self.base_url)
    }
}

impl TryFrom<CliArgs> for DemoConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        if args.pages == 0 {
            bail!("PAGES must be greater than 0");
        }

        if args.base_url.trim().is_empty() {
            bail!("BASE_URL must not be empty");
        }

        let pool = PoolConfig::new(args.num_workers)
            .with_request_timeout(Duration::from_secs(args.request_timeout_secs));

        Ok(Self {
            pool,
            base_url: args.base_url.trim_end_matches('/').to_owned(),
            pages: args.pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs::parse_from(["fetchpool-demo"])
    }

    #[test]
    fn defaults_are_valid() {
        let config = DemoConfig::try_from(args()).unwrap();
        assert_eq!(config.pool.num_workers, 5);
        assert_eq!(config.pool.request_timeout, Duration::from_secs(10));
        assert_eq!(
            config.page_url(2),
            "https://rickandmortyapi.com/api/character?page=2"
        );
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut zero_workers = args();
        zero_workers.num_workers = 0;
        assert!(DemoConfig::try_from(zero_workers).is_err());

        let mut zero_pages = args();
        zero_pages.pages = 0;
        assert!(DemoConfig::try_from(zero_pages).is_err());

        let mut zero_timeout = args();
        zero_timeout.request_timeout_secs = 0;
        assert!(DemoConfig::try_from(zero_timeout).is_err());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut with_slash = args();
        with_slash.base_url = "http://localhost:8080/api/character/".into();
        let config = DemoConfig::try_from(with_slash).unwrap();
        assert_eq!(config.page_url(1), "http://localhost:8080/api/character?page=1");
    }
}
