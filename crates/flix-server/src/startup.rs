//! Server startup utilities.

use flix_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
    ________  _
   / ____/ / (_)  __
  / /_  / / / / |/_/
 / __/ / / / />  <
/_/   /_/ /_/_/|_|
    "#
    );
}

/// Prints where the server listens and what it serves.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Catalogue: http://{}/", addr);
    info!("Health:    http://{}/health", addr);
    info!("Backend:   {}", config.repository.backend);
    info!("Data file: {}", config.repository.data_path.display());
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }
}
