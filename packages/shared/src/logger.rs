//! Logging setup for the Hiroba binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose log output is enabled by default, in addition to the binary itself.
const WORKSPACE_CRATES: [&str; 3] = ["hiroba_shared", "hiroba_server", "hiroba_client"];

/// Build the default filter directive string, e.g.
/// `hiroba_shared=info,hiroba_server=info,hiroba_client=info,hiroba_server=info`.
fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    WORKSPACE_CRATES
        .iter()
        .copied()
        .chain(std::iter::once(binary_name))
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hiroba-server", "hiroba-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use hiroba_shared::logger::setup_logger;
///
/// setup_logger("hiroba-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_workspace_and_binary() {
        // テスト項目: デフォルトのフィルタにワークスペースの全 crate とバイナリが含まれる
        // given (前提条件):
        let binary_name = "hiroba-client";

        // when (操作):
        let directives = default_directives(binary_name, "info");

        // then (期待する結果):
        assert_eq!(
            directives,
            "hiroba_shared=info,hiroba_server=info,hiroba_client=info,hiroba_client=info"
        );
    }
}
