use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter, in `RUST_LOG` syntax.
pub const LOG_ENV: &str = "TIERGRID_LOG";

/// Send `tiergrid-cli`'s diagnostics to stderr as JSON lines.
///
/// Query results own stdout, so log records never interleave with them. Only errors are
/// shown unless `TIERGRID_LOG` asks for more (`TIERGRID_LOG=tiergrid_cli=debug` traces each
/// slice and search). A second call leaves the first subscriber in place.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(LevelFilter::ERROR.into())
        .from_env_lossy();

    let json_lines = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_span_list(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_lines)
        .try_init();
}
