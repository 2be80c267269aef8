//! Tracing subscriber setup. `RUST_LOG` picks the filter and
//! `LOG_FORMAT=json` switches to JSON lines.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "budget_tracker=debug,axum=info,tower_http=info";

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if wants_json(std::env::var("LOG_FORMAT").ok().as_deref()) {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}
