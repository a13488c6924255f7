/// Logging setup (§7 "User-visible behavior"): `--json` emits
/// `{event, ts, data}`-shaped JSON lines to stdout; text mode keeps
/// `tracing`'s default formatter with `WARN:`/`ERROR:`-prefixed records.
use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("beacon={level}")));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if json {
        let _ = subscriber.json().with_writer(std::io::stdout).try_init();
    } else {
        let _ = subscriber.with_writer(std::io::stderr).try_init();
    }
}
