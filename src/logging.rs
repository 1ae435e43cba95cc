use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset: this crate at `info` and its
/// dependencies at `warn`, one level more of each with `verbose`.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,scene_lens_lib=debug"
    } else {
        "warn,scene_lens_lib=info"
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A subscriber may already be installed when embedded in a host app.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
