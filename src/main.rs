use std::{env, panic, process};

use backtrace::Backtrace;
use clap::Parser;

use libprefab::cli::{GlobalOptions, Options};

fn main() {
    install_panic_hook();

    let options = Options::parse();
    init_logging(&options.global);

    if let Err(err) = options.run() {
        log::error!("{:?}", err);
        process::exit(1);
    }
}

fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<no message>".to_owned());

        log::error!("prefab {} hit an internal error.", env!("CARGO_PKG_VERSION"));
        log::error!("Details: {}", message);

        if let Some(location) = panic_info.location() {
            log::error!("at {}:{}", location.file(), location.line());
        }

        if env::var("RUST_BACKTRACE").map_or(false, |var| var == "1") {
            eprintln!("{:?}", Backtrace::new());
        } else {
            eprintln!("note: set RUST_BACKTRACE=1 to print a backtrace.");
        }

        process::exit(1);
    }));
}

fn init_logging(global: &GlobalOptions) {
    let log_filter = match global.verbosity {
        0 => "info",
        1 => "info,libprefab=debug",
        2 => "info,libprefab=trace",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_module_path(false)
        .format_timestamp(None)
        .format_indent(Some(8))
        .write_style(global.color.into())
        .init();
}
