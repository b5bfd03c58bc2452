use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            // Log to browser console via tracing-wasm
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(default_filter())
                .with(wasm_layer)
                .try_init();

            // Panics with stacktrace
            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::ffi::OsStr;
        use std::io;
        use std::path::Path;

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        pub const LOG_FILE_ENV: &str = "BODYSYNC_LOG_FILE";
        pub const DEFAULT_LOG_FILE: &str = "logs/bodysync.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Directory and file-name prefix for the rolling log
        fn split_log_path(log_path: &str) -> (&Path, &OsStr) {
            let path = Path::new(log_path);
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };
            (dir, path.file_name().unwrap_or(OsStr::new("bodysync.log")))
        }

        pub fn init() {
            // Console (stderr) layer with file/line
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let log_path = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let (dir, file) = split_log_path(&log_path);
            let (nb_writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            if tracing_subscriber::registry()
                .with(default_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_err()
            {
                return;
            }

            // Hook panics to log with backtrace
            std::panic::set_hook(Box::new(|info| {
                let mut msg = String::new();
                if let Some(loc) = info.location() {
                    msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
                }
                if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
                else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
                else { msg.push_str("<non-string panic>"); }
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
            }));
        }

    }
}
