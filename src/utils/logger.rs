use chrono::Utc;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Directory that timestamped log files are written into.
pub const LOG_DIR: &str = ".logs";

/// Initialize logging. The console layer honors `RUST_LOG` and defaults to
/// INFO for this crate. When `file_tag` is given, a second layer writes
/// DEBUG-level logs to `.logs/<YYYY-MM-DDTHH-MM-SS>.<tag>.log` and the
/// created path is returned.
pub fn init_logger(file_tag: Option<&str>) -> anyhow::Result<Option<PathBuf>> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(ChronoUtc::rfc_3339())
        .compact();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pricewatch=info,analyze=info"));

    let registry = tracing_subscriber::registry().with(console_layer.with_filter(env_filter));

    match file_tag {
        Some(tag) => {
            fs::create_dir_all(LOG_DIR)?;
            let filename = format!("{}.{}.log", Utc::now().format("%Y-%m-%dT%H-%M-%S"), tag);
            let path = PathBuf::from(LOG_DIR).join(filename);
            let file = File::create(&path)?;

            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(Arc::new(file))
                .with_filter(LevelFilter::DEBUG);

            registry.with(file_layer).init();
            Ok(Some(path))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

/// Contextual logger so every service tags its lines consistently.
#[derive(Debug)]
pub struct Logger {
    context: String,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }

    pub fn info(&self, message: &str) {
        info!("{}: {}", self.context, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("{}: {}", self.context, message);
    }

    pub fn error(&self, message: &str) {
        error!("{}: {}", self.context, message);
    }

    pub fn debug(&self, message: &str) {
        debug!("{}: {}", self.context, message);
    }
}

/// Performance timing helper.
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn log_elapsed(&self) {
        info!("{} completed in {:.1}ms", self.name, self.elapsed_ms());
    }
}
