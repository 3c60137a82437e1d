use std::io::Write;

use console::style;
use env_logger::Builder;
use log::{Level, LevelFilter};

fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `RUST_LOG` takes precedence over `-v`.
pub fn init(verbosity: u8) {
    let mut builder = Builder::new();
    builder.filter_level(level_filter(verbosity));
    builder.parse_default_env();

    builder.format(|buf, record| {
        let label = match record.level() {
            Level::Error => style("ERROR").red().bold(),
            Level::Warn => style("WARN ").yellow().bold(),
            Level::Info => style("INFO ").bold(),
            Level::Debug => style("DEBUG").dim(),
            Level::Trace => style("TRACE").dim(),
        };
        writeln!(buf, "{} {}", label, record.args())
    });

    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0), LevelFilter::Warn);
        assert_eq!(level_filter(1), LevelFilter::Info);
        assert_eq!(level_filter(2), LevelFilter::Debug);
        assert_eq!(level_filter(7), LevelFilter::Trace);
    }
}
