//! Contains command line arguments and related helpers that are shared
//! between the binaries.

use {
    std::fmt::{self, Display, Formatter},
    tracing::level_filters::LevelFilter,
};

#[derive(clap::Parser)]
#[group(skip)]
pub struct LoggingArguments {
    /// Filter directives for the tracing subscriber, using env_logger syntax.
    #[clap(long, env, default_value = "warn,gateway=debug,shared=debug")]
    pub log_filter: String,

    /// Minimum level at which logs are additionally mirrored to stderr.
    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        Ok(())
    }
}

pub fn display_option(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<impl Display>,
) -> std::fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

pub fn display_secret_option<T>(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<T>,
) -> std::fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}
