//! A trivial tracing facility for following a query from program
//! text through the engine and back into answer sets.

use bitmask_enum::bitmask;

#[bitmask]
pub enum Trace {
    All,
    /// Assembled program text.
    Compile,
    /// Staging, command lines, and exit statuses.
    Invoke,
    /// Dropped, truncated, and optimal answers.
    Parse,
}

impl Trace {
    /// Read a comma-separated list of level names, e.g., `compile,parse`.
    /// Unknown names are ignored.
    pub fn from_names(names: &str) -> Self {
        names
            .split(',')
            .map(str::trim)
            .fold(Trace::none(), |trace, name| {
                trace
                    | match name.to_ascii_lowercase().as_str() {
                        "all" => Trace::all_bits(),
                        "compile" => Trace::Compile,
                        "invoke" => Trace::Invoke,
                        "parse" => Trace::Parse,
                        _ => Trace::none(),
                    }
            })
    }
}

#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects(Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}
