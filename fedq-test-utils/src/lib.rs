use std::fmt::Debug;
use std::sync::Once;

use fedq_result::Result;
use fedq_types::{GroupKey, Value};

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}

/// Group key from a list of values.
pub fn group_key(values: impl IntoIterator<Item = Value>) -> GroupKey {
    values.into_iter().collect()
}

/// Drain a fallible stream, panicking with the first error.
pub fn collect_ok<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = Result<T>>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Ok(item) => item,
            Err(err) => panic!("item {idx} failed: {err}"),
        })
        .collect()
}

/// Drain a fallible stream that must fail, returning the error.
pub fn expect_err<T: Debug, I>(items: I) -> fedq_result::Error
where
    I: IntoIterator<Item = Result<T>>,
{
    for item in items {
        if let Err(err) = item {
            return err;
        }
    }
    panic!("stream completed without an error")
}
