//! Entry points an interceptor calls around a tracked operation.
//!
//! Each successful call produces one `Measurement` and one run of the
//! post-measuring hook. The hook runs inside a failure boundary: an `Err`
//! or a panic from it goes to the error-recovery hook and never reaches
//! the caller. Failures of the wrapped work itself are not touched.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::configuration::Configuration;
use crate::error::Error;
use crate::measurement::{CallSite, Measurement};

/// Time `work` against the global configuration.
pub fn measure<T>(call: CallSite, work: impl FnOnce() -> T) -> T {
    measure_with(Configuration::global(), call, work)
}

pub fn measure_with<T>(config: &Configuration, call: CallSite, work: impl FnOnce() -> T) -> T {
    let t0 = Instant::now();
    let value = work();
    let t1 = Instant::now();

    post_measure(config, Measurement::new(call, t0, t1));
    value
}

/// Like `measure`, but an `Err` from `work` skips measuring and is returned
/// unchanged.
pub fn try_measure<T, E>(call: CallSite, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    try_measure_with(Configuration::global(), call, work)
}

pub fn try_measure_with<T, E>(
    config: &Configuration,
    call: CallSite,
    work: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let t0 = Instant::now();
    let value = work()?;
    let t1 = Instant::now();

    post_measure(config, Measurement::new(call, t0, t1));
    Ok(value)
}

/// Time a future from its first poll to completion.
pub async fn measure_async<F: Future>(call: CallSite, work: F) -> F::Output {
    measure_async_with(Configuration::global(), call, work).await
}

pub async fn measure_async_with<F: Future>(
    config: &Configuration,
    call: CallSite,
    work: F,
) -> F::Output {
    let t0 = Instant::now();
    let value = work.await;
    let t1 = Instant::now();

    post_measure(config, Measurement::new(call, t0, t1));
    value
}

/// Report timings the caller already took.
pub fn measure_timings(call: CallSite, t0: Instant, t1: Instant) {
    measure_timings_with(Configuration::global(), call, t0, t1)
}

pub fn measure_timings_with(config: &Configuration, call: CallSite, t0: Instant, t1: Instant) {
    post_measure(config, Measurement::new(call, t0, t1));
}

fn post_measure(config: &Configuration, measurement: Measurement) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        config.run_post_measuring_hook(&measurement)
    }));

    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(source)) => Error::Hook { source },
        Err(payload) => Error::from_panic(payload),
    };
    config.run_error_recovery_hook(&error, measurement.class_name());
}
