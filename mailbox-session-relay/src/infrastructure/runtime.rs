use instant::Duration;
use std::future::Future;

/// Platform-agnostic sleep
#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(duration: Duration) {
    use gloo_timers::future::TimeoutFuture;
    TimeoutFuture::new(duration.as_millis() as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(duration: Duration) {
    #[cfg(feature = "native")]
    tokio::time::sleep(duration).await;

    #[cfg(not(feature = "native"))]
    compile_error!("Non-WASM builds require the 'native' feature to be enabled");
}

/// Platform-agnostic detached task spawn
#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    #[cfg(feature = "native")]
    {
        tokio::spawn(future);
    }

    #[cfg(not(feature = "native"))]
    compile_error!("Non-WASM builds require the 'native' feature to be enabled");
}
