use backoff::ExponentialBackoffBuilder;
use futures::stream::{BoxStream, Stream, StreamExt};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::ListParams,
    runtime::{watcher, WatchStreamExt},
    Api, Client,
};

use crate::util::{WATCH_BACKOFF_INITIAL, WATCH_BACKOFF_MAX, WATCH_TIMEOUT_SECS};

/// Namespace watcher events, starting with the initial listing.
pub type NamespaceStream = BoxStream<'static, watcher::Result<watcher::Event<Namespace>>>;

/// Watches every namespace in the cluster. The watcher resumes from the
/// last seen resourceVersion and only relists once that has expired.
pub fn namespace_stream(client: Client) -> NamespaceStream {
    let api: Api<Namespace> = Api::all(client);
    let lp = ListParams::default().timeout(WATCH_TIMEOUT_SECS);
    with_backoff(watcher(api, lp))
}

/// Delays polling `stream` again after each error, doubling the delay
/// up to a cap. Any successful event resets it. Never gives up.
pub fn with_backoff<S>(stream: S) -> NamespaceStream
where
    S: Stream<Item = watcher::Result<watcher::Event<Namespace>>> + Send + 'static,
{
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(WATCH_BACKOFF_INITIAL)
        .with_max_interval(WATCH_BACKOFF_MAX)
        .with_max_elapsed_time(None)
        .build();
    stream.backoff(backoff).boxed()
}
