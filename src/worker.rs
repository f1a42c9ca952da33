use crate::api::TestService;
use crate::models::{WorkerRequest, WorkerResponse};
use crate::session::run_request;
use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::sync::Arc;
use std::thread;

/// Spawns the network worker. Each request runs as its own task so a slow
/// export never holds back a generation; responses come back in completion
/// order. The worker exits once the request channel is closed.
pub fn spawn_worker(
    service: Arc<dyn TestService>,
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("textquiz::worker".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start worker runtime");
                    return;
                }
            };

            for request in requests.iter() {
                let service = Arc::clone(&service);
                let responses = responses.clone();
                runtime.spawn(async move {
                    let response = run_request(service.as_ref(), request).await;
                    if responses.send(response).is_err() {
                        tracing::debug!("Response channel closed, dropping response");
                    }
                });
            }

            tracing::debug!("Worker channel disconnected, exiting");
        })
}
