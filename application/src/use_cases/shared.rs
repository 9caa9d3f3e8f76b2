//! Shared utilities for use cases.
//!
//! Deadline enforcement and timing around a single gateway call, used by the
//! dispatcher, the stream collector and the chairman/title calls.

use crate::ports::worker_gateway::{GatewayError, InvokeRequest, WorkerGateway, WorkerReply};
use council_domain::ChatMessage;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Invoke a worker, enforcing `request.timeout`.
///
/// An elapsed deadline becomes [`GatewayError::Timeout`]. When the adapter
/// does not report `elapsed_time`, the measured wall-clock duration is used.
pub(crate) async fn invoke_with_timeout<G: WorkerGateway + ?Sized>(
    gateway: &G,
    request: InvokeRequest,
) -> Result<WorkerReply, GatewayError> {
    let worker = request.worker.clone();
    let timeout = request.timeout;
    let started = Instant::now();

    let mut reply = match tokio::time::timeout(timeout, gateway.invoke(request)).await {
        Ok(result) => result?,
        Err(_) => {
            debug!("Worker {} exceeded {:?}", worker, timeout);
            return Err(GatewayError::Timeout);
        }
    };

    if reply.elapsed_time.is_none() {
        reply.elapsed_time = Some(started.elapsed().as_secs_f64());
    }
    Ok(reply)
}

/// Single user message shared by every call of a stage.
pub(crate) fn user_prompt(prompt: String) -> Arc<[ChatMessage]> {
    Arc::from(vec![ChatMessage::user(prompt)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::{Script, ScriptedGateway};
    use council_domain::{FeatureFlags, WorkerId};
    use std::time::Duration;

    fn request(worker: &str, timeout: Duration) -> InvokeRequest {
        InvokeRequest::new(
            WorkerId::new(worker),
            user_prompt("hi".to_string()),
            timeout,
            FeatureFlags::none(),
        )
    }

    #[tokio::test]
    async fn test_timeout_maps_to_gateway_timeout() {
        let gateway = ScriptedGateway::new().script("m1", vec![Script::Hang]);
        let result = invoke_with_timeout(&gateway, request("m1", Duration::from_millis(20))).await;
        assert_eq!(result, Err(GatewayError::Timeout));
    }

    #[tokio::test]
    async fn test_reported_elapsed_time_is_kept() {
        let gateway = ScriptedGateway::new().script("m1", vec![Script::reply("ok", 42.0)]);
        let reply = invoke_with_timeout(&gateway, request("m1", Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(reply.content, "ok");
        assert_eq!(reply.elapsed_time, Some(42.0));
    }

    #[tokio::test]
    async fn test_missing_elapsed_time_is_measured() {
        let gateway = ScriptedGateway::new().script("m1", vec![Script::unmeasured("ok")]);
        let reply = invoke_with_timeout(&gateway, request("m1", Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(reply.elapsed_time.is_some_and(|t| t >= 0.0));
    }

    #[tokio::test]
    async fn test_gateway_error_passes_through() {
        let gateway = ScriptedGateway::new().script("m1", vec![Script::Fail]);
        let result = invoke_with_timeout(&gateway, request("m1", Duration::from_secs(1))).await;
        assert!(matches!(result, Err(GatewayError::RequestFailed(_))));
    }
}
