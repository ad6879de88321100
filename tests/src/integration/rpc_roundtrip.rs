//! # JSON-RPC Round-Trips
//!
//! The gateway router in front of a real ledger, driven with
//! `tower::ServiceExt::oneshot`.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::fixtures::{memory_ledger, server_for};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn post(router: &Router, body: Value) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn call(id: u64, method: &str, params: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
    }

    // =============================================================================
    // ROUND-TRIPS
    // =============================================================================

    #[tokio::test]
    async fn test_epoch_scenario_over_rpc() {
        let ledger = memory_ledger();
        let router = server_for(&ledger).router();

        let r = post(&router, call(1, "gradients_sendDcDm", json!({"valueA":"0.5","valueB":"0.1","epochId":"7"}))).await;
        assert_eq!(r["result"], json!({"aggregatedA":"0.5","aggregatedB":"0.1","count":"1"}));

        let r = post(&router, call(2, "gradients_sendDcDm", json!({"dm":"0.6","dc":"0.2","epochID":"8"}))).await;
        assert_eq!(r["result"]["count"], "1");

        let r = post(&router, call(3, "gradients_sendDcDm", json!(["0.6", "0.2", "7"]))).await;
        assert_eq!(r["result"]["count"], "2");
        let a = r["result"]["aggregatedA"].as_str().unwrap();
        assert!(a.contains("0.5") && a.contains("0.6"));
    }

    #[tokio::test]
    async fn test_lifecycle_methods_over_rpc() {
        let ledger = memory_ledger();
        ledger.seed_if_empty().unwrap();
        let router = server_for(&ledger).router();

        let r = post(&router, call(1, "gradients_queryAllRecords", Value::Null)).await;
        assert_eq!(r["result"].as_array().unwrap().len(), 5);

        let r = post(&router, call(2, "gradients_revokeGradients", json!({"recordId":"REC1"}))).await;
        assert_eq!(r["result"], true);

        let r = post(&router, call(3, "gradients_queryRecord", json!(["REC1"]))).await;
        assert_eq!(r["result"]["revoked"], true);
        assert_eq!(r["result"]["dmvalue"], "0.21");

        let r = post(&router, call(4, "gradients_queryRecord", json!(["REC9"]))).await;
        assert_eq!(r["error"]["code"], -32001);

        let r = post(&router, call(5, "gradients_queryRecordsByEpoch", json!({"epochId":"-1"}))).await;
        assert_eq!(r["result"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_failed_request_keeps_serving() {
        let ledger = memory_ledger();
        let router = server_for(&ledger).router();

        let batch = json!([
            call(1, "gradients_revokeGradients", json!(["missing"])),
            call(2, "gradients_sendDcDm", json!({"valueA":"1"})),
            call(3, "gradients_sendDcDm", json!(["1", "2", "3"])),
        ]);
        let r = post(&router, batch).await;
        let responses = r.as_array().unwrap();
        assert_eq!(responses[0]["error"]["code"], -32001);
        assert_eq!(responses[1]["error"]["code"], -32602);
        assert_eq!(responses[2]["result"]["count"], "1");

        let r = post(&router, call(4, "gradients_queryAllRecords", Value::Null)).await;
        assert_eq!(r["result"].as_array().unwrap().len(), 1);
    }
}
