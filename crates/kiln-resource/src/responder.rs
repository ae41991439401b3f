//! The error responder.

use kiln_core::{ApiRequest, ApiResponse, ErrorResponse, ResponseSink};

/// Logs `error` and, when a sink is given, writes it as the response.
///
/// Internal failures and 5xx statuses are logged at `error`, everything else
/// at `warn`. Filters that already produced their own response pass `None`
/// to get the log record only.
pub fn respond(request: &ApiRequest, sink: Option<&mut ResponseSink>, error: &ErrorResponse) {
    log_error(request, error);

    let Some(sink) = sink else {
        return;
    };
    let response = ApiResponse::json(error.status(), &error.to_envelope()).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to serialize error envelope");
        ApiResponse::new(error.status())
    });
    sink.write(response);
}

fn log_error(request: &ApiRequest, error: &ErrorResponse) {
    let status = error.status().as_u16();
    let internal = error.is_internal();
    let context = error.context().unwrap_or_default();
    let source = error
        .locator()
        .and_then(|s| s.parameter.as_deref().or(s.pointer.as_deref()))
        .unwrap_or_default();
    let form_data = format!("{:?}", request.form_data());

    if internal || error.status().is_server_error() {
        tracing::error!(
            status,
            internal,
            description = error.message(),
            context,
            source,
            method = %request.method(),
            uri = %request.uri(),
            form_data,
            "request failed"
        );
    } else {
        tracing::warn!(
            status,
            internal,
            description = error.message(),
            context,
            source,
            method = %request.method(),
            uri = %request.uri(),
            form_data,
            "request rejected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};

    #[test]
    fn test_respond_writes_envelope() {
        let request = ApiRequest::new(Method::GET, Uri::from_static("/hello"));
        let mut sink = ResponseSink::new();
        let error = ErrorResponse::unauthorized("Invalid accesstoken", "GET");

        respond(&request, Some(&mut sink), &error);

        let response = sink.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["errors"][0]["description"], "Invalid accesstoken");
        assert_eq!(body["errors"][0]["context"], "GET");
    }

    #[test]
    fn test_respond_without_sink_only_logs() {
        let request = ApiRequest::new(Method::POST, Uri::from_static("/widgets"));
        respond(&request, None, &ErrorResponse::internal("boom", "POST"));
    }

    #[test]
    fn test_respond_keeps_earlier_response() {
        let request = ApiRequest::new(Method::GET, Uri::from_static("/w"));
        let mut sink = ResponseSink::new();
        sink.write(ApiResponse::new(StatusCode::OK));

        respond(&request, Some(&mut sink), &ErrorResponse::bad_request("late", "validate"));

        assert_eq!(sink.into_response().unwrap().status(), StatusCode::OK);
    }
}
