use axum::{extract::Request, middleware::Next, response::Response};

use crate::errors::ErrorReport;

/// Logs every failed request at error level.
///
/// Handlers return errors; [`AppError`](crate::AppError) turns them into a
/// response carrying an [`ErrorReport`]. This middleware is the single place
/// those reports are written out, with the request method and path.
pub async fn log_errors(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        tracing::error!(
            %method,
            path = %path,
            status = response.status().as_u16(),
            error_code = report.code.code(),
            error = %report.code,
            message = %report.message,
            "Request failed"
        );
    }

    response
}
