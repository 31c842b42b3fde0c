use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header::ContentType},
    web,
};

use crate::{
    config::QUOTE_PATH, error::PipelineError, exchange_rate::format_bid, pipeline::RequestPipeline,
    quote_client::RateSource,
};

/// Timeouts and a bad bid are reported in the body of a 200 response; only
/// fetch and storage failures surface as a 500.
impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::RequestTimeout | Self::StorageTimeout | Self::Parse { .. } => StatusCode::OK,
            Self::Network(_) | Self::Decode(_) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RequestTimeout | Self::StorageTimeout | Self::Parse { .. } => {
                HttpResponse::build(self.status_code())
                    .content_type(ContentType::plaintext())
                    .body(self.to_string())
            }
            _ => HttpResponse::new(self.status_code()),
        }
    }
}

/// Registers `GET /cotacao` and the 404 fallback for everything else.
pub fn routes<S>(pipeline: web::Data<RequestPipeline<S>>) -> impl FnOnce(&mut web::ServiceConfig)
where
    S: RateSource + 'static,
{
    move |cfg| {
        cfg.app_data(pipeline)
            .route(QUOTE_PATH, web::get().to(quote::<S>))
            .default_service(web::to(not_found));
    }
}

async fn quote<S: RateSource>(
    pipeline: web::Data<RequestPipeline<S>>,
) -> Result<HttpResponse, PipelineError> {
    let bid = pipeline.handle().await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(format_bid(bid)))
}

async fn not_found() -> Result<HttpResponse, PipelineError> {
    Err(PipelineError::RouteNotFound)
}
