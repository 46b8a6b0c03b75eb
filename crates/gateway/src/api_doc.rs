//! # OpenAPIドキュメント
//!
//! ハンドラの `#[utoipa::path]` 注釈から生成し、JSONとRapiDoc UIで公開する。

use relay_types::{
    EndpointMap, ErrorResponse, HealthResponse, MediaTransferRequest, MediaTransferResponse,
    ServiceIndex,
};
use utoipa::OpenApi;

use crate::endpoints;

/// OpenAPIドキュメント(JSON)のパス
pub const OPENAPI_PATH: &str = "/api/v1/media/openapi.json";

/// ドキュメントUIのパス
pub const DOCS_PATH: &str = "/swagger/index.html";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Media Relay API",
        description = "公開URLのメディアをオブジェクトストレージへストリーミング転送し、パブリックURLを返す。"
    ),
    paths(
        endpoints::service::handle_index,
        endpoints::service::handle_health,
        endpoints::transfer::handle_transfer,
    ),
    components(schemas(
        MediaTransferRequest,
        MediaTransferResponse,
        ErrorResponse,
        HealthResponse,
        ServiceIndex,
        EndpointMap,
    )),
    tags(
        (name = "media", description = "メディア転送"),
        (name = "service", description = "サービス情報")
    )
)]
pub struct ApiDoc;
