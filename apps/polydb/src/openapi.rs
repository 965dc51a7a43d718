use domain_embeddings::EmbeddingsApiDoc;
use domain_tokenizer::TokenizerApiDoc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "PolyDB API",
    description = "Text ingestion, similarity search and tokenizer debugging"
))]
struct RootDoc;

/// Combined documentation for every route served by `polydb serve`
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        RootDoc::openapi()
            .merge_from(EmbeddingsApiDoc::openapi())
            .merge_from(TokenizerApiDoc::openapi())
    }
}
