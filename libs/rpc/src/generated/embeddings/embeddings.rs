// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct EmbeddingsRequest {
    #[prost(int64, repeated, tag="1")]
    pub token_ids: ::prost::alloc::vec::Vec<i64>,
    #[prost(string, tag="2")]
    pub text: ::prost::alloc::string::String,
    #[prost(string, tag="3")]
    pub correlation_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct EmbeddingsResponse {
    #[prost(bool, tag="1")]
    pub success: bool,
    #[prost(string, tag="2")]
    pub error_message: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct FindSimilarRequest {
    #[prost(int64, repeated, tag="1")]
    pub token_ids: ::prost::alloc::vec::Vec<i64>,
    #[prost(int32, tag="2")]
    pub top_k: i32,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct FindSimilarResponse {
    /// Base64-encoded candidate texts, most similar first.
    #[prost(string, repeated, tag="1")]
    pub similar_texts: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
include!("embeddings.tonic.rs");
// @@protoc_insertion_point(module)
