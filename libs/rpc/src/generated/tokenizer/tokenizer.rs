// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct EncodeRequest {
    #[prost(string, tag="1")]
    pub text: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct EncodeResponse {
    #[prost(int64, repeated, tag="1")]
    pub tokens: ::prost::alloc::vec::Vec<i64>,
    #[prost(string, repeated, tag="2")]
    pub token_texts: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
include!("tokenizer.tonic.rs");
// @@protoc_insertion_point(module)
