// @generated
// This file wires up buf-generated protobuf code
// Note: The prost files already include!() the tonic files automatically

pub mod embeddings {
    include!("generated/embeddings/embeddings.rs");
    // embeddings.tonic.rs is auto-included by embeddings.rs
}

pub mod tokenizer {
    include!("generated/tokenizer/tokenizer.rs");
    // tokenizer.tonic.rs is auto-included by tokenizer.rs
}
