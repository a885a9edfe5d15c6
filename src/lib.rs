// Stemka: Russian keyword-stem extraction service
//
// Ranks candidate n-gram phrases of a document by semantic relevance
// (SBERT embeddings, cosine similarity), reduces each to its Snowball
// stem, and returns the top-N unique stems. Each module corresponds to
// one step of that pipeline plus the HTTP surface around it.

pub mod config;
pub mod download;
pub mod embedding;
pub mod keywords;
pub mod readiness;
pub mod stem;
pub mod web;
