//! # Memora — a local, privacy-preserving semantic memory store
//!
//! Memora ingests short text "memories" tagged with metadata, embeds them
//! into dense unit-norm vectors, and later retrieves them by meaning rather
//! than keyword. The crate is organized as four cooperating components:
//!
//! - [`store`] (A) — the hybrid vector-relational store: SQLite rows plus a
//!   parallel HNSW vector index, bound together by one atomicity contract.
//! - [`embedding`] / [`cache`] (B) — text → unit vector, fronted by a
//!   bounded LRU cache keyed by content hash.
//! - [`scoring`] (C) — pure, deterministic multi-factor ranking
//!   (similarity, recency, priority, usage).
//! - [`service`] (D) — orchestrates A+B+C into the five operations:
//!   `store_memory`, `search_memory`, `list_memories`, `delete_memory`,
//!   `get_memory`.
//!
//! [`config`] loads the YAML configuration record that parameterizes all
//! of the above; [`models`] holds the shared data types; [`error`] is the
//! closed error taxonomy every fallible operation returns.
//!
//! This crate is the retrieval engine only. An RPC/tool-call transport,
//! CLI argument parsing beyond the bundled demonstration binary, and the
//! concrete embedding model runtime (beyond the deterministic stub shipped
//! here) are treated as thin shells a caller supplies.

pub mod cache;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod error;
pub mod models;
pub mod schema;
pub mod scoring;
pub mod service;
pub mod store;
