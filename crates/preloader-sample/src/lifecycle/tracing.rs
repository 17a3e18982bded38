//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Loader spans**: every `load` and `preload` opens a span with the relation name and the
//!   parent id or batch size
//! - **Batches**: committed and skipped parent counts per level (`info`)
//! - **Collaborator calls**: resolver and fetcher dispatch, cache hits (`debug`)
//! - **Failures**: cardinality violations and collaborator errors (`warn`)
//!
//! ## Usage Examples
//!
//! ```bash
//! # One line per committed batch
//! RUST_LOG=info cargo run -p preloader-sample
//!
//! # Every collaborator call with its ids
//! RUST_LOG=debug cargo run -p preloader-sample
//!
//! # Only the engine
//! RUST_LOG=preloader=debug cargo run -p preloader-sample
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO preload_users:preload:preload: Preloaded nodes=4 relation="Books" parents=3
//! INFO preload_users:preload:preload:preload: Preloaded committed=3 skipped=1 relation="Authors" parents=4
//! INFO preload_users:preload:preload:preload: Preloaded committed=3 skipped=1 relation="Places" parents=4
//! ```
//!
//! The nested span names show the cascade: `Authors` and `Places` run inside `Books`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
