//! HTTP query surface
//!
//! Read-only JSON endpoints over the tiered resolver:
//!
//! - `GET /wilayah/provinces`
//! - `GET /wilayah/regencies/{code}` (2-digit province code)
//! - `GET /wilayah/districts/{code}` (4-digit regency code)
//! - `GET /wilayah/villages/{code}` (7-digit district code)

mod error;

pub use error::ApiError;

use crate::config::Config;
use crate::region::RegionEnvelope;
use crate::resolver::{MemoryCache, Resolver};
use crate::storage::CacheKey;
use crate::WilayahError;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the router over a shared resolver
pub fn router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route("/wilayah/provinces", get(provinces))
        .route("/wilayah/regencies/{code}", get(regencies))
        .route("/wilayah/districts/{code}", get(districts))
        .route("/wilayah/villages/{code}", get(villages))
        .with_state(resolver)
}

async fn provinces(
    State(resolver): State<Arc<Resolver>>,
) -> Result<Json<RegionEnvelope>, ApiError> {
    lookup(&resolver, CacheKey::provinces()).await
}

async fn regencies(
    State(resolver): State<Arc<Resolver>>,
    Path(code): Path<String>,
) -> Result<Json<RegionEnvelope>, ApiError> {
    children(&resolver, "regencies", &code).await
}

async fn districts(
    State(resolver): State<Arc<Resolver>>,
    Path(code): Path<String>,
) -> Result<Json<RegionEnvelope>, ApiError> {
    children(&resolver, "districts", &code).await
}

async fn villages(
    State(resolver): State<Arc<Resolver>>,
    Path(code): Path<String>,
) -> Result<Json<RegionEnvelope>, ApiError> {
    children(&resolver, "villages", &code).await
}

async fn children(
    resolver: &Resolver,
    collection: &str,
    code: &str,
) -> Result<Json<RegionEnvelope>, ApiError> {
    let key = CacheKey::parse(collection, Some(code)).map_err(|e| {
        tracing::debug!("Rejected {} lookup for '{}': {}", collection, code, e);
        ApiError::BadRequest(e)
    })?;
    lookup(resolver, key).await
}

async fn lookup(resolver: &Resolver, key: CacheKey) -> Result<Json<RegionEnvelope>, ApiError> {
    Ok(Json(resolver.resolve_key(&key).await?))
}

/// Runs the query surface until the process is stopped
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `addr` - Address to bind
pub async fn serve(config: &Config, addr: SocketAddr) -> Result<(), WilayahError> {
    let cache = Arc::new(MemoryCache::new(config.cache.ttl()));
    let resolver = Arc::new(Resolver::from_config(config, cache)?);

    if !resolver.has_mirror() {
        tracing::info!("No CDN mirror configured; misses go straight to the origin");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Wilayah query server listening");

    axum::serve(listener, router(resolver)).await?;

    Ok(())
}
