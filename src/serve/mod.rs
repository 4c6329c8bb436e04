// Preview server - serves the output directory over HTTPS

use crate::config::ServeConfig;
use anyhow::Result;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use rcgen::CertifiedKey;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Host names the generated certificate is valid for
const CERT_NAMES: [&str; 2] = ["localhost", "127.0.0.1"];

/// Static file router over `dir`
///
/// CORS is wide open so the hosted dev page can fetch the artifact.
pub fn router(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Generate a self-signed pair when either PEM file is missing
///
/// Returns `true` if new files were written.
pub fn ensure_certificate(config: &ServeConfig) -> Result<bool> {
    if config.cert_path.is_file() && config.key_path.is_file() {
        return Ok(false);
    }

    let names: Vec<String> = CERT_NAMES.iter().map(|n| n.to_string()).collect();
    let CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(names)?;

    for path in [&config.cert_path, &config.key_path] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&config.cert_path, cert.pem())?;
    std::fs::write(&config.key_path, key_pair.serialize_pem())?;

    tracing::warn!(
        cert = %config.cert_path.display(),
        key = %config.key_path.display(),
        "Generated a self-signed certificate, your browser will ask you to trust it"
    );
    Ok(true)
}

/// Serve `config.dir` until the process exits
pub async fn serve(config: ServeConfig) -> Result<()> {
    ensure_certificate(&config)?;

    let tls_config = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path).await?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(%addr, dir = %config.dir.display(), "Starting preview server");

    axum_server::bind_rustls(addr, tls_config)
        .serve(router(&config.dir).into_make_service())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn serves_artifact_with_cors() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("plugin.js"), "W.loadPlugin();").unwrap();

        let response = router(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/plugin.js")
                    .header(header::ORIGIN, "https://www.windy.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"W.loadPlugin();");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();

        let response = router(dir.path())
            .oneshot(Request::builder().uri("/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn certificate_is_generated_once() {
        let dir = TempDir::new().unwrap();
        let config = ServeConfig {
            cert_path: dir.path().join("dev/certificate.pem"),
            key_path: dir.path().join("dev/key.pem"),
            ..Default::default()
        };

        assert!(ensure_certificate(&config).unwrap());
        let cert = std::fs::read_to_string(&config.cert_path).unwrap();
        assert!(cert.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(std::fs::read_to_string(&config.key_path)
            .unwrap()
            .contains("PRIVATE KEY"));

        assert!(!ensure_certificate(&config).unwrap());
        assert_eq!(std::fs::read_to_string(&config.cert_path).unwrap(), cert);
    }
}
