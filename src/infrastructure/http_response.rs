// HTTP response utilities for SVG charts with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
};
use tokio::io::AsyncReadExt;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Check if the client accepts Brotli compression
pub fn accepts_brotli(accept_encoding: Option<&str>) -> bool {
    accept_encoding
        .map(|s| s.split(',').any(|enc| enc.trim().starts_with("br")))
        .unwrap_or(false)
}

async fn brotli_compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = BrotliEncoder::new(std::io::Cursor::new(bytes));
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Serve an SVG document, compressed with Brotli when requested
pub async fn svg_response(svg: &str, compress: bool) -> Result<Response<Body>, StatusCode> {
    let raw = svg.as_bytes();

    let (body_bytes, content_encoding) = if compress {
        let compressed = brotli_compress(raw).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!("Compressed chart: {} -> {} bytes", raw.len(), compressed.len());
        (compressed, Some("br"))
    } else {
        (raw.to_vec(), None)
    };

    let content_length = HeaderValue::from_str(&body_bytes.len().to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, SVG_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::CONTENT_LENGTH, content_length);

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_brotli() {
        assert!(accepts_brotli(Some("gzip, deflate, br")));
        assert!(accepts_brotli(Some("br;q=1.0")));
        assert!(!accepts_brotli(Some("gzip")));
        assert!(!accepts_brotli(None));
    }

    #[tokio::test]
    async fn test_uncompressed_svg_response() {
        let response = svg_response("<svg></svg>", false).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], SVG_CONTENT_TYPE);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "11");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn test_compressed_svg_response() {
        let svg = format!("<svg>{}</svg>", "<rect/>".repeat(200));
        let response = svg_response(&svg, true).await.unwrap();

        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
        let length: usize = response.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(length < svg.len());
    }
}
