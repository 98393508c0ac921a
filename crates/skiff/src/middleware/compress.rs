//! Gzip response compression.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use http::HeaderValue;
use http::header::CONTENT_ENCODING;

use skiff_core::{Ctx, Middleware, Next};

/// Compresses the response body with gzip when the client accepts it.
///
/// Runs the rest of the chain first, then rewrites whatever response it
/// produced. Responses with an empty body or an existing
/// `Content-Encoding` are left alone, as are requests whose
/// `Accept-Encoding` does not admit gzip.
#[must_use]
pub fn compress() -> impl Middleware {
    |ctx: Ctx, next: Next| async move {
        next.run(ctx.clone()).await?;

        let accepts_gzip = ctx
            .header("accept-encoding")
            .is_some_and(|value| value.contains("gzip"));
        if !accepts_gzip {
            return Ok(());
        }

        ctx.map_response(|response| {
            if response.body().is_empty() || response.headers().contains_key(CONTENT_ENCODING) {
                return;
            }
            let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
            if encoder.write_all(response.body()).is_err() {
                return;
            }
            let Ok(compressed) = encoder.finish() else {
                return;
            };
            response.set_body(compressed);
            response
                .headers_mut()
                .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        });
        Ok(())
    }
}
