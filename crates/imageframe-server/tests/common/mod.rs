#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;

use imageframe_server::ServerConfig;
use wiremock::MockServer;

pub const API_KEY: &str = "frame-test-key";

/// Encode a two-tone test photo as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgb([200, 30, 30])
        } else {
            image::Rgb([30, 30, 200])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Configuration pointing at the mock photo server.
pub fn config_for(photos: &MockServer) -> ServerConfig {
    ServerConfig {
        server_url: photos.uri(),
        api_key: API_KEY.to_string(),
        fetch_timeout_secs: 5,
        run_timeout_secs: 20,
        ..Default::default()
    }
}

/// Serve the app on an ephemeral port and return its base URL.
pub async fn spawn_app(config: ServerConfig) -> String {
    let app = imageframe_server::app(&config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}
