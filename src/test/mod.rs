use super::config::PinataConfig;
use super::pinata::PinataClient;

use image::RgbImage;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rocket::serde::json::serde_json::json;

mod server;

const ORIGIN: &str = "http://localhost:3000";
const JWT: &str = "test-jwt";
const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key: &str| {
        pairs
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    }
}

/// Pinata client pointed at a mock server, with the public gateway
fn pinata_client(server: &MockServer) -> PinataClient {
    let config = PinataConfig {
        api_url: server.uri(),
        ..PinataConfig::new(JWT)
    };
    PinataClient::new(&config).expect("valid pinata client")
}

fn pinned(cid: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "IpfsHash": cid,
        "PinSize": 1234,
        "Timestamp": "2024-01-01T00:00:00.000Z"
    }))
}

async fn mock_pin(server: &MockServer, endpoint: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Scans a whole ticket canvas and returns the payload of its QR code
fn decode_qr(canvas: &RgbImage) -> String {
    let (width, height) = canvas.dimensions();
    let mut image =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            canvas.get_pixel(x as u32, y as u32)[0]
        });
    let grids = image.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR code");
    let (_, content) = grids[0].decode().expect("decodable QR code");
    content
}

/// Searches raw bytes, request bodies may hold binary parts
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
