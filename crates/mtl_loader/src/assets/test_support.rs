//! Shared fakes for collaborator-driven tests

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use image::{ImageFormat, RgbaImage};
use parking_lot::Mutex;

use super::transport::{Transport, TransportError};

/// Encode a solid-color PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[derive(Default)]
struct Route {
    body: Vec<u8>,
    failures_left: u32,
}

/// In-memory transport that fails a scripted number of times per URL
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<HashMap<String, u32>>,
    total: AtomicU32,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `body` at `url` after `failures` failed attempts
    pub fn serve(&self, url: &str, body: Vec<u8>, failures: u32) {
        self.routes
            .lock()
            .insert(url.to_string(), Route { body, failures_left: failures });
    }

    /// Requests issued for `url`
    pub fn requests(&self, url: &str) -> u32 {
        self.requests.lock().get(url).copied().unwrap_or(0)
    }

    /// Requests issued in total
    pub fn total_requests(&self) -> u32 {
        self.total.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, TransportError>> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.requests.lock().entry(url.to_string()).or_insert(0) += 1;

        let result = match self.routes.lock().get_mut(url) {
            Some(route) if route.failures_left > 0 => {
                route.failures_left -= 1;
                Err(TransportError::Status { url: url.to_string(), status: 503 })
            }
            Some(route) => Ok(route.body.clone()),
            None => Err(TransportError::Status { url: url.to_string(), status: 404 }),
        };
        async move { result }.boxed()
    }
}
