#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use testimonial_sync::testimonial::{Status, Testimonial};

/// Serve `replies` to consecutive requests on a local port, then stop.
/// Returns the endpoint URL and a handle yielding the raw request heads.
pub fn serve_replies(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request_head(&mut stream));
            let reason = if status == 200 { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body.as_bytes()).unwrap();
            let _ = stream.flush();
        }
        requests
    });
    (format!("http://{addr}/maps/api/place/details/json"), handle)
}

/// Accept one request and never answer it. The connection stays open until
/// the returned sender is used or dropped.
pub fn serve_silence() -> (String, Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (release, released) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request_head(&mut stream);
        let _ = released.recv();
    });
    (format!("http://{addr}/maps/api/place/details/json"), release, handle)
}

/// An endpoint on a local port nobody listens on.
pub fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/maps/api/place/details/json")
}

fn read_request_head(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn ok_reply(reviews: serde_json::Value) -> (u16, String) {
    (
        200,
        serde_json::json!({ "status": "OK", "result": { "reviews": reviews } }).to_string(),
    )
}

/// Two reviews as the Places API returns them.
pub fn sample_reviews() -> serde_json::Value {
    serde_json::json!([
        {
            "author_name": "Jane Doe",
            "rating": 5,
            "relative_time_description": "a month ago",
            "text": "Our daughter loves it here. The teachers are wonderful.",
            "time": 1700000000
        },
        {
            "author_name": "Sam Lee",
            "rating": 4,
            "relative_time_description": "2 years ago",
            "text": "Friendly staff.",
            "time": 1650000000
        }
    ])
}

pub fn record(id: &str, created_at: Option<&str>, rating: u8) -> Testimonial {
    Testimonial {
        id: id.to_string(),
        quote: format!("{id} quote"),
        author: "Stored Author".to_string(),
        role: Some("Parent".to_string()),
        company: Some("Google Review".to_string()),
        rating: Some(rating.into()),
        color: Some("#EEA27B".to_string()),
        created_at: Some(created_at.map(str::to_string)),
        status: Some(Status::Approved),
        extra: serde_json::Map::new(),
    }
}

pub fn write_records(path: &Path, records: &[Testimonial]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string_pretty(records).unwrap()).unwrap();
}

pub fn read_records(path: &Path) -> Vec<Testimonial> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Write a config file pointing the endpoint at `endpoint`.
pub fn write_config(dir: &Path, endpoint: &str) -> PathBuf {
    let path = dir.join("testimonials.toml");
    std::fs::write(&path, format!("endpoint = \"{endpoint}\"\ntimeout_secs = 5\n")).unwrap();
    path
}
