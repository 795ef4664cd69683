//! `HttpRemoteStore` against a scripted local HTTP server.

use std::path::Path;
use std::sync::{Arc, Mutex};

use remote::{HttpRemoteStore, QueryValues, RemoteError, RemoteStore};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

#[derive(Clone, Debug)]
struct Recorded {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

struct Reply {
    status: &'static str,
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
}

impl Reply {
    fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: "200 OK",
            headers: Vec::new(),
            body: body.into(),
        }
    }

    fn status(status: &'static str, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_owned()));
        self
    }
}

/// Serves `replies` in order, one connection per request.
async fn serve(replies: Vec<Reply>) -> (Url, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&recorded);

    tokio::spawn(async move {
        for reply in replies {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut stream = BufReader::new(stream);
            let request = read_request(&mut stream).await;
            log.lock().expect("lock").push(request);

            let mut head = format!(
                "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n",
                reply.status,
                reply.body.len()
            );
            for (name, value) in &reply.headers {
                head.push_str(&format!("{name}: {value}\r\n"));
            }
            head.push_str("\r\n");
            let stream = stream.get_mut();
            stream.write_all(head.as_bytes()).await.expect("write head");
            stream.write_all(&reply.body).await.expect("write body");
            stream.shutdown().await.expect("shutdown");
        }
    });

    let base = Url::parse(&format!("http://{address}/content/filemapper/v1")).expect("base");
    (base, recorded)
}

async fn read_request<R: tokio::io::AsyncBufRead + Unpin>(stream: &mut R) -> Recorded {
    let mut line = String::new();
    stream.read_line(&mut line).await.expect("request line");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        stream.read_line(&mut line).await.expect("header line");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_owned(), value.trim().to_owned()));
        }
    }

    let mut recorded = Recorded {
        method,
        target,
        headers,
        body: Vec::new(),
    };
    if let Some(length) = recorded.header("content-length") {
        let mut body = vec![0; length.parse().expect("length")];
        stream.read_exact(&mut body).await.expect("body");
        recorded.body = body;
    } else if recorded
        .header("transfer-encoding")
        .is_some_and(|value| value.eq_ignore_ascii_case("chunked"))
    {
        loop {
            let mut size = String::new();
            stream.read_line(&mut size).await.expect("chunk size");
            let size = usize::from_str_radix(size.trim(), 16).expect("hex size");
            let mut chunk = vec![0; size + 2];
            stream.read_exact(&mut chunk).await.expect("chunk");
            if size == 0 {
                break;
            }
            recorded.body.extend_from_slice(&chunk[..size]);
        }
    }
    recorded
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[tokio::test]
async fn upload_posts_multipart_file_with_query() {
    let (base, recorded) = serve(vec![Reply::ok("{}")]).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let local = dir.path().join("main.css");
    std::fs::write(&local, "body { color: red }").expect("write");

    let store = HttpRemoteStore::new(base, "secret").expect("store");
    store
        .upload_file(123, &local, "theme/css/main.css", &QueryValues::default())
        .await
        .expect("upload");

    let request = recorded.lock().expect("lock")[0].clone();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.target,
        "/content/filemapper/v1/upload/theme%2Fcss%2Fmain.css?portalId=123&buffer=false&environmentId=1"
    );
    assert_eq!(request.header("authorization"), Some("Bearer secret"));
    assert!(
        request
            .header("content-type")
            .is_some_and(|value| value.starts_with("multipart/form-data"))
    );
    assert!(contains(&request.body, b"name=\"file\"; filename=\"main.css\""));
    assert!(contains(&request.body, b"body { color: red }"));
}

#[tokio::test]
async fn stream_writes_body_and_reads_headers() {
    let reply = Reply::ok("a { }")
        .with_header("content-disposition", "attachment; filename=\"main.css\"")
        .with_header("last-modified", "Tue, 15 Nov 1994 08:12:31 GMT");
    let (base, recorded) = serve(vec![reply]).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let dest = dir.path().join("download.part");

    let store = HttpRemoteStore::new(base, "secret").expect("store");
    let node = store
        .download_stream(123, "/theme/main.css", &dest, &QueryValues::default())
        .await
        .expect("stream");

    assert_eq!(std::fs::read(&dest).expect("read"), b"a { }");
    assert_eq!(node.name(), "main.css");
    assert_eq!(node.updated_at(), 784_887_151_000);
    assert!(recorded.lock().expect("lock")[0].target.contains("/stream/"));
}

#[tokio::test]
async fn listing_decodes_tree_and_uses_root_alias() {
    let listing = r#"{"name":"","path":"/","folder":true,"children":[
        {"name":"main.css","path":"/main.css","folder":false,"children":[],"updatedAt":5}
    ]}"#;
    let (base, recorded) = serve(vec![Reply::ok(listing)]).await;
    let store = HttpRemoteStore::new(base, "secret").expect("store");

    let node = store
        .download_tree(123, "/", &QueryValues::default())
        .await
        .expect("listing");
    assert!(node.is_folder());
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].updated_at(), 5);
    assert!(recorded.lock().expect("lock")[0].target.contains("/download/@root?"));
}

#[tokio::test]
async fn unauthorized_responses_are_fatal() {
    let (base, _) = serve(vec![Reply::status("401 Unauthorized", r#"{"message":"expired token"}"#)]).await;
    let store = HttpRemoteStore::new(base, "stale").expect("store");

    let error = store.delete_remote(123, "theme/old.css").await.expect_err("401");
    assert!(error.is_fatal());
    assert_eq!(error.status(), Some(401));
    assert!(error.to_string().contains("expired token"));
}

#[tokio::test]
async fn validation_failures_are_not_fatal() {
    let (base, recorded) = serve(vec![Reply::status("400 Bad Request", "bad template")]).await;
    let store = HttpRemoteStore::new(base, "secret").expect("store");

    let error = store.delete_remote(123, "theme/old.css").await.expect_err("400");
    assert!(!error.is_fatal());
    assert!(matches!(error, RemoteError::Rejected { status: 400, .. }));
    let request = recorded.lock().expect("lock")[0].clone();
    assert_eq!(request.method, "DELETE");
    assert_eq!(
        request.target,
        "/content/filemapper/v1/delete/theme%2Fold.css?portalId=123"
    );
}

#[tokio::test]
async fn missing_local_file_is_a_filesystem_error() {
    let store = HttpRemoteStore::new(
        Url::parse("http://127.0.0.1:9/content/filemapper/v1").expect("base"),
        "secret",
    )
    .expect("store");
    let error = store
        .upload_file(1, Path::new("/nonexistent/main.css"), "main.css", &QueryValues::default())
        .await
        .expect_err("missing file");
    assert!(matches!(error, RemoteError::FileSystem(_)));
}
