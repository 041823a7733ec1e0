use infodivisas::{ClientConfig, ErrorKind, FetchJson, HttpFetcher};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

/// Serve `responses.len()` connections, answering each by request path.
fn serve(responses: Vec<(&'static str, &'static str, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let count = responses.len();
    thread::spawn(move || {
        for stream in listener.incoming().take(count) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                    break;
                }
            }
            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            let (status, body) = responses
                .iter()
                .find(|(p, _, _)| *p == path)
                .map(|(_, s, b)| (*s, *b))
                .unwrap_or(("404 Not Found", ""));
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
        }
    });
    format!("http://{}", addr)
}

#[test]
fn http_status_and_body_map_to_error_kinds() {
    let base = serve(vec![
        ("/api/missing", "404 Not Found", "{}"),
        ("/api/broken", "500 Internal Server Error", "{}"),
        ("/api/garbled", "200 OK", "{not json"),
        ("/api/dolar", "200 OK", r#"{"codigo":"dolar","serie":[]}"#),
    ]);
    let fetcher = HttpFetcher::new(&ClientConfig::default()).unwrap();

    let err = fetcher.fetch_json(&format!("{}/api/missing", base)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = fetcher.fetch_json(&format!("{}/api/broken", base)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);

    let err = fetcher.fetch_json(&format!("{}/api/garbled", base)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let v = fetcher.fetch_json(&format!("{}/api/dolar", base)).unwrap();
    assert_eq!(v["codigo"], "dolar");
}
