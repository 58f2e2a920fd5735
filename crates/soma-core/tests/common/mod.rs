//! Local stand-ins for the directory endpoint and the media player.

#![allow(dead_code)]

use axum::{extract::Path, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;

pub const PLS_BODY: &str = "[playlist]\nnumberofentries=1\nFile1=http://ice1.example/groovesalad-128-mp3\nTitle1=Groove Salad\nLength1=-1\nVersion=2\n";

/// Serves:
/// - `/channels.json`     one-channel directory pointing back at this server
/// - `/broken.json`       not a directory document
/// - `/slow.json`         answers after 5 s
/// - `/groovesalad.pls`   PLS with one File entry
/// - `/empty.pls`         PLS without File entries
/// - `/img/:name`         icon bytes
pub struct FixtureServer {
    pub addr: SocketAddr,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = format!("http://{}", addr);

        let directory = directory_json(&base);
        let app = Router::new()
            .route("/channels.json", get(move || async move { directory }))
            .route("/broken.json", get(|| async { "<html>maintenance</html>" }))
            .route(
                "/slow.json",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "{\"channels\": []}"
                }),
            )
            .route("/groovesalad.pls", get(|| async { PLS_BODY }))
            .route("/empty.pls", get(|| async { "[playlist]\nnumberofentries=0\n" }))
            .route(
                "/img/:name",
                get(|Path(name): Path<String>| async move { format!("icon:{}", name) }),
            )
            .fallback(|| async { StatusCode::NOT_FOUND });

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn directory_json(base: &str) -> String {
    format!(
        r#"{{
  "channels": [
    {{
      "id": "groovesalad",
      "title": "Groove Salad",
      "description": "A nicely chilled plate of ambient/downtempo beats and grooves.",
      "genre": "ambient|electronica",
      "listeners": "1500",
      "xlimage": "{base}/img/groovesalad512.png",
      "playlists": [
        {{"url": "{base}/groovesalad.pls", "format": "mp3", "quality": "highest"}}
      ]
    }},
    {{
      "id": "dronezone",
      "title": "Drone Zone",
      "description": "Served best chilled, safe with most medications.",
      "listeners": "700",
      "xlimage": "{base}/img/dronezone512.png",
      "playlists": [
        {{"url": "{base}/empty.pls", "format": "mp3", "quality": "highest"}}
      ]
    }}
  ]
}}"#
    )
}

/// Address that refuses connections.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/channels.json", addr)
}

/// Write an executable shell script that stands in for the media player.
/// It records its arguments to `args.txt` beside itself, then runs `body`.
#[cfg(unix)]
pub fn fake_player(dir: &std::path::Path, body: &str) -> PathBuf {
    let body = format!("echo \"$@\" > \"$(dirname \"$0\")/args.txt\"\n{}", body);
    fake_script(dir, "fake-player", &body)
}

/// Stand-in for `notify-send`: appends one line of arguments per call to
/// `notify.txt` beside itself.
#[cfg(unix)]
pub fn fake_notifier(dir: &std::path::Path) -> PathBuf {
    fake_script(
        dir,
        "fake-notify-send",
        "echo \"$@\" >> \"$(dirname \"$0\")/notify.txt\"",
    )
}

#[cfg(unix)]
fn fake_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
