use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;

use tempfile::tempdir;
use tiny_http::{Response, Server};

fn molt(home: &Path, base_url: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_molt"));
    cmd.args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("MOLT_LOG");
    if let Some(base_url) = base_url {
        cmd.env("MOLT_API__BASE_URL", base_url);
    }
    cmd.output().expect("run molt")
}

/// Serves canned bodies keyed by request path until the test process exits.
fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
    let server = Server::http("127.0.0.1:0").expect("bind loopback server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let path = request.url().split('?').next().unwrap_or("").to_string();
            let (status, body) = routes
                .iter()
                .find(|(route, _, _)| *route == path)
                .map(|(_, status, body)| (*status, *body))
                .unwrap_or((404, "{}"));
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });
    format!("http://{addr}/api/v1")
}

#[test]
fn prints_version() {
    let home = tempdir().unwrap();
    let output = molt(home.path(), None, &["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "stdout was: {}",
        stdout.trim()
    );
}

#[test]
fn prints_help() {
    let home = tempdir().unwrap();
    let output = molt(home.path(), None, &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(stdout.contains("Molt"));
    assert!(stdout.contains("--version"));
    assert!(stdout.contains("search <query>"));
}

#[test]
fn unknown_command_fails() {
    let home = tempdir().unwrap();
    let output = molt(home.path(), None, &["frobnicate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr utf8");
    assert!(stderr.contains("unknown command"), "stderr was: {stderr}");
}

#[test]
fn feed_prints_communities_and_posts() {
    let base = serve(vec![
        (
            "/api/v1/submolts",
            200,
            r#"{"success":true,"submolts":[{"id":"s1","name":"general","display_name":"General","subscriber_count":12}]}"#,
        ),
        (
            "/api/v1/posts",
            200,
            r#"{"success":true,"posts":[{"id":"p1","title":"Hello molts","author":{"id":"a1","name":"clawd"},"upvotes":5,"downvotes":1,"comment_count":2,"submolt":{"id":"s1","name":"general"},"created_at":"2025-01-30T12:00:00Z"}]}"#,
        ),
    ]);
    let home = tempdir().unwrap();
    let output = molt(home.path(), Some(&base), &["feed"]);
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(output.status.success(), "stdout was: {stdout}");
    assert!(stdout.contains("m/general (General) · 12 members"));
    assert!(stdout.contains("Hello molts"));
    assert!(stdout.contains("4 points · 2 comments"));
}

#[test]
fn unauthorized_profile_reports_login_hint() {
    let base = serve(vec![("/api/v1/agents/profile", 401, "{}")]);
    let home = tempdir().unwrap();
    let output = molt(home.path(), Some(&base), &["profile", "clawd"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr utf8");
    assert!(stderr.contains("Please log in to continue"), "stderr was: {stderr}");
}

#[test]
#[cfg(target_os = "linux")]
fn login_then_logout_manages_the_token_file() {
    let home = tempdir().unwrap();
    let token_path = home.path().join(".config").join("molt").join("token");

    let output = molt(home.path(), None, &["login", "tok-abc"]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&token_path).unwrap().trim(), "tok-abc");

    let output = molt(home.path(), None, &["logout"]);
    assert!(output.status.success());
    assert!(!token_path.exists());
}
