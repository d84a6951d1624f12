use mockito::Server;
use serde_json::json;
use yoto_oauth_pkce::api::yoto::exchange_code_for_token;
use yoto_oauth_pkce::config::Config;

// Lives in its own test binary: setting YOTO_OAUTH_BASE is process-global and
// would leak into the config-injected token tests if they shared a process.

#[test]
fn env_var_overrides_configured_oauth_base() {
    let mut server = Server::new();
    let _m = server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": "env-at", "expires_in": 3600}).to_string())
        .create();

    std::env::set_var("YOTO_OAUTH_BASE", server.url());
    // Config points at an unroutable address; the env override must win.
    let cfg = Config {
        yoto_oauth_base: "http://127.0.0.1:1".into(),
        ..Config::default()
    };

    let rt = tokio::runtime::Runtime::new().expect("rt");
    let tok = rt
        .block_on(exchange_code_for_token(
            &cfg,
            "cid",
            "c",
            "v",
            "https://app.example/cb",
        ))
        .expect("exchange through env-selected base");
    std::env::remove_var("YOTO_OAUTH_BASE");

    assert_eq!(tok.access_token, "env-at");
}
