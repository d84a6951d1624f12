use crate::api::yoto;
use crate::config::Config;
use crate::pkce::{self, PkcePair};
use crate::util::is_valid_absolute_url;
use anyhow::{anyhow, Result};
use tracing::info;

/// This module implements a simple manual OAuth helper:
/// 1. Build the Yoto authorization URL (PKCE S256) and print it.
/// 2. User opens it in a browser, approves and gets redirected to the redirect URI.
/// 3. User copies the full redirect URL and pastes it into this CLI.
/// 4. The CLI checks the echoed `state`, extracts the `code` param and
///    exchanges it together with the code verifier for tokens.
/// 5. The token JSON is printed to stdout; storing it is the caller's concern.
///
/// This avoids running an embedded HTTP server and works well for manual setup.
pub async fn run_yoto_auth(cfg: &Config) -> Result<()> {
    use std::io;

    let client_id = if cfg.yoto_client_id.is_empty() {
        println!("Enter your Yoto client_id:");
        let mut s = String::new();
        io::stdin().read_line(&mut s)?;
        let s = s.trim().to_string();
        if s.is_empty() {
            return Err(anyhow!("no client_id provided"));
        }
        s
    } else {
        cfg.yoto_client_id.clone()
    };

    // Prefer the configured redirect URI when it is a usable absolute URL.
    let redirect_uri = match cfg
        .yoto_redirect_uri
        .as_deref()
        .filter(|u| is_valid_absolute_url(u))
    {
        Some(u) => u.to_string(),
        None => {
            println!("Enter your redirect URI (as registered with Yoto):");
            let mut s = String::new();
            io::stdin().read_line(&mut s)?;
            let s = s.trim().to_string();
            if !is_valid_absolute_url(&s) {
                return Err(anyhow!("redirect URI must be an absolute http(s) URL"));
            }
            s
        }
    };

    let pair = PkcePair::generate()?;
    let state = pkce::generate_state()?;
    let url = yoto::build_authorize_url(cfg, &client_id, &redirect_uri, &state, &pair.challenge)?;

    println!(
        "Open this URL in your browser and authorize the application:\n\n{}\n",
        url
    );
    println!("After authorizing, you'll be redirected to your redirect URI. Copy the full redirect URL and paste it here.");
    println!("Paste redirect URL:");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let (code, echoed_state) = yoto::parse_redirect_params(input.trim())?;
    if echoed_state != state {
        return Err(anyhow!("state mismatch in redirect URL"));
    }

    let tok = yoto::exchange_code_for_token(cfg, &client_id, &code, &pair.verifier, &redirect_uri)
        .await?;
    info!("Yoto token exchange succeeded");
    println!("{}", serde_json::to_string_pretty(&tok)?);
    Ok(())
}
