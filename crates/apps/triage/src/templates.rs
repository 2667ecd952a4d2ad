//! HTML pages served by the OAuth callback

/// Simple HTML escape for untrusted content
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Page shown after a successful code exchange
///
/// Displays the refresh token so it can be copied into `.env`.
pub fn authorization_success(refresh_token: Option<&str>) -> String {
    let token_block = match refresh_token {
        Some(token) => format!(
            r#"<p>Copy this refresh token and add it to your <code>.env</code> file:</p>
    <pre style="background: #f4f4f4; padding: 15px; border-radius: 5px; overflow-x: auto;">GMAIL_REFRESH_TOKEN={}</pre>"#,
            html_escape(token)
        ),
        None => r#"<p>Google did not return a refresh token. Revoke the app's access in your Google account and authorize again.</p>"#
            .to_string(),
    };

    format!(
        r#"<html>
  <head><title>Authorization Successful</title></head>
  <body style="font-family: Arial, sans-serif; padding: 40px; max-width: 800px; margin: 0 auto;">
    <h1 style="color: #4CAF50;">Authorization Successful!</h1>
    {}
    <p><strong>Then restart the server.</strong></p>
  </body>
</html>
"#,
        token_block
    )
}
