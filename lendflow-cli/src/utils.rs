/// Database URL safe to show in error messages.
pub fn redact_url_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return "<unprintable url>".to_string();
            }
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "<invalid url>".to_string(),
    }
}
