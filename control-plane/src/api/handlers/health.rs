/// Liveness probe. Always the literal body `OK`.
pub async fn health() -> &'static str {
    "OK"
}
