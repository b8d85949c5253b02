/// GET /health - Liveness probe; never touches the database
pub async fn health() -> &'static str {
    "OK"
}
