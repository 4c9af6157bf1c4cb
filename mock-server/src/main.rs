use tokio::net::TcpListener;

/// Run the fixture server standalone, for poking at with any HTTP client.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("fixture server listening on http://{addr}");
    mock_server::run(listener).await
}
